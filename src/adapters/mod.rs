// Adapters layer: concrete implementations for external systems (local files, reference data).

pub mod catalog;
pub mod json_store;
pub mod storage;
