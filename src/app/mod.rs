// Application layer: use cases wired on top of the domain, core and adapters.

#[cfg(feature = "cli")]
pub mod commands;
pub mod encounter_service;
pub mod loot_service;
pub mod render;
