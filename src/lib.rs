pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use app::commands::App;
#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{json_store::JsonStore, storage::LocalStorage};
pub use config::AppConfig;
pub use crate::core::generator::GeminiGenerator;
pub use utils::error::{DmError, Result};
