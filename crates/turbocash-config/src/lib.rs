//! turbocash-config
//!
//! Preferences for the TurboCash command line: the `Config` model with its
//! validation rules and a `ConfigManager` that persists and snapshots it.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::{ConfigBackup, ConfigManager, MAX_CONFIG_BACKUPS};
pub use model::{Config, BUDGET_PERIODS, DEFAULT_DATA_DIR};
