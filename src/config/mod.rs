//! Loads preferences from the TurboCash base directory.

pub use turbocash_config::{Config, ConfigBackup, ConfigError, ConfigManager};

use crate::{utils::paths, Result};

/// Manager rooted at [`paths::base_dir`].
pub fn default_manager() -> Result<ConfigManager> {
    Ok(ConfigManager::with_base_dir(paths::base_dir())?)
}
