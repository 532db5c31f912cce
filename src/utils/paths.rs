use std::{env, path::PathBuf};

use turbocash_config::{model::DEFAULT_DATA_DIR, Config};

/// Overrides every other data location when set.
pub const HOME_ENV: &str = "TURBOCASH_HOME";

/// Directory holding `config/config.json`: `$TURBOCASH_HOME`, else `~/.turbocash`.
pub fn base_dir() -> PathBuf {
    env_home().unwrap_or_else(|| {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DATA_DIR)
    })
}

/// Root for user documents and backups: `$TURBOCASH_HOME`, else the
/// configured `data_root`, else `~/.turbocash`.
pub fn data_root(config: &Config) -> PathBuf {
    env_home().unwrap_or_else(|| config.resolve_data_root())
}

fn env_home() -> Option<PathBuf> {
    env::var_os(HOME_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
