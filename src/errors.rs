use thiserror::Error;
use turbocash_config::ConfigError;
use turbocash_core::CoreError;

pub type Result<T> = std::result::Result<T, CashError>;

/// Errors surfaced by sessions and the command line.
#[derive(Debug, Error)]
pub enum CashError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{0}")]
    Usage(String),
}
