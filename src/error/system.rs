use std::io;

use thiserror::Error;

/// Ошибки загрузки и проверки конфигурации.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid value for '{key}': {reason}")]
    Invalid { key: String, reason: String },
}

/// Ошибки инициализации логирования.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter directive '{directive}': {reason}")]
    Filter { directive: String, reason: String },

    #[error("failed to prepare log directory: {0}")]
    Io(#[from] io::Error),

    #[error("global tracing subscriber is already set: {0}")]
    AlreadyInitialized(String),
}
