use thiserror::Error;

/// Ошибки настройки логирования.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoggingError {
    #[error("invalid log level: {0}")]
    InvalidLevel(String),

    #[error("invalid log format: {0}")]
    InvalidFormat(String),

    #[error("global tracing subscriber is already set")]
    AlreadyInitialized,
}
