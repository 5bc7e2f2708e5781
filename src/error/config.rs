use thiserror::Error;

/// Ошибки загрузки настроек.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Logging(#[from] super::LoggingError),
}
