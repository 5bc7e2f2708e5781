use std::{env, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::LoggingError;

/// Переменная окружения, переопределяющая уровень логирования.
pub const LOG_LEVEL_ENV: &str = "MOCK_PUBSUB_LOG_LEVEL";
/// Переменная окружения, переопределяющая формат вывода.
pub const LOG_FORMAT_ENV: &str = "MOCK_PUBSUB_LOG_FORMAT";

const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(LoggingError::InvalidFormat(other.to_string())),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = match self {
            Self::Pretty => "pretty",
            Self::Compact => "compact",
            Self::Json => "json",
        };
        f.write_str(s)
    }
}

/// Настройки логирования.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Уровень для крейта (`trace` .. `error`, `off`).
    pub level: String,
    pub format: LogFormat,
    pub with_target: bool,
    pub with_ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            with_target: true,
            with_ansi: true,
        }
    }
}

impl LoggingConfig {
    /// Применяет `MOCK_PUBSUB_LOG_LEVEL` и `MOCK_PUBSUB_LOG_FORMAT`.
    /// Некорректный формат игнорируется.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var(LOG_LEVEL_ENV) {
            self.level = level.to_ascii_lowercase();
        }
        if let Ok(format) = env::var(LOG_FORMAT_ENV) {
            if let Ok(format) = format.parse() {
                self.format = format;
            }
        }
    }

    pub fn validate(&self) -> Result<(), LoggingError> {
        if !LEVELS.contains(&self.level.as_str()) {
            return Err(LoggingError::InvalidLevel(self.level.clone()));
        }
        Ok(())
    }

    /// Директива для `EnvFilter`, например `"mock_pubsub=debug,warn"`.
    pub fn build_filter_directive(&self) -> String {
        format!("{}={},warn", env!("CARGO_CRATE_NAME"), self.level)
    }
}
