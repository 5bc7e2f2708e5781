use config::{Config, Environment};
use serde::{Deserialize, Serialize};

use crate::{
    error::SettingsError,
    logging::{LogFormat, LoggingConfig},
    pubsub::ClientOptions,
};

/// Префикс переменных окружения: `MOCK_PUBSUB_PROJECT_ID` и т.д.
pub const ENV_PREFIX: &str = "MOCK_PUBSUB";

/// Настройки эмулятора, читаемые из окружения.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub project_id: Option<String>,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Settings {
    pub fn load() -> Result<Self, SettingsError> {
        let cfg = Config::builder()
            // Добавляем значения по умолчанию
            .set_default("log_level", "info")?
            .set_default("log_format", "pretty")?
            // Переменные окружения с префиксом MOCK_PUBSUB_
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;

        let settings: Settings = cfg.try_deserialize()?;
        settings.logging().validate()?;
        Ok(settings)
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions::from_settings(self)
    }

    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level.to_ascii_lowercase(),
            format: self.log_format,
            ..LoggingConfig::default()
        }
    }
}
