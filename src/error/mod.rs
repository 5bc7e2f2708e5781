pub mod config;
pub mod logging;

pub use config::SettingsError;
pub use logging::LoggingError;
pub use mock_pubsub_error::{ErrorExt, PubSubError, PubSubResult, StatusCode};
