/// Emulator settings loaded from the environment.
pub mod config;
/// Error types and numeric status codes.
pub mod error;
/// Logging setup (`tracing` formatting and filters).
pub mod logging;
/// In-memory Pub/Sub: client, registry, topics, subscriptions, messages.
pub mod pubsub;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Settings.
pub use crate::config::Settings;
/// Operation errors and result types.
pub use error::{ErrorExt, LoggingError, PubSubError, PubSubResult, SettingsError, StatusCode};
/// Logging.
pub use logging::{init_logging, LogFormat, LoggingConfig};
/// Pub/Sub API.
pub use pubsub::{
    AckResponse, Attributes, ClientOptions, Listener, Message, Payload, PubSub, PublishMessage,
    PublishOptions, Registry, Subscription, TestOptions, Topic, DEFAULT_PROJECT_ID, MESSAGE_EVENT,
};
