use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки эмулятора Pub/Sub.
///
/// Текст каждой ошибки начинается с числового кода и канонической фразы,
/// как у настоящего клиента: `"5 NOT_FOUND: Topic not found"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PubSubError {
    /// Полное имя ресурса не соответствует шаблону
    /// `projects/<id>/<collection>/<name>`.
    #[error("3 INVALID_ARGUMENT: Invalid [{collection}] name: (name={name})")]
    InvalidName {
        collection: &'static str,
        name: String,
    },

    #[error("6 ALREADY_EXISTS: Topic already exists")]
    TopicAlreadyExists { name: String },

    #[error("6 ALREADY_EXISTS: Subscription already exists")]
    SubscriptionAlreadyExists { name: String },

    #[error("5 NOT_FOUND: Topic not found")]
    TopicNotFound { name: String },

    #[error("5 NOT_FOUND: Subscription does not exist")]
    SubscriptionNotFound { name: String },
}

impl PubSubError {
    /// Имя ресурса, к которому относится ошибка.
    pub fn resource_name(&self) -> &str {
        match self {
            Self::InvalidName { name, .. }
            | Self::TopicAlreadyExists { name }
            | Self::SubscriptionAlreadyExists { name }
            | Self::TopicNotFound { name }
            | Self::SubscriptionNotFound { name } => name,
        }
    }
}

impl ErrorExt for PubSubError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidName { .. } => StatusCode::InvalidArgument,
            Self::TopicAlreadyExists { .. } | Self::SubscriptionAlreadyExists { .. } => {
                StatusCode::AlreadyExists
            }
            Self::TopicNotFound { .. } | Self::SubscriptionNotFound { .. } => StatusCode::NotFound,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        vec![
            ("error_type", "pubsub".to_string()),
            ("status_code", self.status_code().to_string()),
            ("resource", self.resource_name().to_string()),
        ]
    }
}
