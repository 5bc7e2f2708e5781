use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use super::{Listener, Message, Subscription};
use crate::config::Settings;

/// Проект по умолчанию, если клиент создан без `project_id`.
pub const DEFAULT_PROJECT_ID: &str = "{{projectId}}";

/// Параметры конструктора клиента.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientOptions {
    pub project_id: Option<String>,
}

impl ClientOptions {
    pub fn with_project_id(project_id: impl Into<String>) -> Self {
        Self {
            project_id: Some(project_id.into()),
        }
    }

    /// Проект берётся из `MOCK_PUBSUB_PROJECT_ID`, если он задан.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            project_id: settings.project_id.clone(),
        }
    }

    pub fn project_id(&self) -> &str {
        self.project_id.as_deref().unwrap_or(DEFAULT_PROJECT_ID)
    }
}

/// Параметры батчинга публикации. Принимаются и игнорируются.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishOptions {
    pub max_messages: Option<u32>,
    pub max_milliseconds: Option<u64>,
    pub max_bytes: Option<u64>,
}

/// Перехватчик создания копии сообщения для подписки.
pub type CreateMessageInterceptor = Arc<dyn Fn(&Subscription, Message) -> Message + Send + Sync>;

/// Перехватчик `Subscription::on`. Возвращённый слушатель заменяет
/// исходный.
pub type OnSubscriptionInterceptor =
    Arc<dyn Fn(&Subscription, &str, &Listener) -> Option<Listener> + Send + Sync>;

#[derive(Clone, Default)]
pub struct Interceptors {
    pub create_message: Option<CreateMessageInterceptor>,
    pub on_subscription: Option<OnSubscriptionInterceptor>,
}

/// Возможности, доступные только в тестах.
///
/// Захватываются топиками и подписками в момент их создания.
#[derive(Clone, Default)]
pub struct TestOptions {
    pub interceptors: Interceptors,
}

impl TestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intercept_create_message<F>(
        mut self,
        f: F,
    ) -> Self
    where
        F: Fn(&Subscription, Message) -> Message + Send + Sync + 'static,
    {
        self.interceptors.create_message = Some(Arc::new(f));
        self
    }

    pub fn intercept_on_subscription<F>(
        mut self,
        f: F,
    ) -> Self
    where
        F: Fn(&Subscription, &str, &Listener) -> Option<Listener> + Send + Sync + 'static,
    {
        self.interceptors.on_subscription = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for TestOptions {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("TestOptions")
            .field(
                "create_message",
                &self.interceptors.create_message.is_some(),
            )
            .field(
                "on_subscription",
                &self.interceptors.on_subscription.is_some(),
            )
            .finish()
    }
}
