use std::sync::Arc;

use tracing::debug;

use super::{registry::Registry, ClientOptions, Subscription, TestOptions, Topic};
use crate::error::PubSubResult;

/// Клиент эмулятора, повторяющий форму настоящего клиента Pub/Sub.
///
/// Сам клиент состояния не хранит: все операции делегируются реестру.
/// Клиенты, созданные через [`PubSub::new`], делят реестр процесса.
#[derive(Debug, Clone)]
pub struct PubSub {
    project_id: String,
    registry: Arc<Registry>,
    test_options: Arc<TestOptions>,
}

impl PubSub {
    pub fn new(options: ClientOptions) -> Self {
        Self::with_registry(options, Registry::global())
    }

    /// Клиент поверх отдельного реестра (изоляция тестов друг от друга).
    pub fn with_registry(
        options: ClientOptions,
        registry: Arc<Registry>,
    ) -> Self {
        Self::build(options, registry, TestOptions::default())
    }

    /// Клиент с перехватчиками, доступными только в тестах.
    pub fn with_test_options(
        options: ClientOptions,
        test_options: TestOptions,
    ) -> Self {
        Self::build(options, Registry::global(), test_options)
    }

    pub fn build(
        options: ClientOptions,
        registry: Arc<Registry>,
        test_options: TestOptions,
    ) -> Self {
        let project_id = options.project_id().to_string();
        debug!(project_id = %project_id, ?test_options, "pubsub client created");
        Self {
            project_id,
            registry,
            test_options: Arc::new(test_options),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub async fn create_topic(
        &self,
        topic_name: &str,
    ) -> PubSubResult<Topic> {
        self.registry
            .create_topic(&self.project_id, topic_name, self.test_options.clone())
    }

    /// Топики этого проекта в порядке создания.
    pub async fn get_topics(&self) -> PubSubResult<Vec<Topic>> {
        Ok(self.registry.list_topics(&self.project_id))
    }

    /// Подписки этого проекта в порядке создания.
    pub async fn get_subscriptions(&self) -> PubSubResult<Vec<Subscription>> {
        Ok(self.registry.list_subscriptions(&self.project_id))
    }

    /// Топик по короткому или полному имени. Отсутствие топика ошибкой
    /// не считается; ошибка возможна только для некорректного полного имени.
    pub fn topic(
        &self,
        topic_name: &str,
    ) -> PubSubResult<Topic> {
        self.registry
            .topic(&self.project_id, topic_name, self.test_options.clone())
    }

    pub fn subscription(
        &self,
        subscription_name: &str,
    ) -> PubSubResult<Subscription> {
        self.registry
            .subscription(&self.project_id, subscription_name, self.test_options.clone())
    }
}

impl Default for PubSub {
    fn default() -> Self {
        Self::new(ClientOptions::default())
    }
}
