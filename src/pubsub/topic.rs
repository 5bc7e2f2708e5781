use std::{fmt, sync::Arc};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{
    ids,
    latency::PUBLISH_DELAY,
    message::{create_message, Attributes, Payload},
    registry::{Lookup, Registry},
    PublishOptions, Subscription, TestOptions,
};
use crate::error::PubSubResult;

/// Аргумент [`Topic::publish_message`].
///
/// Если `data` отсутствует, используется `json`, сериализованный в текст.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublishMessage {
    #[serde(skip)]
    pub data: Option<Payload>,
    pub json: Option<serde_json::Value>,
    pub attributes: Option<Attributes>,
}

impl PublishMessage {
    pub fn data(data: impl Into<Payload>) -> Self {
        Self {
            data: Some(data.into()),
            ..Self::default()
        }
    }

    pub fn json(value: serde_json::Value) -> Self {
        Self {
            json: Some(value),
            ..Self::default()
        }
    }

    pub fn with_attributes(
        mut self,
        attributes: Attributes,
    ) -> Self {
        self.attributes = Some(attributes);
        self
    }

    fn into_parts(self) -> (Payload, Attributes) {
        let payload = match (self.data, self.json) {
            (Some(data), _) => data,
            (None, Some(json)) => Payload::Text(json.to_string()),
            (None, None) => Payload::Empty,
        };
        (payload, self.attributes.unwrap_or_default())
    }
}

pub(crate) struct TopicState {
    name: String,
    project_id: String,
    /// Имена привязанных подписок в порядке создания. Не уплотняется при
    /// удалении подписки: имена сверяются с реестром при каждой публикации.
    bindings: Mutex<Vec<String>>,
    test_options: Arc<TestOptions>,
}

impl TopicState {
    pub(crate) fn new(
        name: String,
        project_id: String,
        test_options: Arc<TestOptions>,
    ) -> Self {
        Self {
            name,
            project_id,
            bindings: Mutex::new(Vec::new()),
            test_options,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn bind(
        &self,
        subscription_name: String,
    ) {
        self.bindings.lock().push(subscription_name);
    }

    fn bound_names(&self) -> Vec<String> {
        self.bindings.lock().clone()
    }
}

/// Дескриптор топика.
///
/// Как и [`Subscription`], может быть временным: такой топик не хранится
/// в реестре, публикация в него никому ничего не доставляет, а `delete`
/// возвращает `NotFound`.
#[derive(Clone)]
pub struct Topic {
    state: Arc<TopicState>,
    registry: Arc<Registry>,
}

impl Topic {
    pub(crate) fn from_parts(
        state: Arc<TopicState>,
        registry: Arc<Registry>,
    ) -> Self {
        Self { state, registry }
    }

    pub fn name(&self) -> &str {
        self.state.name()
    }

    /// Реестр хранит под этим именем именно этот топик, а не пересозданный.
    pub fn is_registered(&self) -> bool {
        matches!(
            self.registry.lookup_topic(self.name()),
            Lookup::Registered(state) if Arc::ptr_eq(&state, &self.state)
        )
    }

    /// Удаляет топик из реестра. Подписки остаются.
    pub async fn delete(&self) -> PubSubResult<()> {
        self.registry.delete_topic(&self.state)
    }

    /// Создаёт подписку и привязывает её к этому топику.
    pub async fn create_subscription(
        &self,
        subscription_name: &str,
    ) -> PubSubResult<Subscription> {
        let subscription = self.registry.create_subscription(
            &self.state.project_id,
            subscription_name,
            self.state.test_options.clone(),
        )?;
        self.state.bind(subscription.name().to_string());
        Ok(subscription)
    }

    /// Подписка по имени; для незарегистрированного имени возвращается
    /// временный дескриптор.
    pub fn subscription(
        &self,
        subscription_name: &str,
    ) -> PubSubResult<Subscription> {
        self.registry.subscription(
            &self.state.project_id,
            subscription_name,
            self.state.test_options.clone(),
        )
    }

    /// Живые подписки, привязанные к топику, в порядке создания.
    pub async fn get_subscriptions(&self) -> PubSubResult<Vec<Subscription>> {
        Ok(self
            .state
            .bound_names()
            .iter()
            .filter_map(|name| self.registry.subscription_state(name))
            .map(|state| Subscription::from_parts(state, self.registry.clone()))
            .collect())
    }

    pub fn set_publish_options(
        &self,
        _options: PublishOptions,
    ) {
    }

    /// Публикует сообщение во все привязанные подписки и возвращает его id.
    pub async fn publish(
        &self,
        data: impl Into<Payload>,
        attributes: Option<Attributes>,
    ) -> PubSubResult<String> {
        Ok(self
            .fan_out(data.into(), attributes.unwrap_or_default())
            .await)
    }

    pub async fn publish_message(
        &self,
        message: PublishMessage,
    ) -> PubSubResult<String> {
        let (payload, attributes) = message.into_parts();
        Ok(self.fan_out(payload, attributes).await)
    }

    /// Список подписок фиксируется до задержки; каждое имя сверяется с
    /// реестром уже после неё, удалённые за это время пропускаются.
    async fn fan_out(
        &self,
        payload: Payload,
        attributes: Attributes,
    ) -> String {
        let bound = self.state.bound_names();
        self.registry.latency().pause(PUBLISH_DELAY).await;

        let message_id = ids::next_sequence_string();
        let data = payload.into_bytes();
        let mut delivered = 0usize;

        for name in &bound {
            let Some(subscription_state) = self.registry.subscription_state(name) else {
                trace!(topic = %self.name(), subscription = %name, "skipping unregistered subscription");
                continue;
            };
            let mut message = create_message(
                &message_id,
                &subscription_state,
                data.clone(),
                attributes.clone(),
            );
            if let Some(intercept) = &self.state.test_options.interceptors.create_message {
                let subscription =
                    Subscription::from_parts(subscription_state.clone(), self.registry.clone());
                message = intercept(&subscription, message);
            }
            subscription_state.queue_message(message);
            delivered += 1;
        }

        debug!(
            topic = %self.name(),
            message_id = %message_id,
            subscriptions = delivered,
            "message published"
        );
        message_id
    }
}

impl PartialEq for Topic {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl fmt::Debug for Topic {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Topic")
            .field("name", &self.state.name)
            .field("subscriptions", &self.state.bound_names())
            .finish()
    }
}
