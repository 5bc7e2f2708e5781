use std::{fmt, sync::Arc};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

use super::{
    latency::{Latency, TokioLatency},
    names::{make_subscription_name, make_topic_name, project_prefix},
    picker::{ListenerPicker, RandomPicker},
    subscription::SubscriptionState,
    topic::TopicState,
    Subscription, TestOptions, Topic,
};
use crate::error::{PubSubError, PubSubResult};

/// Реестр процесса: его видят все клиенты, созданные через
/// [`PubSub::new`](super::PubSub::new).
static GLOBAL_REGISTRY: Lazy<Arc<Registry>> = Lazy::new(|| Arc::new(Registry::new()));

/// Результат поиска сущности по полному имени.
pub(crate) enum Lookup<S> {
    /// Сущность есть в реестре.
    Registered(Arc<S>),
    /// Имени нет в реестре; вызывающий строит временный дескриптор.
    Unregistered(String),
}

/// Два отображения имя → сущность, общие для всех дескрипторов,
/// созданных поверх одного реестра.
///
/// Порядок вставки сохраняется и определяет порядок листинга. Проверка
/// существования и вставка выполняются под одним замком.
pub struct Registry {
    topics: RwLock<IndexMap<String, Arc<TopicState>>>,
    subscriptions: RwLock<IndexMap<String, Arc<SubscriptionState>>>,
    latency: Arc<dyn Latency>,
    picker: Arc<dyn ListenerPicker>,
}

impl Registry {
    /// Пустой реестр с задержками tokio и случайным выбором слушателя.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Общий реестр процесса.
    pub fn global() -> Arc<Registry> {
        GLOBAL_REGISTRY.clone()
    }

    pub(crate) fn latency(&self) -> Arc<dyn Latency> {
        self.latency.clone()
    }

    // === Топики ===

    pub fn create_topic(
        self: &Arc<Self>,
        project_id: &str,
        topic_name: &str,
        test_options: Arc<TestOptions>,
    ) -> PubSubResult<Topic> {
        let name = make_topic_name(project_id, topic_name)?;
        let state = {
            let mut topics = self.topics.write();
            if topics.contains_key(&name) {
                return Err(PubSubError::TopicAlreadyExists { name });
            }
            let state = Arc::new(TopicState::new(
                name.clone(),
                project_id.to_string(),
                test_options,
            ));
            topics.insert(name, state.clone());
            state
        };
        debug!(topic = %state.name(), "topic created");
        Ok(Topic::from_parts(state, self.clone()))
    }

    pub(crate) fn lookup_topic(
        &self,
        name: &str,
    ) -> Lookup<TopicState> {
        match self.topics.read().get(name) {
            Some(state) => Lookup::Registered(state.clone()),
            None => Lookup::Unregistered(name.to_string()),
        }
    }

    /// Зарегистрированный топик или временный дескриптор с тем же именем.
    pub fn topic(
        self: &Arc<Self>,
        project_id: &str,
        topic_name: &str,
        test_options: Arc<TestOptions>,
    ) -> PubSubResult<Topic> {
        let name = make_topic_name(project_id, topic_name)?;
        let state = match self.lookup_topic(&name) {
            Lookup::Registered(state) => state,
            Lookup::Unregistered(name) => Arc::new(TopicState::new(
                name,
                project_id.to_string(),
                test_options,
            )),
        };
        Ok(Topic::from_parts(state, self.clone()))
    }

    /// Удаляет именно этот топик. Временный дескриптор и дескриптор
    /// топика, пересозданного под тем же именем, получают `NotFound`.
    pub(crate) fn delete_topic(
        &self,
        state: &Arc<TopicState>,
    ) -> PubSubResult<()> {
        let name = state.name();
        {
            let mut topics = self.topics.write();
            let registered = topics
                .get(name)
                .is_some_and(|current| Arc::ptr_eq(current, state));
            if !registered {
                return Err(PubSubError::TopicNotFound {
                    name: name.to_string(),
                });
            }
            topics.shift_remove(name);
        }
        debug!(topic = %name, "topic deleted");
        Ok(())
    }

    pub fn contains_topic(
        &self,
        name: &str,
    ) -> bool {
        self.topics.read().contains_key(name)
    }

    /// Топики проекта в порядке создания.
    pub fn list_topics(
        self: &Arc<Self>,
        project_id: &str,
    ) -> Vec<Topic> {
        let prefix = project_prefix(project_id);
        self.topics
            .read()
            .iter()
            .filter(|(name, _)| name.starts_with(&prefix))
            .map(|(_, state)| Topic::from_parts(state.clone(), self.clone()))
            .collect()
    }

    // === Подписки ===

    pub(crate) fn create_subscription(
        self: &Arc<Self>,
        project_id: &str,
        subscription_name: &str,
        test_options: Arc<TestOptions>,
    ) -> PubSubResult<Subscription> {
        let name = make_subscription_name(project_id, subscription_name)?;
        let state = {
            let mut subscriptions = self.subscriptions.write();
            if subscriptions.contains_key(&name) {
                return Err(PubSubError::SubscriptionAlreadyExists { name });
            }
            let state = Arc::new(self.new_subscription_state(name.clone(), test_options));
            subscriptions.insert(name, state.clone());
            state
        };
        debug!(subscription = %state.name(), "subscription created");
        Ok(Subscription::from_parts(state, self.clone()))
    }

    pub(crate) fn subscription_state(
        &self,
        name: &str,
    ) -> Option<Arc<SubscriptionState>> {
        self.subscriptions.read().get(name).cloned()
    }

    pub(crate) fn lookup_subscription(
        &self,
        name: &str,
    ) -> Lookup<SubscriptionState> {
        match self.subscription_state(name) {
            Some(state) => Lookup::Registered(state),
            None => Lookup::Unregistered(name.to_string()),
        }
    }

    /// Зарегистрированная подписка или временный дескриптор.
    pub fn subscription(
        self: &Arc<Self>,
        project_id: &str,
        subscription_name: &str,
        test_options: Arc<TestOptions>,
    ) -> PubSubResult<Subscription> {
        let name = make_subscription_name(project_id, subscription_name)?;
        let state = match self.lookup_subscription(&name) {
            Lookup::Registered(state) => state,
            Lookup::Unregistered(name) => Arc::new(self.new_subscription_state(name, test_options)),
        };
        Ok(Subscription::from_parts(state, self.clone()))
    }

    /// То же, что [`Registry::delete_topic`], для подписок.
    pub(crate) fn delete_subscription(
        &self,
        state: &Arc<SubscriptionState>,
    ) -> PubSubResult<()> {
        let name = state.name();
        {
            let mut subscriptions = self.subscriptions.write();
            let registered = subscriptions
                .get(name)
                .is_some_and(|current| Arc::ptr_eq(current, state));
            if !registered {
                return Err(PubSubError::SubscriptionNotFound {
                    name: name.to_string(),
                });
            }
            subscriptions.shift_remove(name);
        }
        debug!(subscription = %name, "subscription deleted");
        Ok(())
    }

    pub fn contains_subscription(
        &self,
        name: &str,
    ) -> bool {
        self.subscriptions.read().contains_key(name)
    }

    /// Подписки проекта в порядке создания.
    pub fn list_subscriptions(
        self: &Arc<Self>,
        project_id: &str,
    ) -> Vec<Subscription> {
        let prefix = project_prefix(project_id);
        self.subscriptions
            .read()
            .iter()
            .filter(|(name, _)| name.starts_with(&prefix))
            .map(|(_, state)| Subscription::from_parts(state.clone(), self.clone()))
            .collect()
    }

    /// Удаляет все топики и подписки.
    pub fn clear(&self) {
        self.topics.write().clear();
        self.subscriptions.write().clear();
    }

    pub fn topic_count(&self) -> usize {
        self.topics.read().len()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    fn new_subscription_state(
        &self,
        name: String,
        test_options: Arc<TestOptions>,
    ) -> SubscriptionState {
        SubscriptionState::new(
            name,
            self.picker.clone(),
            self.latency.clone(),
            test_options,
        )
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Registry")
            .field("topics", &self.topics.read().keys().collect::<Vec<_>>())
            .field(
                "subscriptions",
                &self.subscriptions.read().keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Построитель изолированного реестра.
#[derive(Default)]
pub struct RegistryBuilder {
    latency: Option<Arc<dyn Latency>>,
    picker: Option<Arc<dyn ListenerPicker>>,
}

impl RegistryBuilder {
    pub fn latency(
        mut self,
        latency: impl Latency,
    ) -> Self {
        self.latency = Some(Arc::new(latency));
        self
    }

    pub fn picker(
        mut self,
        picker: impl ListenerPicker,
    ) -> Self {
        self.picker = Some(Arc::new(picker));
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            topics: RwLock::new(IndexMap::new()),
            subscriptions: RwLock::new(IndexMap::new()),
            latency: self.latency.unwrap_or_else(|| Arc::new(TokioLatency)),
            picker: self.picker.unwrap_or_else(|| Arc::new(RandomPicker)),
        }
    }
}
