use std::{collections::VecDeque, fmt, sync::Arc};

use parking_lot::Mutex;
use tracing::trace;

use super::{
    latency::Latency,
    picker::ListenerPicker,
    registry::{Lookup, Registry},
    Message, TestOptions,
};
use crate::error::PubSubResult;

/// Имя единственного события, на которое доставляются сообщения.
pub const MESSAGE_EVENT: &str = "message";

/// Обработчик входящих сообщений.
///
/// Вызывается синхронно; если обработка асинхронная, слушатель сам
/// запускает задачу, движок её завершения не ждёт.
pub type Listener = Arc<dyn Fn(Message) + Send + Sync>;

#[derive(Default)]
struct Delivery {
    listeners: Vec<Listener>,
    pending: VecDeque<Message>,
    /// Очередь уже раздаётся выше по стеку или в другом потоке.
    draining: bool,
}

/// Снимает флаг `draining`, если слушатель паникует посреди раздачи.
struct DrainGuard<'a> {
    delivery: &'a Mutex<Delivery>,
    armed: bool,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.delivery.lock().draining = false;
        }
    }
}

/// Общее состояние подписки: список слушателей и очередь ожидающих
/// сообщений. Все дескрипторы [`Subscription`] с одним именем в одном
/// реестре указывают на один и тот же объект.
pub(crate) struct SubscriptionState {
    name: String,
    delivery: Mutex<Delivery>,
    picker: Arc<dyn ListenerPicker>,
    latency: Arc<dyn Latency>,
    test_options: Arc<TestOptions>,
}

impl SubscriptionState {
    pub(crate) fn new(
        name: String,
        picker: Arc<dyn ListenerPicker>,
        latency: Arc<dyn Latency>,
        test_options: Arc<TestOptions>,
    ) -> Self {
        Self {
            name,
            delivery: Mutex::new(Delivery::default()),
            picker,
            latency,
            test_options,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn latency(&self) -> Arc<dyn Latency> {
        self.latency.clone()
    }

    pub(crate) fn test_options(&self) -> &Arc<TestOptions> {
        &self.test_options
    }

    /// Ставит сообщение в конец очереди и сразу пытается доставить.
    pub(crate) fn queue_message(
        &self,
        message: Message,
    ) {
        trace!(subscription = %self.name, ack_id = %message.ack_id(), "message queued");
        self.delivery.lock().pending.push_back(message);
        self.process_queue();
    }

    fn add_listener(
        &self,
        listener: Listener,
    ) {
        self.delivery.lock().listeners.push(listener);
        self.process_queue();
    }

    fn clear_listeners(&self) {
        self.delivery.lock().listeners.clear();
    }

    /// Раздаёт очередь в порядке FIFO, выбирая слушателя для каждого
    /// сообщения заново. Замок не удерживается во время вызова слушателя,
    /// поэтому слушатель может вызывать `on`, `nack` и
    /// `remove_all_listeners`.
    ///
    /// Раздачу ведёт только один вызов: вложенный (из слушателя) или
    /// параллельный вызов лишь оставляет сообщение в очереди, и его
    /// доставляет уже работающий цикл. Флаг снимается под тем же замком,
    /// под которым очередь признана пустой, поэтому сообщения не теряются.
    fn process_queue(&self) {
        {
            let mut delivery = self.delivery.lock();
            if delivery.draining {
                return;
            }
            delivery.draining = true;
        }
        let mut guard = DrainGuard {
            delivery: &self.delivery,
            armed: true,
        };

        loop {
            let (listener, message) = {
                let mut delivery = self.delivery.lock();
                let next = if delivery.listeners.is_empty() {
                    None
                } else {
                    delivery.pending.pop_front()
                };
                let Some(message) = next else {
                    delivery.draining = false;
                    guard.armed = false;
                    return;
                };
                let len = delivery.listeners.len();
                let idx = self.picker.pick(len).min(len - 1);
                (delivery.listeners[idx].clone(), message)
            };
            trace!(
                subscription = %self.name,
                ack_id = %message.ack_id(),
                "delivering message"
            );
            listener(message);
        }
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.delivery.lock().listeners.len()
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.delivery.lock().pending.len()
    }

    #[cfg(test)]
    pub(crate) fn pending_snapshot(&self) -> Vec<Message> {
        self.delivery.lock().pending.iter().cloned().collect()
    }
}

/// Дескриптор подписки.
///
/// Может указывать на зарегистрированную подписку или быть временным
/// (возвращается при поиске по имени, которого нет в реестре). Временный
/// дескриптор принимает слушателей, но сообщения в него не публикуются,
/// а `delete` завершается ошибкой `NotFound`.
#[derive(Clone)]
pub struct Subscription {
    state: Arc<SubscriptionState>,
    registry: Arc<Registry>,
}

impl Subscription {
    pub(crate) fn from_parts(
        state: Arc<SubscriptionState>,
        registry: Arc<Registry>,
    ) -> Self {
        Self { state, registry }
    }

    pub fn name(&self) -> &str {
        self.state.name()
    }

    /// Подписка присутствует в реестре под этим именем.
    pub fn is_registered(&self) -> bool {
        matches!(
            self.registry.lookup_subscription(self.name()),
            Lookup::Registered(state) if Arc::ptr_eq(&state, &self.state)
        )
    }

    /// Регистрирует слушателя события `event`.
    ///
    /// Для `"message"` слушатель добавляется в конец списка, после чего
    /// вся текущая очередь сразу раздаётся. Остальные события ничего не
    /// доставляют и не являются ошибкой.
    pub fn on<F>(
        &self,
        event: &str,
        listener: F,
    ) -> &Self
    where
        F: Fn(Message) + Send + Sync + 'static,
    {
        self.on_listener(event, Arc::new(listener))
    }

    /// То же, что [`Subscription::on`], для уже упакованного слушателя.
    pub fn on_listener(
        &self,
        event: &str,
        listener: Listener,
    ) -> &Self {
        let listener = match &self.state.test_options().interceptors.on_subscription {
            Some(intercept) => intercept(self, event, &listener).unwrap_or(listener),
            None => listener,
        };
        if event != MESSAGE_EVENT {
            trace!(subscription = %self.name(), event, "ignoring non-message listener");
            return self;
        }
        self.state.add_listener(listener);
        self
    }

    /// Удаляет всех слушателей. Уже доставленные и ожидающие сообщения
    /// не затрагиваются.
    pub fn remove_all_listeners(&self) -> &Self {
        self.state.clear_listeners();
        self
    }

    /// Вариант с именем события. Хранятся только слушатели `"message"`,
    /// поэтому список очищается при любом имени.
    pub fn remove_all_listeners_for(
        &self,
        _event: &str,
    ) -> &Self {
        self.remove_all_listeners()
    }

    pub async fn close(&self) -> PubSubResult<()> {
        Ok(())
    }

    /// Удаляет подписку из реестра. Слушатели и очередь не трогаются.
    pub async fn delete(&self) -> PubSubResult<()> {
        self.registry.delete_subscription(&self.state)
    }

    pub fn listener_count(&self) -> usize {
        self.state.listener_count()
    }

    /// Количество сообщений, ожидающих слушателя.
    pub fn pending_len(&self) -> usize {
        self.state.pending_len()
    }

    /// Ставит сообщение в очередь этой подписки, как это делает
    /// публикация и `nack`.
    pub fn queue_message(
        &self,
        message: Message,
    ) {
        self.state.queue_message(message);
    }
}

impl PartialEq for Subscription {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("name", &self.state.name)
            .field("listeners", &self.listener_count())
            .field("pending", &self.pending_len())
            .finish()
    }
}
