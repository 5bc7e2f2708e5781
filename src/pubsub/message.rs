use std::{
    collections::BTreeMap,
    fmt,
    sync::{Arc, Weak},
};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{trace, warn};

use super::{ids, latency::NACK_DELAY, subscription::SubscriptionState};

/// Атрибуты сообщения (ключ → значение).
pub type Attributes = BTreeMap<String, String>;

/// Исходные данные сообщения до нормализации в байты.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Payload {
    /// Бинарный буфер, используется как есть.
    Bytes(Bytes),
    /// Текст, кодируется в UTF-8.
    Text(String),
    /// Отсутствующие данные превращаются в пустой буфер.
    #[default]
    Empty,
}

impl Payload {
    pub fn into_bytes(self) -> Bytes {
        match self {
            Self::Bytes(b) => b,
            Self::Text(s) => Bytes::from(s),
            Self::Empty => Bytes::new(),
        }
    }
}

impl From<Bytes> for Payload {
    fn from(value: Bytes) -> Self {
        Self::Bytes(value)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(value))
    }
}

impl From<&[u8]> for Payload {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(Bytes::copy_from_slice(value))
    }
}

impl<const N: usize> From<&[u8; N]> for Payload {
    fn from(value: &[u8; N]) -> Self {
        Self::Bytes(Bytes::copy_from_slice(value))
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl<T: Into<Payload>> From<Option<T>> for Payload {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// Фиксированный ответ `*_with_response` методов.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckResponse {
    Success,
}

impl AckResponse {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
        }
    }
}

impl fmt::Display for AckResponse {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct MessageInner {
    ack_id: String,
    id: String,
    data: Bytes,
    attributes: Attributes,
    publish_time: DateTime<Utc>,
    received: i64,
    subscription: Weak<SubscriptionState>,
}

/// Сообщение, доставляемое слушателю подписки.
///
/// Клонирование дешёвое: все клоны ссылаются на один и тот же объект,
/// и именно он возвращается в очередь при `nack`.
#[derive(Clone)]
pub struct Message {
    inner: Arc<MessageInner>,
}

/// Собирает сообщение для конкретной подписки.
///
/// `ack_id` имеет вид `<имя подписки>:<номер>`; вычисляемые поля
/// фиксируются в момент создания.
pub(crate) fn create_message(
    id: &str,
    subscription: &Arc<SubscriptionState>,
    data: impl Into<Payload>,
    attributes: Attributes,
) -> Message {
    let data = data.into().into_bytes();
    let now = Utc::now();
    Message {
        inner: Arc::new(MessageInner {
            ack_id: format!("{}:{}", subscription.name(), ids::next_sequence_string()),
            id: id.to_string(),
            data,
            attributes,
            publish_time: now,
            received: now.timestamp_millis(),
            subscription: Arc::downgrade(subscription),
        }),
    }
}

impl Message {
    pub fn ack_id(&self) -> &str {
        &self.inner.ack_id
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn data(&self) -> &Bytes {
        &self.inner.data
    }

    /// Данные как UTF-8 строка (с заменой некорректных последовательностей).
    pub fn data_lossy(&self) -> String {
        String::from_utf8_lossy(&self.inner.data).into_owned()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.inner.attributes
    }

    pub fn length(&self) -> usize {
        self.inner.data.len()
    }

    /// Счётчик попыток доставки не ведётся.
    pub fn delivery_attempt(&self) -> u32 {
        0
    }

    pub fn publish_time(&self) -> DateTime<Utc> {
        self.inner.publish_time
    }

    /// Время получения, миллисекунды Unix epoch.
    pub fn received(&self) -> i64 {
        self.inner.received
    }

    pub fn is_exactly_once_delivery(&self) -> bool {
        false
    }

    pub fn ordering_key(&self) -> &str {
        ""
    }

    /// `true`, если оба значения являются одним и тем же сообщением.
    pub fn same_delivery(
        &self,
        other: &Message,
    ) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Копия сообщения с другими атрибутами. Предназначено для
    /// перехватчиков создания сообщений.
    pub fn with_attributes(
        &self,
        attributes: Attributes,
    ) -> Message {
        Message {
            inner: Arc::new(MessageInner {
                ack_id: self.inner.ack_id.clone(),
                id: self.inner.id.clone(),
                data: self.inner.data.clone(),
                attributes,
                publish_time: self.inner.publish_time,
                received: self.inner.received,
                subscription: self.inner.subscription.clone(),
            }),
        }
    }

    pub fn ack(&self) {}

    pub fn ack_failed(
        &self,
        error: &dyn std::error::Error,
    ) {
        trace!(ack_id = %self.inner.ack_id, %error, "ack failed");
    }

    pub fn end_parent_span(&self) {}

    pub fn mod_ack(
        &self,
        _deadline_secs: u32,
    ) {
    }

    pub async fn ack_with_response(&self) -> AckResponse {
        AckResponse::Success
    }

    pub async fn mod_ack_with_response(
        &self,
        _deadline_secs: u32,
    ) -> AckResponse {
        AckResponse::Success
    }

    /// Планирует повторную доставку этого же сообщения через
    /// [`NACK_DELAY`]. Отменить её нельзя.
    pub fn nack(&self) {
        let Some(subscription) = self.inner.subscription.upgrade() else {
            trace!(ack_id = %self.inner.ack_id, "nack on dropped subscription ignored");
            return;
        };
        let message = self.clone();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let latency = subscription.latency();
                handle.spawn(async move {
                    latency.pause(NACK_DELAY).await;
                    subscription.queue_message(message);
                });
            }
            Err(_) => {
                warn!(
                    ack_id = %self.inner.ack_id,
                    "no tokio runtime, redelivering synchronously"
                );
                subscription.queue_message(message);
            }
        }
    }

    pub async fn nack_with_response(&self) -> AckResponse {
        self.nack();
        AckResponse::Success
    }
}

impl fmt::Debug for Message {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Message")
            .field("ack_id", &self.inner.ack_id)
            .field("id", &self.inner.id)
            .field("length", &self.inner.data.len())
            .field("attributes", &self.inner.attributes)
            .field("publish_time", &self.inner.publish_time)
            .finish()
    }
}
