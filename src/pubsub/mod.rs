//! Эмулятор Publish–Subscribe сервиса в памяти процесса.
//!
//! - `client`: фасад [`PubSub`], которым пользуется прикладной код.
//! - `registry`: реестр топиков и подписок, общий для клиентов.
//! - `topic`: публикация и fan-out по привязанным подпискам.
//! - `subscription`: слушатели, очередь ожидания и доставка.
//! - `message`: сообщение и повторная доставка по `nack`.
//! - `names`, `ids` (приватный): полные имена ресурсов и счётчик id.
//! - `latency`, `picker`: подменяемые задержка и выбор слушателя.
//! - `options`: параметры клиента и тестовые перехватчики.

pub mod client;
mod ids;
pub mod latency;
pub mod message;
pub mod names;
pub mod options;
pub mod picker;
pub mod registry;
pub mod subscription;
pub mod topic;

pub use client::*;
pub use latency::{Latency, NoLatency, TokioLatency, NACK_DELAY, PUBLISH_DELAY};
pub use message::{AckResponse, Attributes, Message, Payload};
pub use names::{make_subscription_name, make_topic_name, ResourceKind};
pub use options::*;
pub use picker::{FirstPicker, ListenerPicker, RandomPicker, RoundRobinPicker};
pub use registry::{Registry, RegistryBuilder};
pub use subscription::{Listener, Subscription, MESSAGE_EVENT};
pub use topic::{PublishMessage, Topic};
