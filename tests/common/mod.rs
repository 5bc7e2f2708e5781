#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use mock_pubsub::{
    pubsub::{ListenerPicker, RandomPicker},
    ClientOptions, Message, PubSub, Registry, Subscription, MESSAGE_EVENT,
};
use parking_lot::Mutex;

pub const PROJECT_ID: &str = "test-project";

/// Клиент поверх нового изолированного реестра.
pub fn isolated_client() -> PubSub {
    isolated_client_with(RandomPicker)
}

pub fn isolated_client_with(picker: impl ListenerPicker) -> PubSub {
    let registry = Arc::new(Registry::builder().picker(picker).build());
    PubSub::with_registry(ClientOptions::with_project_id(PROJECT_ID), registry)
}

/// Второй клиент другого проекта поверх того же реестра.
pub fn sibling_client(
    client: &PubSub,
    project_id: &str,
) -> PubSub {
    PubSub::with_registry(
        ClientOptions::with_project_id(project_id),
        client.registry().clone(),
    )
}

pub type Inbox = Arc<Mutex<Vec<Message>>>;

/// Подписывает слушателя, складывающего сообщения в общий список.
pub fn collect(subscription: &Subscription) -> Inbox {
    let inbox: Inbox = Arc::new(Mutex::new(Vec::new()));
    let sink = inbox.clone();
    subscription.on(MESSAGE_EVENT, move |m| sink.lock().push(m));
    inbox
}

/// Ждёт, пока условие не станет истинным, с ограничением по времени.
pub async fn wait_for<F>(mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    for _ in 0..1000 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    condition()
}
