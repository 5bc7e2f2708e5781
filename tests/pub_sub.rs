use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use mock_pubsub::{pubsub::RoundRobinPicker, Attributes, Payload, PublishMessage};
use serde_json::json;

mod common;
use common::*;

fn attrs(pairs: &[(&str, &str)]) -> Attributes {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Каждая подписка получает свою копию: общий id, разные ack-id.
#[tokio::test(start_paused = true)]
async fn test_publish_reaches_every_subscription() -> Result<(), Box<dyn std::error::Error>> {
    let pubsub = isolated_client();
    let topic = pubsub.create_topic("topic1").await?;
    let sub1 = topic.create_subscription("sub1").await?;
    let sub2 = topic.create_subscription("sub2").await?;
    let inbox1 = collect(&sub1);
    let inbox2 = collect(&sub2);

    let message_id = topic
        .publish(
            Payload::from(b"Test message!"),
            Some(attrs(&[("kacsa", "hap")])),
        )
        .await?;

    assert!(wait_for(|| !inbox1.lock().is_empty() && !inbox2.lock().is_empty()).await);
    let m1 = inbox1.lock()[0].clone();
    let m2 = inbox2.lock()[0].clone();

    assert_eq!(m1.data_lossy(), "Test message!");
    assert_eq!(m2.data_lossy(), "Test message!");
    assert_eq!(m1.attributes(), &attrs(&[("kacsa", "hap")]));
    assert_eq!(m1.attributes(), m2.attributes());
    assert_eq!(m1.id(), message_id);
    assert_eq!(m1.id(), m2.id());
    assert_ne!(m1.ack_id(), m2.ack_id());

    sub1.remove_all_listeners();
    sub2.remove_all_listeners();
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_publish_without_subscriptions_returns_id() {
    let pubsub = isolated_client();
    let topic = pubsub.create_topic("topic1").await.unwrap();
    for _ in 0..5 {
        let id = topic.publish("Test message!", None).await.unwrap();
        assert!(id.parse::<u64>().is_ok());
    }
    assert!(pubsub.get_subscriptions().await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_publish_message_with_data() {
    let pubsub = isolated_client();
    let topic = pubsub.create_topic("topic1").await.unwrap();
    let sub1 = topic.create_subscription("sub1").await.unwrap();
    let sub2 = topic.create_subscription("sub2").await.unwrap();
    let inbox1 = collect(&sub1);
    let inbox2 = collect(&sub2);

    let id = topic
        .publish_message(
            PublishMessage::data(b"Test message!").with_attributes(attrs(&[("kacsa", "hap")])),
        )
        .await
        .unwrap();

    assert_eq!(inbox1.lock().len(), 1);
    assert_eq!(inbox2.lock().len(), 1);
    let m1 = inbox1.lock()[0].clone();
    let m2 = inbox2.lock()[0].clone();
    assert_eq!(m1.id(), id);
    assert_eq!(m2.id(), id);
    assert_ne!(m1.ack_id(), m2.ack_id());
    assert_eq!(m2.attributes().get("kacsa").map(String::as_str), Some("hap"));
}

#[tokio::test(start_paused = true)]
async fn test_publish_message_with_json() {
    let pubsub = isolated_client();
    let topic = pubsub.create_topic("topic1").await.unwrap();
    let sub = topic.create_subscription("sub1").await.unwrap();
    let inbox = collect(&sub);

    topic
        .publish_message(
            PublishMessage::json(json!({"data": "Test message!"}))
                .with_attributes(attrs(&[("kacsa", "hap")])),
        )
        .await
        .unwrap();

    let msg = inbox.lock()[0].clone();
    let parsed: serde_json::Value = serde_json::from_slice(msg.data()).unwrap();
    assert_eq!(parsed, json!({"data": "Test message!"}));
    assert_eq!(msg.attributes(), &attrs(&[("kacsa", "hap")]));
}

#[tokio::test(start_paused = true)]
async fn test_publish_message_without_subscriptions_returns_id() {
    let pubsub = isolated_client();
    let topic = pubsub.create_topic("topic1").await.unwrap();
    let id = topic
        .publish_message(PublishMessage::json(json!({"data": "x"})))
        .await
        .unwrap();
    assert!(!id.is_empty());
}

/// Сообщение, опубликованное до появления слушателя, доставляется
/// ровно один раз в момент регистрации первого слушателя.
#[tokio::test(start_paused = true)]
async fn test_message_published_before_listener() {
    let pubsub = isolated_client();
    let topic = pubsub.create_topic("t1").await.unwrap();
    let sub = topic.create_subscription("s1").await.unwrap();

    topic
        .publish(Payload::from(b"hello"), Some(attrs(&[("k", "v")])))
        .await
        .unwrap();
    assert_eq!(sub.pending_len(), 1);

    let inbox = collect(&sub);
    // Доставка синхронная, ожидание не нужно.
    assert_eq!(inbox.lock().len(), 1);
    assert_eq!(sub.pending_len(), 0);

    let msg = inbox.lock()[0].clone();
    assert_eq!(msg.data_lossy(), "hello");
    assert_eq!(msg.attributes().get("k").map(String::as_str), Some("v"));

    let late = collect(&sub);
    assert!(late.lock().is_empty());
    assert_eq!(inbox.lock().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_only_message_listeners_receive() {
    let pubsub = isolated_client();
    let topic = pubsub.create_topic("topic1").await.unwrap();
    let sub = topic.create_subscription("sub1").await.unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    sub.on("error", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    topic.publish("message-data", None).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(sub.pending_len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_listeners_share_messages_round_robin() {
    let pubsub = isolated_client_with(RoundRobinPicker::new());
    let topic = pubsub.create_topic("topic1").await.unwrap();
    let sub = topic.create_subscription("sub1").await.unwrap();
    let inbox1 = collect(&sub);
    let inbox2 = collect(&sub);

    for _ in 0..10 {
        topic.publish("message-data", None).await.unwrap();
    }

    assert_eq!(inbox1.lock().len(), 5);
    assert_eq!(inbox2.lock().len(), 5);
    sub.remove_all_listeners();
}

/// Случайный выбор не голодает ни одного слушателя.
#[tokio::test(start_paused = true)]
async fn test_random_selection_reaches_all_listeners() {
    let pubsub = isolated_client();
    let topic = pubsub.create_topic("topic1").await.unwrap();
    let sub = topic.create_subscription("sub1").await.unwrap();
    let inbox1 = collect(&sub);
    let inbox2 = collect(&sub);

    for _ in 0..60 {
        topic.publish("message-data", None).await.unwrap();
    }

    let (n1, n2) = (inbox1.lock().len(), inbox2.lock().len());
    assert_eq!(n1 + n2, 60);
    assert!(n1 >= 1);
    assert!(n2 >= 1);
}

#[tokio::test(start_paused = true)]
async fn test_remove_all_listeners_keeps_message_queued() {
    let pubsub = isolated_client();
    let topic = pubsub.create_topic("topic1").await.unwrap();
    let sub = topic.create_subscription("sub1").await.unwrap();

    let first = collect(&sub);
    sub.remove_all_listeners();
    topic.publish("queued", None).await.unwrap();

    assert!(first.lock().is_empty());
    assert_eq!(sub.pending_len(), 1);

    let second = collect(&sub);
    assert_eq!(second.lock().len(), 1);
    assert_eq!(second.lock()[0].data_lossy(), "queued");
    assert!(first.lock().is_empty());
}

/// Дескриптор, полученный через поиск, разделяет очередь с исходным.
#[tokio::test(start_paused = true)]
async fn test_lookup_handle_receives_messages() {
    let pubsub = isolated_client();
    let topic = pubsub.create_topic("topic1").await.unwrap();
    topic.create_subscription("sub1").await.unwrap();

    topic.publish("x", None).await.unwrap();
    let inbox = collect(&pubsub.subscription("sub1").unwrap());
    assert_eq!(inbox.lock().len(), 1);
}

/// Удалённая подписка пропускается при fan-out.
#[tokio::test(start_paused = true)]
async fn test_deleted_subscription_is_skipped() {
    let pubsub = isolated_client();
    let topic = pubsub.create_topic("topic1").await.unwrap();
    let kept = topic.create_subscription("kept").await.unwrap();
    let dropped = topic.create_subscription("dropped").await.unwrap();
    dropped.delete().await.unwrap();

    let kept_inbox = collect(&kept);
    let dropped_inbox = collect(&dropped);
    topic.publish("x", None).await.unwrap();

    assert_eq!(kept_inbox.lock().len(), 1);
    assert!(dropped_inbox.lock().is_empty());

    let names: Vec<_> = topic
        .get_subscriptions()
        .await
        .unwrap()
        .iter()
        .map(|s| s.name().to_string())
        .collect();
    assert_eq!(names, vec![format!("projects/{PROJECT_ID}/subscriptions/kept")]);
}

/// Подписка, удалённая во время задержки публикации, сообщение не получает.
#[tokio::test(start_paused = true)]
async fn test_subscription_deleted_during_publish_delay() {
    let pubsub = isolated_client();
    let topic = pubsub.create_topic("topic1").await.unwrap();
    let sub = topic.create_subscription("sub1").await.unwrap();
    let inbox = collect(&sub);

    let publisher = {
        let topic = topic.clone();
        tokio::spawn(async move { topic.publish("late", None).await })
    };
    tokio::task::yield_now().await;
    sub.delete().await.unwrap();
    publisher.await.unwrap().unwrap();

    assert!(inbox.lock().is_empty());
}

/// Подписка, созданная после начала публикации, её не видит.
#[tokio::test(start_paused = true)]
async fn test_subscription_created_during_publish_delay() {
    let pubsub = isolated_client();
    let topic = pubsub.create_topic("topic1").await.unwrap();

    let publisher = {
        let topic = topic.clone();
        tokio::spawn(async move { topic.publish("early", None).await })
    };
    tokio::task::yield_now().await;
    let sub = topic.create_subscription("sub1").await.unwrap();
    publisher.await.unwrap().unwrap();

    assert_eq!(sub.pending_len(), 0);
}

/// Топик, пересозданный после удаления, не наследует старые подписки.
#[tokio::test(start_paused = true)]
async fn test_recreated_topic_does_not_reach_old_subscription() {
    let pubsub = isolated_client();
    let topic = pubsub.create_topic("topic1").await.unwrap();
    let old = topic.create_subscription("sub1").await.unwrap();
    topic.delete().await.unwrap();

    assert!(old.is_registered());
    let old_inbox = collect(&old);

    let recreated = pubsub.create_topic("topic1").await.unwrap();
    recreated.publish("x", None).await.unwrap();
    assert!(old_inbox.lock().is_empty());

    let fresh = recreated.create_subscription("sub2").await.unwrap();
    let fresh_inbox = collect(&fresh);
    recreated.publish("y", None).await.unwrap();
    assert_eq!(fresh_inbox.lock().len(), 1);
    assert!(old_inbox.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_fifo_order_with_single_listener() {
    let pubsub = isolated_client();
    let topic = pubsub.create_topic("topic1").await.unwrap();
    let sub = topic.create_subscription("sub1").await.unwrap();
    for body in ["1", "2", "3"] {
        topic.publish(body, None).await.unwrap();
    }
    let inbox = collect(&sub);
    let bodies: Vec<_> = inbox.lock().iter().map(|m| m.data_lossy()).collect();
    assert_eq!(bodies, vec!["1", "2", "3"]);
}
