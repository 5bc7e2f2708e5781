use std::time::Duration;

use async_trait::async_trait;

/// Задержка перед fan-out при публикации.
pub const PUBLISH_DELAY: Duration = Duration::from_millis(5);
/// Задержка перед повторной постановкой в очередь после `nack`.
pub const NACK_DELAY: Duration = Duration::from_millis(10);

/// Источник искусственной сетевой задержки.
///
/// Длительности фиксированы; подменяется только способ ожидания,
/// чтобы тесты могли обходиться без реального времени.
#[async_trait]
pub trait Latency: Send + Sync + 'static {
    async fn pause(
        &self,
        duration: Duration,
    );
}

/// Ждёт через `tokio::time::sleep`. Работает и с `start_paused`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioLatency;

#[async_trait]
impl Latency for TokioLatency {
    async fn pause(
        &self,
        duration: Duration,
    ) {
        tokio::time::sleep(duration).await;
    }
}

/// Не ждёт, только уступает планировщику один раз.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLatency;

#[async_trait]
impl Latency for NoLatency {
    async fn pause(
        &self,
        _duration: Duration,
    ) {
        tokio::task::yield_now().await;
    }
}
