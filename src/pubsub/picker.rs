use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;

/// Стратегия выбора слушателя для очередного сообщения.
///
/// `pick` вызывается только при `len > 0` и обязан вернуть индекс `< len`.
pub trait ListenerPicker: Send + Sync + 'static {
    fn pick(
        &self,
        len: usize,
    ) -> usize;
}

/// Равномерно случайный выбор.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPicker;

impl ListenerPicker for RandomPicker {
    fn pick(
        &self,
        len: usize,
    ) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Детерминированный обход по кругу.
#[derive(Debug, Default)]
pub struct RoundRobinPicker {
    next: AtomicUsize,
}

impl RoundRobinPicker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ListenerPicker for RoundRobinPicker {
    fn pick(
        &self,
        len: usize,
    ) -> usize {
        self.next.fetch_add(1, Ordering::Relaxed) % len
    }
}

/// Всегда первый зарегистрированный слушатель.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstPicker;

impl ListenerPicker for FirstPicker {
    fn pick(
        &self,
        _len: usize,
    ) -> usize {
        0
    }
}
