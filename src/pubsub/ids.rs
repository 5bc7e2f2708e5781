use std::sync::atomic::{AtomicU64, Ordering};

/// Общий на весь процесс счётчик для id сообщений и суффиксов ack-id.
static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Возвращает следующий номер последовательности (начиная с 1).
#[inline]
pub fn next_sequence() -> u64 {
    SEQUENCE.fetch_add(1, Ordering::Relaxed) + 1
}

/// То же, что [`next_sequence`], в виде строки.
pub fn next_sequence_string() -> String {
    next_sequence().to_string()
}
