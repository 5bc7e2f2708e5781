use std::{any::Any, error::Error};

use crate::StatusCode;

/// Расширение для ошибок библиотеки (object-safe).
///
/// Даёт единый доступ к числовому коду и тегам для логирования.
pub trait ErrorExt: Error + Send + Sync + 'static {
    /// Статус-код ошибки. По умолчанию [`StatusCode::Ok`] не бывает,
    /// поэтому метод обязателен.
    fn status_code(&self) -> StatusCode;

    /// Возвращает ошибку как [`Any`](std::any::Any) для downcast.
    fn as_any(&self) -> &dyn Any;

    /// Числовой код, на который должен опираться вызывающий код.
    fn code(&self) -> u32 {
        self.status_code().code()
    }

    /// Сообщение для клиента. У эмулятора нет скрытых деталей,
    /// поэтому это просто `Display`.
    fn client_message(&self) -> String {
        self.to_string()
    }

    /// Набор тегов для структурированного логирования.
    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        vec![
            ("error_type", self.type_name()),
            ("status_code", self.status_code().to_string()),
        ]
    }

    /// Имя типа ошибки.
    fn type_name(&self) -> String {
        std::any::type_name::<Self>()
            .split("::")
            .last()
            .unwrap_or("Unknown")
            .to_string()
    }
}
