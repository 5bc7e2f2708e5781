pub mod ext;
pub mod status_code;
pub mod types;

// Публичный экспорт всех типов ошибок из вложенных модулей,
// чтобы упростить доступ к ним из внешнего кода.
pub use ext::*;
pub use status_code::*;
pub use types::*;

pub type PubSubResult<T> = Result<T, PubSubError>;
