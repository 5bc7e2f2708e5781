use std::fmt;

use num_enum::TryFromPrimitive;
#[cfg(feature = "strum")]
use strum_macros::{AsRefStr, EnumIter};

/// Числовые коды статуса, совпадающие с кодами gRPC, которые
/// возвращает настоящий сервис Pub/Sub.
///
/// Клиентский код должен сравнивать именно число, а не текст ошибки.
#[cfg_attr(feature = "strum", derive(AsRefStr, EnumIter))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u32)]
#[non_exhaustive]
pub enum StatusCode {
    Ok = 0,
    InvalidArgument = 3,
    NotFound = 5,
    AlreadyExists = 6,
}

impl StatusCode {
    /// Каноническое имя кода, как оно выводится в сообщениях
    /// (`"NOT_FOUND"`, `"ALREADY_EXISTS"` и т.д.).
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
        }
    }

    pub const fn code(&self) -> u32 {
        *self as u32
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
