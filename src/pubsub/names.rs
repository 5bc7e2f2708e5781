use crate::error::{PubSubError, PubSubResult};

const ROOT_PREFIX: &str = "projects/";

/// Коллекция ресурсов внутри проекта.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Topics,
    Subscriptions,
}

impl ResourceKind {
    /// Сегмент пути коллекции (`"topics"` или `"subscriptions"`).
    pub const fn collection(&self) -> &'static str {
        match self {
            Self::Topics => "topics",
            Self::Subscriptions => "subscriptions",
        }
    }
}

/// Каноническое полное имя топика.
pub fn make_topic_name(
    project_id: &str,
    topic_name: &str,
) -> PubSubResult<String> {
    make_name(ResourceKind::Topics, project_id, topic_name)
}

/// Каноническое полное имя подписки.
pub fn make_subscription_name(
    project_id: &str,
    subscription_name: &str,
) -> PubSubResult<String> {
    make_name(ResourceKind::Subscriptions, project_id, subscription_name)
}

/// Строит полное имя `projects/<project>/<collection>/<name>`.
///
/// Если `name` уже начинается с `projects/`, оно обязано быть корректным
/// полным именем и возвращается как есть; иначе ошибка `InvalidArgument`.
pub fn make_name(
    kind: ResourceKind,
    project_id: &str,
    name: &str,
) -> PubSubResult<String> {
    if name.starts_with(ROOT_PREFIX) {
        if is_fully_qualified(kind, name) {
            return Ok(name.to_string());
        }
        return Err(PubSubError::InvalidName {
            collection: kind.collection(),
            name: name.to_string(),
        });
    }
    Ok(format!(
        "{ROOT_PREFIX}{project_id}/{}/{name}",
        kind.collection()
    ))
}

/// Символы, с которыми `.` в шаблоне имени не совпадает.
const LINE_TERMINATORS: [char; 4] = ['\n', '\r', '\u{2028}', '\u{2029}'];

/// Проверяет `name` на соответствие `^projects/.+/<collection>/.+$`.
/// Перевод строки в любом месте делает имя некорректным.
pub fn is_fully_qualified(
    kind: ResourceKind,
    name: &str,
) -> bool {
    if name.contains(LINE_TERMINATORS) {
        return false;
    }
    let Some(rest) = name.strip_prefix(ROOT_PREFIX) else {
        return false;
    };
    let marker = format!("/{}/", kind.collection());
    rest.match_indices(&marker)
        .any(|(idx, _)| idx > 0 && idx + marker.len() < rest.len())
}

/// Префикс всех ресурсов проекта, используется при листинге.
pub fn project_prefix(project_id: &str) -> String {
    format!("{ROOT_PREFIX}{project_id}/")
}
