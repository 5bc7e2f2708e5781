//! Property-based tests для канонизации имён ресурсов.

use mock_pubsub::pubsub::{make_subscription_name, make_topic_name};
use proptest::prelude::*;

const PROPTEST_CASES: u32 = 500;

fn short_name() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9._~+%-]{0,40}"
}

fn project_id() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,20}"
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: PROPTEST_CASES,
        .. ProptestConfig::default()
    })]

    /// Короткое имя всегда получает префикс проекта и коллекции.
    #[test]
    fn prop_short_name_is_prefixed(project in project_id(), name in short_name()) {
        prop_assume!(!name.starts_with("projects/"));
        let topic = make_topic_name(&project, &name).unwrap();
        prop_assert_eq!(topic, format!("projects/{project}/topics/{name}"));
        let sub = make_subscription_name(&project, &name).unwrap();
        prop_assert_eq!(sub, format!("projects/{project}/subscriptions/{name}"));
    }

    /// Повторная канонизация ничего не меняет.
    #[test]
    fn prop_canonicalization_is_idempotent(
        project in project_id(),
        other in project_id(),
        name in short_name(),
    ) {
        let once = make_topic_name(&project, &name).unwrap();
        let twice = make_topic_name(&other, &once).unwrap();
        prop_assert_eq!(&once, &twice);

        let once = make_subscription_name(&project, &name).unwrap();
        let twice = make_subscription_name(&other, &once).unwrap();
        prop_assert_eq!(&once, &twice);
    }

    /// Полное имя одной коллекции не принимается другой.
    #[test]
    fn prop_wrong_collection_is_rejected(project in project_id(), name in short_name()) {
        let topic = make_topic_name(&project, &name).unwrap();
        prop_assume!(!topic.contains("/subscriptions/"));
        let err = make_subscription_name(&project, &topic).unwrap_err();
        prop_assert_eq!(
            err.to_string(),
            format!("3 INVALID_ARGUMENT: Invalid [subscriptions] name: (name={topic})")
        );
    }
}
