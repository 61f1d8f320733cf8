//! Live rule configuration of one logical database.
//!
//! The configuration sits in a `watch` channel: every DROP runs its check
//! and its update inside one `send_if_modified` call, so the channel's
//! write lock serializes mutations and subscribers only wake on change.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::error::RuleError;
use crate::rule::{DropShadowRuleStatement, DropShadowRuleUpdater, ShadowRuleConfiguration};

/// Result of a DROP applied through the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DropOutcome {
    /// At least one shadow data source was removed.
    pub changed: bool,
    /// The last data source went, so the whole rule configuration was removed.
    pub rule_dropped: bool,
}

/// Shared holder of the current shadow rule configuration. Cheap to clone.
#[derive(Clone)]
pub struct RuleStore {
    database_name: String,
    sender: Arc<watch::Sender<Option<ShadowRuleConfiguration>>>,
    updater: DropShadowRuleUpdater,
}

impl RuleStore {
    pub fn new(database_name: impl Into<String>, initial: Option<ShadowRuleConfiguration>) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            database_name: database_name.into(),
            sender: Arc::new(sender),
            updater: DropShadowRuleUpdater::new(),
        }
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    /// Copy of the current configuration.
    pub fn snapshot(&self) -> Option<ShadowRuleConfiguration> {
        self.sender.borrow().clone()
    }

    /// Receiver notified after every configuration change.
    pub fn subscribe(&self) -> watch::Receiver<Option<ShadowRuleConfiguration>> {
        self.sender.subscribe()
    }

    /// Check and apply a DROP SHADOW RULE statement atomically.
    pub fn drop_rules(&self, statement: &DropShadowRuleStatement) -> Result<DropOutcome, RuleError> {
        let span = shadow_tracing::rule_update_span!(&self.database_name, statement);
        let _entered = span.enter();

        let mut result = Ok(DropOutcome::default());
        self.sender.send_if_modified(|current| {
            result = self.apply_drop(current, statement);
            matches!(result, Ok(DropOutcome { changed: true, .. }))
        });

        match &result {
            Ok(outcome) => {
                span.record("changed", outcome.changed);
                span.record("rule_dropped", outcome.rule_dropped);
                if outcome.changed {
                    tracing::info!(
                        rule_dropped = outcome.rule_dropped,
                        "Shadow rule configuration updated"
                    );
                } else {
                    tracing::info!("Nothing to drop, shadow rule configuration unchanged");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Drop shadow rule rejected");
            }
        }
        result
    }

    fn apply_drop(
        &self,
        current: &mut Option<ShadowRuleConfiguration>,
        statement: &DropShadowRuleStatement,
    ) -> Result<DropOutcome, RuleError> {
        self.updater
            .check(&self.database_name, current.as_ref(), statement)?;
        if !self.updater.has_any_to_drop(statement, current.as_ref()) {
            return Ok(DropOutcome::default());
        }
        let Some(config) = current.as_mut() else {
            return Ok(DropOutcome::default());
        };

        let changed = self.updater.update(&statement.names, config);
        let rule_dropped = changed && config.is_empty();
        if rule_dropped {
            *current = None;
        }
        Ok(DropOutcome {
            changed,
            rule_dropped,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::rule::{AlgorithmConfiguration, ShadowDataSourceConfiguration, ShadowTableConfiguration};

    fn two_group_configuration() -> ShadowRuleConfiguration {
        let mut config = ShadowRuleConfiguration::new();
        for name in ["group_a", "group_b"] {
            config
                .add_data_source(ShadowDataSourceConfiguration::new(name, "ds", "ds_shadow"))
                .unwrap();
        }
        config.put_algorithm("hint", AlgorithmConfiguration::new("SQL_HINT", BTreeMap::new()));
        config.put_table(
            "t_order",
            ShadowTableConfiguration::new(
                vec!["group_a".into(), "group_b".into()],
                vec!["hint".into()],
            ),
        );
        config
    }

    #[test]
    fn test_drop_without_configuration_fails() {
        let store = RuleStore::new("db", None);
        let err = store
            .drop_rules(&DropShadowRuleStatement::new(["group_a"]).if_exists())
            .unwrap_err();
        assert!(matches!(err, RuleError::MissingRequiredRule { .. }));
    }

    #[test]
    fn test_rejected_drop_leaves_store_untouched() {
        let store = RuleStore::new("db", Some(two_group_configuration()));
        let receiver = store.subscribe();

        assert!(store
            .drop_rules(&DropShadowRuleStatement::new(["group_a", "absent"]))
            .is_err());
        assert_eq!(store.snapshot(), Some(two_group_configuration()));
        assert!(!receiver.has_changed().unwrap());
    }

    #[test]
    fn test_partial_drop_notifies_subscribers() {
        let store = RuleStore::new("db", Some(two_group_configuration()));
        let mut receiver = store.subscribe();

        let outcome = store
            .drop_rules(&DropShadowRuleStatement::new(["group_a"]))
            .unwrap();
        assert_eq!(
            outcome,
            DropOutcome {
                changed: true,
                rule_dropped: false
            }
        );
        assert!(receiver.has_changed().unwrap());
        let current = receiver.borrow_and_update().clone().unwrap();
        assert!(!current.contains_data_source("group_a"));
        assert!(current.shadow_algorithms().contains_key("hint"));
    }

    #[test]
    fn test_if_exists_noop_does_not_notify() {
        let store = RuleStore::new("db", Some(two_group_configuration()));
        let receiver = store.subscribe();

        let outcome = store
            .drop_rules(&DropShadowRuleStatement::new(["absent"]).if_exists())
            .unwrap();
        assert_eq!(outcome, DropOutcome::default());
        assert!(!receiver.has_changed().unwrap());
    }

    #[test]
    fn test_dropping_last_group_removes_rule() {
        let store = RuleStore::new("db", Some(two_group_configuration()));

        let outcome = store
            .drop_rules(&DropShadowRuleStatement::new(["group_a", "group_b"]))
            .unwrap();
        assert!(outcome.changed);
        assert!(outcome.rule_dropped);
        assert_eq!(store.snapshot(), None);

        let err = store
            .drop_rules(&DropShadowRuleStatement::new(["group_a"]).if_exists())
            .unwrap_err();
        assert_eq!(err, RuleError::missing_shadow_rule("db", Vec::new()));
    }

    #[tokio::test]
    async fn test_subscriber_wakes_on_change() {
        let store = RuleStore::new("db", Some(two_group_configuration()));
        let mut receiver = store.subscribe();

        let writer = store.clone();
        tokio::spawn(async move {
            writer
                .drop_rules(&DropShadowRuleStatement::new(["group_b"]))
                .unwrap();
        });

        receiver.changed().await.unwrap();
        let current = receiver.borrow().clone().unwrap();
        assert_eq!(current.data_sources().len(), 1);
        assert_eq!(current.data_sources()[0].name, "group_a");
    }
}
