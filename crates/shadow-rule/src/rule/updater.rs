//! Applies DROP SHADOW RULE to a live configuration.

use super::checker;
use super::config::ShadowRuleConfiguration;
use super::reclaim;
use super::statement::DropShadowRuleStatement;
use crate::error::RuleError;

/// Updater for `DROP SHADOW RULE`.
///
/// Callers run [`check`](Self::check) before [`update`](Self::update); a
/// failed check leaves the configuration untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct DropShadowRuleUpdater;

impl DropShadowRuleUpdater {
    pub fn new() -> Self {
        Self
    }

    pub fn check(
        &self,
        database: &str,
        current: Option<&ShadowRuleConfiguration>,
        statement: &DropShadowRuleStatement,
    ) -> Result<(), RuleError> {
        checker::check(database, current, statement)
    }

    /// Whether the statement names at least one existing data source.
    pub fn has_any_to_drop(
        &self,
        statement: &DropShadowRuleStatement,
        current: Option<&ShadowRuleConfiguration>,
    ) -> bool {
        current.is_some_and(|config| {
            statement
                .names
                .iter()
                .any(|name| config.contains_data_source(name))
        })
    }

    /// Remove the named data sources, their table associations, and any
    /// algorithm left unreferenced.
    ///
    /// Returns true iff at least one data source was removed. Unknown names
    /// are ignored.
    pub fn update(&self, names: &[String], config: &mut ShadowRuleConfiguration) -> bool {
        let mut dropped = Vec::new();
        for name in names {
            if config.remove_data_source(name) {
                dropped.push(name.as_str());
            }
        }
        if dropped.is_empty() {
            return false;
        }

        let table_names: Vec<String> = config.tables().keys().cloned().collect();
        for table_name in &table_names {
            for name in &dropped {
                config.remove_table_association(table_name, name);
            }
        }

        for algorithm in reclaim::unused_algorithms(config) {
            config.remove_algorithm(&algorithm);
            tracing::debug!(algorithm = %algorithm, "Removed unused shadow algorithm");
        }

        tracing::debug!(dropped = ?dropped, "Dropped shadow data sources");
        true
    }
}
