//! Preconditions for dropping shadow rules.

use std::collections::BTreeSet;

use super::config::ShadowRuleConfiguration;
use super::statement::DropShadowRuleStatement;
use crate::error::RuleError;

/// Validate a DROP against the current configuration without touching it.
///
/// A missing configuration always fails. Missing rule names fail unless
/// the statement carries if-exists tolerance.
pub fn check(
    database: &str,
    current: Option<&ShadowRuleConfiguration>,
    statement: &DropShadowRuleStatement,
) -> Result<(), RuleError> {
    let Some(config) = current else {
        return Err(RuleError::missing_shadow_rule(database, Vec::new()));
    };
    if statement.if_exists {
        return Ok(());
    }
    let missing = missing_names(config, &statement.names);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(RuleError::missing_shadow_rule(database, missing))
    }
}

/// Requested names with no matching data source, in request order, deduplicated.
fn missing_names(config: &ShadowRuleConfiguration, names: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    names
        .iter()
        .filter(|name| !config.contains_data_source(name))
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect()
}
