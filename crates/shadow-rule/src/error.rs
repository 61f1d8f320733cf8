//! Domain error types.

use thiserror::Error;

/// Rule type label used in user-facing diagnostics.
pub const SHADOW_RULE_TYPE: &str = "Shadow";

/// Errors raised while validating or mutating a rule configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// No rule configuration exists, or some named rules are absent.
    ///
    /// `names` is empty when the whole configuration is missing.
    #[error("There is no {rule_type} rule{} in database `{database}`.", format_names(.names))]
    MissingRequiredRule {
        rule_type: &'static str,
        database: String,
        names: Vec<String>,
    },

    /// A configuration violates name uniqueness or references an unknown algorithm.
    #[error("invalid shadow rule configuration: {0}")]
    InvalidConfiguration(String),
}

impl RuleError {
    /// Missing shadow rule(s) in `database`.
    pub fn missing_shadow_rule(database: impl Into<String>, names: Vec<String>) -> Self {
        Self::MissingRequiredRule {
            rule_type: SHADOW_RULE_TYPE,
            database: database.into(),
            names,
        }
    }
}

fn format_names(names: &[String]) -> String {
    if names.is_empty() {
        String::new()
    } else {
        format!(" `{}`", names.join(", "))
    }
}

/// Errors raised by the migration source collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MigrationError {
    /// Metadata could not be read from the actual source data source.
    #[error("Add migration source resource failed, reason is: {0}")]
    AddMigrationSourceResource(String),
}
