//! Connection settings of a migration source data source.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// SQLite source: one main database file plus optional attachments, each
/// attachment surfacing as its own schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDataSourceConfig {
    /// Path of the main database file (schema `main`).
    pub path: String,

    /// Schema name to database file path.
    #[serde(default)]
    pub attached: BTreeMap<String, String>,
}

impl SourceDataSourceConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            attached: BTreeMap::new(),
        }
    }

    pub fn attach(mut self, schema: impl Into<String>, path: impl Into<String>) -> Self {
        self.attached.insert(schema.into(), path.into());
        self
    }
}

impl fmt::Display for SourceDataSourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sqlite:{}", self.path)?;
        if !self.attached.is_empty() {
            write!(f, " (+{} attached)", self.attached.len())?;
        }
        Ok(())
    }
}
