//! Administrative DROP request for shadow rules.

use serde::{Deserialize, Serialize};

/// `DROP SHADOW RULE [IF EXISTS] name [, name ...]`, already parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropShadowRuleStatement {
    #[serde(default)]
    pub if_exists: bool,
    pub names: Vec<String>,
}

impl DropShadowRuleStatement {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            if_exists: false,
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Same statement with if-exists tolerance.
    pub fn if_exists(mut self) -> Self {
        self.if_exists = true;
        self
    }
}
