//! Shadow rule administration.
//!
//! Holds the shadow routing rule of a logical database and applies
//! `DROP SHADOW RULE` to it: existence check first, then removal of the
//! named shadow data sources, their table associations, and any shadow
//! algorithm left unreferenced. Also reads migration source metadata.

pub mod config;
pub mod error;
pub mod migration;
pub mod operation;
pub mod rule;
pub mod server;
pub mod store;

pub use error::{MigrationError, RuleError};
pub use rule::{DropShadowRuleStatement, DropShadowRuleUpdater, ShadowRuleConfiguration};
pub use store::{DropOutcome, RuleStore};
