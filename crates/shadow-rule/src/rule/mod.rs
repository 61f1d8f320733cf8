//! Shadow rule configuration and the DROP SHADOW RULE updater.

pub mod checker;
pub mod config;
pub mod reclaim;
pub mod statement;
pub mod updater;

pub use config::{
    AlgorithmConfiguration, ShadowDataSourceConfiguration, ShadowRuleConfiguration,
    ShadowTableConfiguration,
};
pub use statement::DropShadowRuleStatement;
pub use updater::DropShadowRuleUpdater;
