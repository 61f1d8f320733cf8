//! Configuration types and loading logic.

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;
use shadow_tracing::TracingConfig;

use crate::rule::ShadowRuleConfiguration;

/// Top-level service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    /// Shadow rule the database starts with; absent means none configured.
    #[serde(default)]
    pub rule: Option<ShadowRuleConfiguration>,

    #[serde(default)]
    pub tracing: TracingConfig,
}

/// Admin server listen configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
}

/// Logical database the rule belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_name")]
    pub name: String,
}

fn default_listen_address() -> String {
    "127.0.0.1:3090".to_string()
}

fn default_database_name() -> String {
    "sharding_db".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: default_database_name(),
        }
    }
}

impl AdminConfig {
    /// Load configuration from TOML file and environment variables.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (SHADOW_RULE_ prefix, __ for nesting)
    /// 2. TOML config file
    /// 3. Defaults
    pub fn load(config_path: &str) -> anyhow::Result<Self> {
        let config: AdminConfig = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("SHADOW_RULE_").split("__"))
            .extract()?;

        Ok(config)
    }
}
