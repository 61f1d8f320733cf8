//! Shadow rule configuration aggregate.
//!
//! Fields are private: the updater mutates the aggregate only through the
//! explicit methods below, so table associations and algorithm references
//! cannot drift apart behind its back.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::RuleError;

/// Root aggregate of the shadow rule of one logical database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ShadowRuleConfigurationDef")]
pub struct ShadowRuleConfiguration {
    data_sources: Vec<ShadowDataSourceConfiguration>,
    tables: BTreeMap<String, ShadowTableConfiguration>,
    shadow_algorithms: BTreeMap<String, AlgorithmConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_shadow_algorithm_name: Option<String>,
}

/// A named shadow routing group: production source plus its shadow twin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadowDataSourceConfiguration {
    pub name: String,
    pub production_data_source_name: String,
    pub shadow_data_source_name: String,
}

/// Per-table shadow routing: which groups apply and which algorithms decide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadowTableConfiguration {
    #[serde(default)]
    data_source_names: Vec<String>,
    #[serde(default)]
    shadow_algorithm_names: Vec<String>,
}

/// A named algorithm type plus its property bag.
///
/// Property values keep their scalar type (`value = 1`, `enabled = true`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmConfiguration {
    #[serde(rename = "type")]
    pub algorithm_type: String,
    #[serde(default)]
    pub props: BTreeMap<String, serde_json::Value>,
}

impl ShadowDataSourceConfiguration {
    pub fn new(
        name: impl Into<String>,
        production_data_source_name: impl Into<String>,
        shadow_data_source_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            production_data_source_name: production_data_source_name.into(),
            shadow_data_source_name: shadow_data_source_name.into(),
        }
    }
}

impl ShadowTableConfiguration {
    pub fn new(data_source_names: Vec<String>, shadow_algorithm_names: Vec<String>) -> Self {
        Self {
            data_source_names,
            shadow_algorithm_names,
        }
    }

    pub fn data_source_names(&self) -> &[String] {
        &self.data_source_names
    }

    pub fn shadow_algorithm_names(&self) -> &[String] {
        &self.shadow_algorithm_names
    }
}

impl AlgorithmConfiguration {
    pub fn new(algorithm_type: impl Into<String>, props: BTreeMap<String, serde_json::Value>) -> Self {
        Self {
            algorithm_type: algorithm_type.into(),
            props,
        }
    }
}

impl ShadowRuleConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data_sources(&self) -> &[ShadowDataSourceConfiguration] {
        &self.data_sources
    }

    pub fn contains_data_source(&self, name: &str) -> bool {
        self.data_sources.iter().any(|each| each.name == name)
    }

    pub fn tables(&self) -> &BTreeMap<String, ShadowTableConfiguration> {
        &self.tables
    }

    pub fn shadow_algorithms(&self) -> &BTreeMap<String, AlgorithmConfiguration> {
        &self.shadow_algorithms
    }

    pub fn default_shadow_algorithm_name(&self) -> Option<&str> {
        self.default_shadow_algorithm_name.as_deref()
    }

    /// True when no shadow data source remains.
    pub fn is_empty(&self) -> bool {
        self.data_sources.is_empty()
    }

    /// Add a shadow data source; names are unique.
    pub fn add_data_source(
        &mut self,
        data_source: ShadowDataSourceConfiguration,
    ) -> Result<(), RuleError> {
        if self.contains_data_source(&data_source.name) {
            return Err(RuleError::InvalidConfiguration(format!(
                "duplicate shadow data source `{}`",
                data_source.name
            )));
        }
        self.data_sources.push(data_source);
        Ok(())
    }

    /// Insert or replace a table configuration, returning the previous one.
    pub fn put_table(
        &mut self,
        table_name: impl Into<String>,
        table: ShadowTableConfiguration,
    ) -> Option<ShadowTableConfiguration> {
        self.tables.insert(table_name.into(), table)
    }

    /// Insert or replace an algorithm, returning the previous one.
    pub fn put_algorithm(
        &mut self,
        algorithm_name: impl Into<String>,
        algorithm: AlgorithmConfiguration,
    ) -> Option<AlgorithmConfiguration> {
        self.shadow_algorithms.insert(algorithm_name.into(), algorithm)
    }

    pub fn set_default_shadow_algorithm_name(&mut self, name: Option<String>) {
        self.default_shadow_algorithm_name = name;
    }

    /// Remove the data source named `name`. Returns whether it existed.
    pub fn remove_data_source(&mut self, name: &str) -> bool {
        let before = self.data_sources.len();
        self.data_sources.retain(|each| each.name != name);
        self.data_sources.len() != before
    }

    /// Detach data source `name` from `table_name`.
    ///
    /// A table left with no data source is removed. Returns whether the
    /// association existed.
    pub fn remove_table_association(&mut self, table_name: &str, name: &str) -> bool {
        let Some(table) = self.tables.get_mut(table_name) else {
            return false;
        };
        let before = table.data_source_names.len();
        table.data_source_names.retain(|each| each != name);
        let removed = table.data_source_names.len() != before;
        if removed && table.data_source_names.is_empty() {
            self.tables.remove(table_name);
        }
        removed
    }

    pub fn remove_algorithm(&mut self, name: &str) -> Option<AlgorithmConfiguration> {
        self.shadow_algorithms.remove(name)
    }

    /// Check name uniqueness and that every referenced algorithm exists.
    pub fn validate(&self) -> Result<(), RuleError> {
        let mut seen = BTreeSet::new();
        for each in &self.data_sources {
            if !seen.insert(each.name.as_str()) {
                return Err(RuleError::InvalidConfiguration(format!(
                    "duplicate shadow data source `{}`",
                    each.name
                )));
            }
        }
        for (table_name, table) in &self.tables {
            for algorithm in &table.shadow_algorithm_names {
                if !self.shadow_algorithms.contains_key(algorithm) {
                    return Err(RuleError::InvalidConfiguration(format!(
                        "table `{table_name}` references unknown shadow algorithm `{algorithm}`"
                    )));
                }
            }
        }
        if let Some(default) = &self.default_shadow_algorithm_name {
            if !self.shadow_algorithms.contains_key(default) {
                return Err(RuleError::InvalidConfiguration(format!(
                    "default shadow algorithm `{default}` is not defined"
                )));
            }
        }
        Ok(())
    }
}

/// Wire shape; converted through [`ShadowRuleConfiguration::validate`].
#[derive(Deserialize)]
struct ShadowRuleConfigurationDef {
    #[serde(default)]
    data_sources: Vec<ShadowDataSourceConfiguration>,
    #[serde(default)]
    tables: BTreeMap<String, ShadowTableConfiguration>,
    #[serde(default)]
    shadow_algorithms: BTreeMap<String, AlgorithmConfiguration>,
    #[serde(default)]
    default_shadow_algorithm_name: Option<String>,
}

impl TryFrom<ShadowRuleConfigurationDef> for ShadowRuleConfiguration {
    type Error = RuleError;

    fn try_from(def: ShadowRuleConfigurationDef) -> Result<Self, Self::Error> {
        let config = Self {
            data_sources: def.data_sources,
            tables: def.tables,
            shadow_algorithms: def.shadow_algorithms,
            default_shadow_algorithm_name: def.default_shadow_algorithm_name,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn algorithm() -> AlgorithmConfiguration {
        AlgorithmConfiguration::new("SQL_HINT", BTreeMap::new())
    }

    #[test]
    fn test_duplicate_data_source_rejected() {
        let mut config = ShadowRuleConfiguration::new();
        config
            .add_data_source(ShadowDataSourceConfiguration::new("group", "ds", "ds_shadow"))
            .unwrap();
        let err = config
            .add_data_source(ShadowDataSourceConfiguration::new("group", "ds_1", "ds_1_shadow"))
            .unwrap_err();
        assert!(matches!(err, RuleError::InvalidConfiguration(_)));
        assert_eq!(config.data_sources().len(), 1);
    }

    #[test]
    fn test_remove_table_association_drops_empty_table() {
        let mut config = ShadowRuleConfiguration::new();
        config.put_table(
            "t_order",
            ShadowTableConfiguration::new(vec!["a".into(), "b".into()], Vec::new()),
        );

        assert!(config.remove_table_association("t_order", "a"));
        assert_eq!(config.tables()["t_order"].data_source_names(), ["b".to_string()]);

        assert!(!config.remove_table_association("t_order", "a"));
        assert!(config.remove_table_association("t_order", "b"));
        assert!(config.tables().is_empty());
        assert!(!config.remove_table_association("t_order", "b"));
    }

    #[test]
    fn test_remove_table_association_keeps_unrelated_empty_table() {
        let mut config = ShadowRuleConfiguration::new();
        config.put_table("t_pending", ShadowTableConfiguration::new(Vec::new(), Vec::new()));

        assert!(!config.remove_table_association("t_pending", "a"));
        assert!(config.tables().contains_key("t_pending"));
    }

    #[test]
    fn test_remove_data_source_reports_presence() {
        let mut config = ShadowRuleConfiguration::new();
        config
            .add_data_source(ShadowDataSourceConfiguration::new("group", "ds", "ds_shadow"))
            .unwrap();
        assert!(!config.remove_data_source("other"));
        assert!(config.remove_data_source("group"));
        assert!(config.is_empty());
    }

    #[test]
    fn test_validate_rejects_dangling_table_algorithm() {
        let mut config = ShadowRuleConfiguration::new();
        config.put_table(
            "t_order",
            ShadowTableConfiguration::new(vec!["group".into()], vec!["missing".into()]),
        );
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("`missing`"));

        config.put_algorithm("missing", algorithm());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_dangling_default() {
        let mut config = ShadowRuleConfiguration::new();
        config.set_default_shadow_algorithm_name(Some("default_algorithm".into()));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"{
            "data_sources": [
                {"name": "group", "production_data_source_name": "ds", "shadow_data_source_name": "ds_shadow"}
            ],
            "tables": {"t_order": {"data_source_names": ["group"], "shadow_algorithm_names": ["user_id_match"]}},
            "shadow_algorithms": {"user_id_match": {"type": "VALUE_MATCH", "props": {"column": "user_id", "value": 1, "enabled": true}}},
            "default_shadow_algorithm_name": "user_id_match"
        }"#;
        let config: ShadowRuleConfiguration = serde_json::from_str(json).unwrap();
        assert!(config.contains_data_source("group"));
        assert_eq!(config.default_shadow_algorithm_name(), Some("user_id_match"));
        assert_eq!(
            config.shadow_algorithms()["user_id_match"].props["column"],
            "user_id"
        );
        assert_eq!(config.shadow_algorithms()["user_id_match"].props["value"], 1);
        assert_eq!(config.shadow_algorithms()["user_id_match"].props["enabled"], true);

        let duplicated = r#"{
            "data_sources": [
                {"name": "group", "production_data_source_name": "ds", "shadow_data_source_name": "ds_shadow"},
                {"name": "group", "production_data_source_name": "ds", "shadow_data_source_name": "ds_shadow"}
            ]
        }"#;
        let err = serde_json::from_str::<ShadowRuleConfiguration>(duplicated).unwrap_err();
        assert!(err.to_string().contains("duplicate shadow data source"));
    }

    #[test]
    fn test_serialize_round_trip_keeps_default() {
        let mut config = ShadowRuleConfiguration::new();
        config.put_algorithm("hint", algorithm());
        config.set_default_shadow_algorithm_name(Some("hint".into()));
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["default_shadow_algorithm_name"], "hint");
        assert_eq!(value["shadow_algorithms"]["hint"]["type"], "SQL_HINT");
        let back: ShadowRuleConfiguration = serde_json::from_value(value).unwrap();
        assert_eq!(back, config);
    }
}
