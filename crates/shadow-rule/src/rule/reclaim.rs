//! Detection of shadow algorithms no longer referenced.

use std::collections::{BTreeMap, BTreeSet};

use super::config::{ShadowRuleConfiguration, ShadowTableConfiguration};

/// Algorithm names referenced by any table or by the default pointer.
pub fn in_use_algorithms<'a>(
    tables: &'a BTreeMap<String, ShadowTableConfiguration>,
    default_algorithm: Option<&'a str>,
) -> BTreeSet<&'a str> {
    tables
        .values()
        .flat_map(|table| table.shadow_algorithm_names().iter().map(String::as_str))
        .chain(default_algorithm)
        .collect()
}

/// Defined algorithms that nothing references any more.
pub fn unused_algorithms(config: &ShadowRuleConfiguration) -> Vec<String> {
    let in_use = in_use_algorithms(config.tables(), config.default_shadow_algorithm_name());
    config
        .shadow_algorithms()
        .keys()
        .filter(|name| !in_use.contains(name.as_str()))
        .cloned()
        .collect()
}
