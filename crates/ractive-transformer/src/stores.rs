//! Shared-state store modules.

use crate::rules::RuleSet;

/// A generated store module for one shared-state key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreModule {
    /// The shared-state key.
    pub key: String,
    /// Module path relative to the output root, with extension.
    pub path: String,
    /// Module text.
    pub source: String,
}

/// Builds the writable store module for `key`.
pub fn store_module(key: &str, rules: &RuleSet) -> StoreModule {
    StoreModule {
        key: key.to_string(),
        path: format!("{}.js", rules.store_module(key)),
        source: store_module_source(key, rules),
    }
}

/// The text of the store module for `key`.
pub fn store_module_source(key: &str, rules: &RuleSet) -> String {
    format!(
        "import {{ writable }} from 'svelte/store'\nexport default writable({})\n",
        rules.store_initial_value(key)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_key_uses_its_default() {
        let rules = RuleSet::builtin().unwrap();
        let module = store_module("loading", &rules);
        assert_eq!(module.path, "stores/loading.js");
        insta::assert_snapshot!(
            module.source.lines().last().unwrap_or_default(),
            @"export default writable(false)"
        );
    }

    #[test]
    fn unknown_key_uses_fallback() {
        let rules = RuleSet::builtin().unwrap();
        assert_eq!(
            store_module_source("user", &rules),
            "import { writable } from 'svelte/store'\nexport default writable(null)\n"
        );
    }
}
