//! Rule tables driving the name, tag and helper rewrites.
//!
//! Tables are versioned JSON documents. They are loaded and compiled once
//! into a [`RuleSet`], which is immutable and shared read-only by every unit.
//! The built-in table ships with the crate as `rules/default.json`.

use indexmap::IndexMap;
use regex::Regex;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use smol_str::SmolStr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The rule-file format version this crate understands.
pub const RULES_VERSION: u32 = 1;

const BUILTIN_RULES: &str = include_str!("../rules/default.json");

/// Errors raised while loading a rule table.
#[derive(Debug, Error)]
pub enum RuleError {
    /// The rule file could not be read.
    #[error("failed to read rules from {path}: {source}")]
    Io {
        /// The rule file.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The rule file is not valid JSON for the rule schema.
    #[error("invalid rule file: {0}")]
    Json(#[from] serde_json::Error),

    /// The rule file declares a version this crate cannot read.
    #[error("unsupported rule file version {found} (expected {expected})")]
    UnsupportedVersion {
        /// The declared version.
        found: u32,
        /// The version this crate reads.
        expected: u32,
    },

    /// A table entry is not a usable identifier or tag name.
    #[error("invalid name `{name}` in `{table}`")]
    InvalidName {
        /// The table holding the entry.
        table: &'static str,
        /// The offending name.
        name: String,
    },

    /// A pattern compiled from the tables was rejected.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RuleFile {
    version: u32,
    #[serde(default = "default_indent")]
    indent: String,
    #[serde(default)]
    elide_self_bindings: bool,
    #[serde(default)]
    services: IndexMap<String, ServiceEntry>,
    #[serde(default)]
    single_call_services: IndexMap<String, String>,
    #[serde(default)]
    prop_renames: Vec<PropRenameEntry>,
    #[serde(default)]
    components: IndexMap<String, String>,
    #[serde(default)]
    decorators: IndexMap<String, String>,
    #[serde(default)]
    stores: StoreEntry,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServiceEntry {
    module: String,
    helpers: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PropRenameEntry {
    attribute: String,
    renamed: String,
    components: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct StoreEntry {
    #[serde(default = "default_store_dir")]
    module_dir: String,
    #[serde(default)]
    defaults: IndexMap<String, String>,
    #[serde(default = "default_store_fallback")]
    fallback: String,
}

impl Default for StoreEntry {
    fn default() -> Self {
        Self {
            module_dir: default_store_dir(),
            defaults: IndexMap::new(),
            fallback: default_store_fallback(),
        }
    }
}

fn default_indent() -> String {
    "\t".to_string()
}

fn default_store_dir() -> String {
    "stores".to_string()
}

fn default_store_fallback() -> String {
    "null".to_string()
}

/// A helper function that becomes a call on a namespaced service.
#[derive(Debug, Clone)]
pub struct HelperRule {
    /// The service binding, e.g. `dateService`.
    pub service: SmolStr,
    /// The module the service is imported from.
    pub module: SmolStr,
}

/// A prop that must be renamed on components that expose it under another
/// name, together with the declaration rename.
#[derive(Debug, Clone)]
pub struct PropRename {
    /// The attribute as written in templates, e.g. `class`.
    pub attribute: SmolStr,
    /// The name the components export, e.g. `className`.
    pub renamed: SmolStr,
    usage: Regex,
    declaration: Regex,
}

impl PropRename {
    /// Matches `<Component ... attribute=` on a listed component.
    /// Group 1 is the component, group 2 everything up to the attribute.
    pub fn usage_pattern(&self) -> &Regex {
        &self.usage
    }

    /// Matches `let attribute =` declarations.
    pub fn declaration_pattern(&self) -> &Regex {
        &self.declaration
    }
}

/// Compiled, immutable rule tables.
#[derive(Debug, Clone)]
pub struct RuleSet {
    indent: String,
    elide_self_bindings: bool,
    helpers: FxHashMap<SmolStr, HelperRule>,
    helper_pattern: Option<Regex>,
    single_calls: FxHashMap<SmolStr, SmolStr>,
    single_call_pattern: Option<Regex>,
    prop_renames: Vec<PropRename>,
    components: FxHashMap<SmolStr, SmolStr>,
    decorators: FxHashMap<SmolStr, SmolStr>,
    decorator_pattern: Option<Regex>,
    store_dir: SmolStr,
    store_defaults: FxHashMap<SmolStr, SmolStr>,
    store_fallback: SmolStr,
}

impl RuleSet {
    /// Loads the rule tables that ship with the crate.
    pub fn builtin() -> Result<Self, RuleError> {
        Self::from_json(BUILTIN_RULES)
    }

    /// Loads rule tables from a JSON file.
    pub fn load(path: &Path) -> Result<Self, RuleError> {
        let content = std::fs::read_to_string(path).map_err(|source| RuleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parses and compiles rule tables from JSON text.
    pub fn from_json(json: &str) -> Result<Self, RuleError> {
        let file: RuleFile = serde_json::from_str(json)?;
        Self::compile(file)
    }

    fn compile(file: RuleFile) -> Result<Self, RuleError> {
        if file.version != RULES_VERSION {
            return Err(RuleError::UnsupportedVersion {
                found: file.version,
                expected: RULES_VERSION,
            });
        }

        let mut helpers = FxHashMap::default();
        for (service, entry) in &file.services {
            check_identifier("services", service)?;
            for helper in &entry.helpers {
                check_identifier("services.helpers", helper)?;
                helpers.insert(
                    SmolStr::new(helper),
                    HelperRule {
                        service: SmolStr::new(service),
                        module: SmolStr::new(&entry.module),
                    },
                );
            }
        }

        let mut single_calls = FxHashMap::default();
        for (name, module) in &file.single_call_services {
            check_identifier("singleCallServices", name)?;
            single_calls.insert(SmolStr::new(name), SmolStr::new(module));
        }

        let prop_renames = file
            .prop_renames
            .iter()
            .map(compile_prop_rename)
            .collect::<Result<Vec<_>, _>>()?;

        let mut components = FxHashMap::default();
        for (tag, path) in &file.components {
            if !is_tag_name(tag) {
                return Err(RuleError::InvalidName {
                    table: "components",
                    name: tag.clone(),
                });
            }
            components.insert(SmolStr::new(tag), SmolStr::new(path));
        }

        let mut decorators = FxHashMap::default();
        for (name, module) in &file.decorators {
            check_identifier("decorators", name)?;
            decorators.insert(SmolStr::new(name), SmolStr::new(module));
        }

        let helper_pattern = call_pattern(helpers.keys())?;
        let single_call_pattern = call_pattern(single_calls.keys())?;
        let decorator_pattern = match alternation(decorators.keys()) {
            Some(names) => Some(Regex::new(&format!(r#"\bas-({})="([^"]*)""#, names))?),
            None => None,
        };

        Ok(Self {
            indent: file.indent,
            elide_self_bindings: file.elide_self_bindings,
            helpers,
            helper_pattern,
            single_calls,
            single_call_pattern,
            prop_renames,
            components,
            decorators,
            decorator_pattern,
            store_dir: SmolStr::new(file.stores.module_dir.trim_end_matches('/')),
            store_defaults: file
                .stores
                .defaults
                .iter()
                .map(|(k, v)| (SmolStr::new(k), SmolStr::new(v)))
                .collect(),
            store_fallback: SmolStr::new(file.stores.fallback),
        })
    }

    /// The indent unit used in emitted script code.
    pub fn indent(&self) -> &str {
        &self.indent
    }

    /// Whether `const x = x` style self-bindings are removed.
    pub fn elide_self_bindings(&self) -> bool {
        self.elide_self_bindings
    }

    /// Looks up a template helper function.
    pub fn helper(&self, name: &str) -> Option<&HelperRule> {
        self.helpers.get(name)
    }

    /// Matches `helper(` for any known helper; group 1 is the helper name.
    pub fn helper_pattern(&self) -> Option<&Regex> {
        self.helper_pattern.as_ref()
    }

    /// Looks up the module of a single-call service.
    pub fn single_call_module(&self, name: &str) -> Option<&str> {
        self.single_calls.get(name).map(SmolStr::as_str)
    }

    /// Matches `service(` for any single-call service; group 1 is the name.
    pub fn single_call_pattern(&self) -> Option<&Regex> {
        self.single_call_pattern.as_ref()
    }

    /// Prop renames, in table order.
    pub fn prop_renames(&self) -> &[PropRename] {
        &self.prop_renames
    }

    /// Looks up the module path of an implicitly available component tag.
    pub fn component_path(&self, tag: &str) -> Option<&str> {
        self.components.get(tag).map(SmolStr::as_str)
    }

    /// Looks up the module of a decorator.
    pub fn decorator_module(&self, name: &str) -> Option<&str> {
        self.decorators.get(name).map(SmolStr::as_str)
    }

    /// Matches `as-name="value"` for any known decorator.
    pub fn decorator_pattern(&self) -> Option<&Regex> {
        self.decorator_pattern.as_ref()
    }

    /// The module path a shared-state key's store is imported from.
    pub fn store_module(&self, key: &str) -> String {
        if self.store_dir.is_empty() {
            key.to_string()
        } else {
            format!("{}/{}", self.store_dir, key)
        }
    }

    /// The initial value of a shared-state key's store.
    pub fn store_initial_value(&self, key: &str) -> &str {
        self.store_defaults
            .get(key)
            .unwrap_or(&self.store_fallback)
            .as_str()
    }
}

fn compile_prop_rename(entry: &PropRenameEntry) -> Result<PropRename, RuleError> {
    check_identifier("propRenames.renamed", &entry.renamed)?;
    if !is_tag_name(&entry.attribute) {
        return Err(RuleError::InvalidName {
            table: "propRenames.attribute",
            name: entry.attribute.clone(),
        });
    }
    for component in &entry.components {
        check_identifier("propRenames.components", component)?;
    }

    let attribute = regex::escape(&entry.attribute);
    let usage = match alternation(entry.components.iter()) {
        Some(names) => format!(r"<({})((?:\s[^<>]*?)?\s){}=", names, attribute),
        // Matches nothing: no component exposes the prop.
        None => r"[^\s\S]".to_string(),
    };

    Ok(PropRename {
        attribute: SmolStr::new(&entry.attribute),
        renamed: SmolStr::new(&entry.renamed),
        usage: Regex::new(&usage)?,
        declaration: Regex::new(&format!(r"\blet\s+{}\s*=", attribute))?,
    })
}

/// Builds `\b(a|b)\(`, longest names first.
fn call_pattern<'a>(names: impl Iterator<Item = &'a SmolStr>) -> Result<Option<Regex>, RuleError> {
    match alternation(names) {
        Some(names) => Ok(Some(Regex::new(&format!(r"\b({})\(", names))?)),
        None => Ok(None),
    }
}

fn alternation<'a, S>(names: impl Iterator<Item = &'a S>) -> Option<String>
where
    S: AsRef<str> + 'a + ?Sized,
{
    let mut names: Vec<&str> = names.map(|name| name.as_ref()).collect();
    if names.is_empty() {
        return None;
    }
    names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    Some(
        names
            .into_iter()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|"),
    )
}

fn check_identifier(table: &'static str, name: &str) -> Result<(), RuleError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_' || first == '$')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(RuleError::InvalidName {
            table,
            name: name.to_string(),
        })
    }
}

fn is_tag_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_rules_load() {
        let rules = RuleSet::builtin().unwrap();
        assert_eq!(rules.indent(), "\t");
        assert!(!rules.elide_self_bindings());

        let helper = rules.helper("fromnow").unwrap();
        assert_eq!(helper.service, "dateService");
        assert_eq!(helper.module, "services/date-service");

        assert_eq!(rules.single_call_module("validator"), Some("services/validator"));
        assert_eq!(rules.component_path("input-text"), Some("components/fields/input-text"));
        assert_eq!(rules.decorator_module("tip"), Some("decorators/tip"));
        assert_eq!(rules.prop_renames().len(), 1);
    }

    #[test]
    fn store_values_follow_defaults() {
        let rules = RuleSet::builtin().unwrap();
        assert_eq!(rules.store_initial_value("loading"), "false");
        assert_eq!(rules.store_initial_value("user"), "null");
        assert_eq!(rules.store_module("user"), "stores/user");
    }

    #[test]
    fn minimal_file_uses_defaults() {
        let rules = RuleSet::from_json(r#"{ "version": 1 }"#).unwrap();
        assert!(rules.helper_pattern().is_none());
        assert!(rules.decorator_pattern().is_none());
        assert_eq!(rules.store_initial_value("loading"), "null");
    }

    #[test]
    fn rejects_unknown_version() {
        let err = RuleSet::from_json(r#"{ "version": 2 }"#).unwrap_err();
        assert!(matches!(err, RuleError::UnsupportedVersion { found: 2, .. }));
    }

    #[test]
    fn rejects_invalid_helper_names() {
        let json = r#"{
            "version": 1,
            "services": { "svc": { "module": "m", "helpers": ["not valid"] } }
        }"#;
        let err = RuleSet::from_json(json).unwrap_err();
        assert!(matches!(err, RuleError::InvalidName { table: "services.helpers", .. }));
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = RuleSet::from_json(r#"{ "version": 1, "helpers": {} }"#).unwrap_err();
        assert!(matches!(err, RuleError::Json(_)));
    }

    #[test]
    fn helper_pattern_prefers_longer_names() {
        let json = r#"{
            "version": 1,
            "services": { "svc": { "module": "m", "helpers": ["date", "datestamp"] } }
        }"#;
        let rules = RuleSet::from_json(json).unwrap();
        let caps = rules.helper_pattern().unwrap().captures("datestamp(x)").unwrap();
        assert_eq!(&caps[1], "datestamp");
    }

    #[test]
    fn prop_rename_patterns() {
        let rules = RuleSet::builtin().unwrap();
        let rename = &rules.prop_renames()[0];
        assert!(rename.usage_pattern().is_match(r#"<Btn type="submit" class="x">"#));
        assert!(rename.usage_pattern().is_match("<BtnGroup class=\"x\">"));
        assert!(!rename.usage_pattern().is_match("<Btn data-class=\"x\">"));
        assert!(!rename.usage_pattern().is_match("<div class=\"x\">"));
        assert!(rename.declaration_pattern().is_match("export let class = ''"));
    }
}
