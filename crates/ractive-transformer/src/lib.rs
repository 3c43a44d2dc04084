//! Ractive to Svelte component rewriting.
//!
//! This crate rewrites Ractive components (template markup plus a
//! `component.exports` definition) into Svelte components. It handles:
//! - Module syntax (`require`, `module.exports`) and component imports
//! - Template syntax: mustaches, blocks, event directives, yields and partials
//! - The component definition: lifecycle hooks, data, computed and methods
//! - Helper, decorator and shared-state references, driven by rule tables
//! - Injecting the imports all of the above require
//!
//! Whatever cannot be converted mechanically is left behind a
//! [`TODO_MARKER`] comment.
//!
//! # Example
//!
//! ```
//! use ractive_transformer::{transform, RuleSet, TransformOptions};
//!
//! let rules = RuleSet::builtin().unwrap();
//! let source = r#"<button on-click="@.save()">{{label}}</button>"#;
//!
//! let result = transform(source, &rules, TransformOptions::default());
//! assert_eq!(result.code, "<button on:click={save}>{label}</button>");
//! ```

mod context;
mod extract;
mod imports;
mod literal;
mod naming;
pub mod passes;
mod regions;
mod rules;
mod stores;
mod transform;

/// Marks text that needs a manual follow-up after conversion.
pub const TODO_MARKER: &str = "TODO CONVERT";

pub use context::{ImportBinding, ImportRequest, ImportSet, TransformContext, TransformWarning};
pub use extract::{extract, ExtractError, ValueDefinition, ValueForm};
pub use imports::{inject, inject_with_indent, references_module};
pub use literal::{component_literal, interpret, to_arrow, ComponentScript, LiteralError};
pub use naming::{component_module_path, output_file_name, to_upper_name};
pub use rules::{HelperRule, PropRename, RuleError, RuleSet, RULES_VERSION};
pub use stores::{store_module, store_module_source, StoreModule};
pub use transform::{
    transform, TransformOptions, TransformResult, UnitKind, SCRIPT_PASSES, TEMPLATE_PASSES,
};
