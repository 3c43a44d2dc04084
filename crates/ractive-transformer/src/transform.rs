//! Pipeline orchestration for a single unit.

use crate::context::{ImportSet, TransformContext, TransformWarning};
use crate::imports::inject_with_indent;
use crate::literal;
use crate::passes::{components, script, services, template, Pass};
use crate::rules::RuleSet;
use crate::TODO_MARKER;
use indexmap::IndexSet;
use serde::Serialize;
use smol_str::SmolStr;

/// What a unit holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// A template-bearing component unit.
    Template,
    /// A plain-script unit.
    Script,
}

/// Options for transformation.
#[derive(Debug, Clone)]
pub struct TransformOptions {
    /// What the unit holds.
    pub kind: UnitKind,
    /// The unit's path, for diagnostics.
    pub filename: Option<String>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            kind: UnitKind::Template,
            filename: None,
        }
    }
}

/// The result of transforming one unit.
#[derive(Debug, Clone)]
pub struct TransformResult {
    /// The rewritten unit text.
    pub code: String,
    /// Imports requested by the passes.
    pub imports: ImportSet,
    /// Shared-state keys the unit references.
    pub shared_keys: IndexSet<SmolStr>,
    /// Non-fatal warnings.
    pub warnings: Vec<TransformWarning>,
    /// Number of follow-up markers left in `code`.
    pub follow_ups: usize,
}

/// Passes applied to template-bearing units, in order.
pub const TEMPLATE_PASSES: &[Pass] = &[
    Pass::pure("requires-to-imports", script::requires_to_imports),
    Pass::pure("html-imports", script::html_imports_to_svelte),
    Pass::contextual("shared-to-store", services::shared_to_store),
    Pass::contextual("fire-to-dispatch", script::fire_to_dispatch),
    Pass::contextual("component-literal", literal::component_literal),
    Pass::ruled("get-set", script::get_set),
    Pass::contextual("links-to-imports", components::links_to_imports),
    Pass::pure("event-handlers", template::event_handlers),
    Pass::pure("yield-to-slot", template::yield_to_slot),
    Pass::pure("if-blocks", template::if_blocks),
    Pass::pure("each-aliases", template::each_aliases),
    Pass::pure("interpolation", template::interpolation),
    Pass::pure("simple-props", template::simple_props),
    Pass::ruled("class-props", components::class_props),
    Pass::contextual("helpers", services::helpers),
    Pass::contextual("decorators", services::decorators),
];

/// Passes applied to plain-script units, in order.
pub const SCRIPT_PASSES: &[Pass] = &[
    Pass::pure("requires-to-imports", script::requires_to_imports),
    Pass::pure("html-imports", script::html_imports_to_svelte),
];

impl UnitKind {
    /// The passes for this kind of unit.
    pub fn passes(self) -> &'static [Pass] {
        match self {
            UnitKind::Template => TEMPLATE_PASSES,
            UnitKind::Script => SCRIPT_PASSES,
        }
    }
}

/// Transforms a unit's text.
///
/// Every pass runs in order against a context created for this unit only;
/// the collected imports are then injected and surrounding whitespace is
/// trimmed. Passes never fail: anything they cannot convert is left behind
/// a follow-up marker or reported as a warning.
pub fn transform(source: &str, rules: &RuleSet, options: TransformOptions) -> TransformResult {
    let filename = options.filename.as_deref().unwrap_or("<input>");
    let mut cx = TransformContext::new();
    let mut code = source.to_string();

    for pass in options.kind.passes() {
        let next = pass.apply(&code, &mut cx, rules);
        if next != code {
            tracing::trace!(file = filename, pass = pass.name, "rewrote");
        }
        code = next;
    }

    let code = inject_with_indent(&code, cx.imports(), rules.indent())
        .trim()
        .to_string();
    let follow_ups = code.matches(TODO_MARKER).count();
    let (imports, shared_keys, warnings) = cx.into_parts();

    tracing::debug!(
        file = filename,
        imports = imports.len(),
        shared = shared_keys.len(),
        warnings = warnings.len(),
        follow_ups,
        "transformed"
    );

    TransformResult {
        code,
        imports,
        shared_keys,
        warnings,
        follow_ups,
    }
}
