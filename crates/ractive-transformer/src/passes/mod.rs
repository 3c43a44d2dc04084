//! Rewrite passes.
//!
//! Each pass targets one narrow syntactic concern. Pure passes only see the
//! text; ruled passes also read the rule tables; contextual passes may record
//! import obligations, shared-state references and warnings on the unit's
//! [`TransformContext`].

pub mod components;
pub mod script;
pub mod services;
pub mod template;

use crate::context::TransformContext;
use crate::rules::RuleSet;

/// How a pass is invoked.
#[derive(Clone, Copy)]
pub enum PassKind {
    /// `text -> text`
    Pure(fn(&str) -> String),
    /// `text, rules -> text`
    Ruled(fn(&str, &RuleSet) -> String),
    /// `text, context, rules -> text`
    Contextual(fn(&str, &mut TransformContext, &RuleSet) -> String),
}

/// A named rewrite pass.
#[derive(Clone, Copy)]
pub struct Pass {
    /// Stable name used in logs and warnings.
    pub name: &'static str,
    /// The rewrite.
    pub kind: PassKind,
}

impl Pass {
    /// A pass that only reads the text.
    pub const fn pure(name: &'static str, run: fn(&str) -> String) -> Self {
        Self {
            name,
            kind: PassKind::Pure(run),
        }
    }

    /// A pass that reads the rule tables.
    pub const fn ruled(name: &'static str, run: fn(&str, &RuleSet) -> String) -> Self {
        Self {
            name,
            kind: PassKind::Ruled(run),
        }
    }

    /// A pass that records obligations on the unit context.
    pub const fn contextual(
        name: &'static str,
        run: fn(&str, &mut TransformContext, &RuleSet) -> String,
    ) -> Self {
        Self {
            name,
            kind: PassKind::Contextual(run),
        }
    }

    /// Runs the pass.
    pub fn apply(&self, source: &str, cx: &mut TransformContext, rules: &RuleSet) -> String {
        match self.kind {
            PassKind::Pure(run) => run(source),
            PassKind::Ruled(run) => run(source, rules),
            PassKind::Contextual(run) => run(source, cx, rules),
        }
    }
}

impl std::fmt::Debug for Pass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pass").field("name", &self.name).finish()
    }
}

/// Returns whether the character before `offset` is `.`, so that a match is
/// a member access rather than a free call.
pub(crate) fn preceded_by_dot(source: &str, offset: usize) -> bool {
    source[..offset].ends_with('.')
}
