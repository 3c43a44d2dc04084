//! Passes over module syntax and component instance access.

use crate::context::TransformContext;
use crate::literal::COMPONENT_EXPORT;
use crate::naming::component_module_path;
use crate::regions::insert_at_script_start;
use crate::rules::RuleSet;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static REQUIRE_BINDING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(?:const|let|var)\s([a-zA-Z0-9_${},\r\n\s]+?)\s?=\s?require\(([^)]+)\).*$")
        .expect("valid regex")
});
static BARE_REQUIRE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]*)require\(([^)]+)\).*$").expect("valid regex")
});
static MODULE_EXPORTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"module\.exports\s?=\s?").expect("valid regex"));
static IMPORT_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^([ \t]*import\s+(?:[^'"\n]+?\s+from\s+)?)(['"])([^'"\n]+)(['"])"#)
        .expect("valid regex")
});
static FIRE_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"this\.fire\(").expect("valid regex"));
static NULL_EVENT_ARG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(dispatch|pubsub\.fire)\(([^,]+), null,([^)]+)\)").expect("valid regex")
});
static SET_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:@|this)\.set\('([^']+)',\s?([^)]+)\)").expect("valid regex")
});
static GET_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:@|this)\.get\('([^']+)'\)").expect("valid regex"));
static SELF_BINDING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:const|let)\s+([A-Za-z0-9_$]+)\s*=\s*([A-Za-z0-9_$]+)[ \t]*;?[ \t]*(?:\r?\n|$)")
        .expect("valid regex")
});

/// `const x = require('x')` becomes `import x from 'x'`, a bare
/// `require('x')` statement becomes `import 'x'`, and `module.exports =`
/// becomes `export default`.
pub fn requires_to_imports(source: &str) -> String {
    let out = REQUIRE_BINDING.replace_all(source, |caps: &Captures| {
        format!("import {} from {}", caps[1].trim(), caps[2].trim())
    });
    let out = BARE_REQUIRE.replace_all(&out, "${1}import ${2}");
    MODULE_EXPORTS
        .replace_all(&out, "export default ")
        .into_owned()
}

/// Points imports of template-bearing units at the converted components.
pub fn html_imports_to_svelte(source: &str) -> String {
    IMPORT_PATH
        .replace_all(source, |caps: &Captures| {
            format!(
                "{}{}{}{}",
                &caps[1],
                &caps[2],
                component_module_path(&caps[3]),
                &caps[4]
            )
        })
        .into_owned()
}

/// `this.fire(` becomes `dispatch(` backed by an event dispatcher declared
/// ahead of the component definition.
pub fn fire_to_dispatch(source: &str, cx: &mut TransformContext, rules: &RuleSet) -> String {
    let fires = FIRE_CALL.is_match(source);
    let out = FIRE_CALL.replace_all(source, "dispatch(");

    // The event object is no longer merged into a `null` detail argument.
    let out = NULL_EVENT_ARG
        .replace_all(&out, |caps: &Captures| {
            format!("{}({}, {})", &caps[1], &caps[2], caps[3].trim())
        })
        .into_owned();

    if !fires {
        return out;
    }

    cx.import_named("createEventDispatcher", "svelte");
    let declaration = "const dispatch = createEventDispatcher()";
    match out.find(COMPONENT_EXPORT) {
        Some(at) => format!(
            "{}{}\n{}{}",
            &out[..at],
            declaration,
            rules.indent(),
            &out[at..]
        ),
        None => insert_at_script_start(&out, &format!("{}{}", rules.indent(), declaration)),
    }
}

/// Rewrites instance `get`/`set` calls to plain variable access and drops
/// `this.` qualifiers.
pub fn get_set(source: &str, rules: &RuleSet) -> String {
    let out = SET_CALL.replace_all(source, "${1} = ${2}");
    let out = GET_CALL.replace_all(&out, |caps: &Captures| caps[1].replacen('.', "?.", 1));

    let out = if rules.elide_self_bindings() {
        SELF_BINDING
            .replace_all(&out, |caps: &Captures| {
                if caps[1] == caps[2] {
                    String::new()
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned()
    } else {
        out.into_owned()
    };

    out.replace("this.", "")
}
