//! Shared state, helper functions and decorators.

use super::preceded_by_dot;
use crate::context::TransformContext;
use crate::rules::RuleSet;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static SHARED_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@shared\.([a-zA-Z0-9_$]+)").expect("valid regex"));

/// `@shared.key` becomes the store subscription `$key`.
pub fn shared_to_store(source: &str, cx: &mut TransformContext, rules: &RuleSet) -> String {
    SHARED_KEY
        .replace_all(source, |caps: &Captures| {
            let key = &caps[1];
            cx.reference_shared(key);
            cx.import_default(key, rules.store_module(key));
            format!("${}", key)
        })
        .into_owned()
}

/// Free calls to helper functions become calls on their service, and calls
/// to single-call services import the service itself.
pub fn helpers(source: &str, cx: &mut TransformContext, rules: &RuleSet) -> String {
    let out = match rules.helper_pattern() {
        Some(pattern) => {
            let mut out = String::with_capacity(source.len());
            let mut last = 0;
            for caps in pattern.captures_iter(source) {
                let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                let Some(helper) = rules.helper(name.as_str()) else {
                    continue;
                };
                if preceded_by_dot(source, whole.start()) || declares(source, whole.start()) {
                    continue;
                }
                cx.import_default(helper.service.as_str(), helper.module.as_str());
                out.push_str(&source[last..whole.start()]);
                out.push_str(&format!("{}.{}(", helper.service, name.as_str()));
                last = whole.end();
            }
            out.push_str(&source[last..]);
            out
        }
        None => source.to_string(),
    };

    if let Some(pattern) = rules.single_call_pattern() {
        for caps in pattern.captures_iter(&out) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if preceded_by_dot(&out, whole.start()) || declares(&out, whole.start()) {
                continue;
            }
            if let Some(module) = rules.single_call_module(name.as_str()) {
                cx.import_default(name.as_str(), module);
            }
        }
    }
    out
}

/// Whether the name at `offset` is the name of a function declaration.
fn declares(source: &str, offset: usize) -> bool {
    let before = &source[..offset];
    let trimmed = before.trim_end_matches([' ', '\t']);
    trimmed.len() < before.len()
        && trimmed
            .strip_suffix("function")
            .is_some_and(|rest| !rest.ends_with(|c: char| c.is_alphanumeric() || c == '_' || c == '$'))
}

/// `as-name="args"` becomes the action `use:name={args}`.
pub fn decorators(source: &str, cx: &mut TransformContext, rules: &RuleSet) -> String {
    let Some(pattern) = rules.decorator_pattern() else {
        return source.to_string();
    };
    pattern
        .replace_all(source, |caps: &Captures| {
            let name = &caps[1];
            if let Some(module) = rules.decorator_module(name) {
                cx.import_default(name, module);
            }
            format!("use:{}={{{}}}", name, &caps[2])
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rules() -> RuleSet {
        RuleSet::builtin().unwrap()
    }

    #[test]
    fn shared_reference_becomes_store() {
        let mut cx = TransformContext::new();
        let out = shared_to_store("{{#if @shared.loading}}", &mut cx, &rules());
        assert_eq!(out, "{{#if $loading}}");
        assert!(cx.shared_keys().contains("loading"));
        let imports: Vec<String> = cx.imports().iter().map(ToString::to_string).collect();
        assert_eq!(imports, vec!["import loading from 'stores/loading'"]);
    }

    #[test]
    fn helper_calls_are_namespaced() {
        let mut cx = TransformContext::new();
        let out = helpers("{{dateformat(created)}} {{x.dateformat(y)}}", &mut cx, &rules());
        assert_eq!(out, "{{dateService.dateformat(created)}} {{x.dateformat(y)}}");
        assert!(cx.imports().contains("services/date-service"));
    }

    #[test]
    fn declared_helper_names_are_left_alone() {
        let mut cx = TransformContext::new();
        let source = "function fromnow(d) {\n\treturn d\n}\nasync function validator(form) {}";
        assert_eq!(helpers(source, &mut cx, &rules()), source);
        assert!(cx.imports().is_empty());

        let out = helpers("function show() { fromnow(d) }", &mut cx, &rules());
        assert_eq!(out, "function show() { dateService.fromnow(d) }");
    }

    #[test]
    fn single_call_service_is_imported() {
        let mut cx = TransformContext::new();
        let out = helpers("{validator(form)}", &mut cx, &rules());
        assert_eq!(out, "{validator(form)}");
        let imports: Vec<String> = cx.imports().iter().map(ToString::to_string).collect();
        assert_eq!(imports, vec!["import validator from 'services/validator'"]);
    }

    #[test]
    fn helper_names_need_a_word_boundary() {
        let mut cx = TransformContext::new();
        let source = "mydateformat(x)";
        assert_eq!(helpers(source, &mut cx, &rules()), source);
        assert!(cx.imports().is_empty());
    }

    #[test]
    fn decorator_becomes_action() {
        let mut cx = TransformContext::new();
        let out = decorators(r#"<i as-tip="'Help text'"></i>"#, &mut cx, &rules());
        assert_eq!(out, "<i use:tip={'Help text'}></i>");
        assert!(cx.imports().contains("decorators/tip"));
    }
}
