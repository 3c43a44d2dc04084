//! Passes over template markup.
//!
//! All of these leave `<script>` and `<style>` elements untouched.

use crate::regions::map_markup;
use crate::TODO_MARKER;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static EVENT_HANDLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)(^|\s)on-([a-zA-Z]+)="([^"]+)""#).expect("valid regex")
});
static HANDLER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_$]+$").expect("valid regex"));
static NO_ARGUMENT_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:this|@)\.)?([a-zA-Z0-9_$]+)\(\)$").expect("valid regex")
});
static NAMED_YIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{yield\s+([a-zA-Z0-9_-]+)\s*\}\}").expect("valid regex"));
static PARTIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{>\s*([a-zA-Z0-9_-]+)\s*\}\}").expect("valid regex"));
static EACH_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{#each\s+([a-zA-Z0-9_$.]+)(?::([a-zA-Z0-9_$]+))?\s*\}\}").expect("valid regex")
});
static SIMPLE_PROP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\s)([a-zA-Z0-9_$]+)="?\{([a-zA-Z0-9_$]+)\}"?"#).expect("valid regex")
});

/// `on-event="handler"` becomes `on:event={handler}`.
///
/// A bare name or a no-argument call is passed by reference; anything else is
/// wrapped in an arrow function. `submit` handlers prevent the default action.
pub fn event_handlers(source: &str) -> String {
    map_markup(source, |segment| {
        EVENT_HANDLER
            .replace_all(segment, |caps: &Captures| {
                let event = &caps[2];
                let handler = caps[3].trim();
                let expression = if HANDLER_NAME.is_match(handler) {
                    handler.to_string()
                } else if let Some(call) = NO_ARGUMENT_CALL.captures(handler) {
                    call[1].to_string()
                } else {
                    format!("() => {}", handler.replace("@.", ""))
                };
                let modifier = if event == "submit" {
                    "|preventDefault"
                } else {
                    ""
                };
                format!("{}on:{}{}={{{}}}", &caps[1], event, modifier, expression)
            })
            .into_owned()
    })
}

/// Yields become slots. A `{{>content}}` partial is the default slot; any
/// other partial becomes a named slot with a follow-up marker.
pub fn yield_to_slot(source: &str) -> String {
    map_markup(source, |segment| {
        let out = segment.replace("{{yield}}", "<slot></slot>");
        let out = NAMED_YIELD.replace_all(&out, r#"<slot name="${1}"></slot>"#);
        PARTIAL
            .replace_all(&out, |caps: &Captures| match &caps[1] {
                "content" => "<slot></slot>".to_string(),
                name => format!(
                    "<!-- {}: PARTIAL \"{}\" IS NOW A NAMED SLOT -->\n<slot name=\"{}\"></slot>",
                    TODO_MARKER, name, name
                ),
            })
            .into_owned()
    })
}

/// `{{else}}` and the `else if` spellings become Svelte continuation tags.
pub fn if_blocks(source: &str) -> String {
    map_markup(source, |segment| {
        segment
            .replace("{{else}}", "{:else}")
            .replace("{{elseif", "{:else if")
            .replace("{{else if", "{:else if")
    })
}

/// `{{#each list}}` becomes `{#each list as x}` followed by a marker, since
/// the body still refers to the implicit context.
pub fn each_aliases(source: &str) -> String {
    map_markup(source, |segment| {
        EACH_BLOCK
            .replace_all(segment, |caps: &Captures| {
                let index = caps
                    .get(2)
                    .map(|index| format!(", {}", index.as_str()))
                    .unwrap_or_default();
                format!(
                    "{{#each {} as x{}}}\n<!-- {} EACH BODY TO USE ALIAS -->",
                    &caps[1], index, TODO_MARKER
                )
            })
            .into_owned()
    })
}

/// Triple mustaches become `{@html ...}` and double mustaches become single
/// braces.
pub fn interpolation(source: &str) -> String {
    map_markup(source, |segment| {
        segment
            .replace("{{{", "{@html ")
            .replace("}}}", "}")
            .replace("{{", "{")
            .replace("}}", "}")
    })
}

/// `name="{name}"` collapses to the `{name}` shorthand.
pub fn simple_props(source: &str) -> String {
    map_markup(source, |segment| {
        let mut out = String::with_capacity(segment.len());
        let mut last = 0;
        for caps in SIMPLE_PROP.captures_iter(segment) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let bounded = segment[whole.end()..]
                .chars()
                .next()
                .map_or(true, |c| c.is_whitespace() || c == '>' || c == '/');
            if !bounded || caps[2] != caps[3] {
                continue;
            }
            out.push_str(&segment[last..whole.start()]);
            out.push_str(&caps[1]);
            out.push('{');
            out.push_str(&caps[2]);
            out.push('}');
            last = whole.end();
        }
        out.push_str(&segment[last..]);
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn call_handler_passed_by_reference() {
        assert_eq!(
            event_handlers(r#"<button on-click="@.save()">Save</button>"#),
            "<button on:click={save}>Save</button>"
        );
    }

    #[test]
    fn submit_handler_prevents_default() {
        assert_eq!(
            event_handlers(r#"<form on-submit="handleSubmit">"#),
            "<form on:submit|preventDefault={handleSubmit}>"
        );
    }

    #[test]
    fn handler_with_arguments_is_wrapped() {
        assert_eq!(
            event_handlers(r#"<a on-click="@.select(item, true)">"#),
            "<a on:click={() => select(item, true)}>"
        );
    }

    #[test]
    fn handlers_in_scripts_are_left_alone() {
        let source = "<script>\nlet s = ' on-click=\"x\"'\n</script>";
        assert_eq!(event_handlers(source), source);
    }

    #[test]
    fn yields_become_slots() {
        assert_eq!(
            yield_to_slot("<div>{{yield}}</div><p>{{yield footer}}</p>{{>content}}"),
            r#"<div><slot></slot></div><p><slot name="footer"></slot></p><slot></slot>"#
        );
    }

    #[test]
    fn named_partial_gets_marker() {
        assert_eq!(
            yield_to_slot("{{>row}}"),
            "<!-- TODO CONVERT: PARTIAL \"row\" IS NOW A NAMED SLOT -->\n<slot name=\"row\"></slot>"
        );
    }

    #[test]
    fn else_spellings() {
        assert_eq!(
            if_blocks("{{#if a}}1{{elseif b}}2{{else if c}}3{{else}}4{{/if}}"),
            "{{#if a}}1{:else if b}}2{:else if c}}3{:else}4{{/if}}"
        );
    }

    #[test]
    fn each_gets_alias_and_marker() {
        assert_eq!(
            each_aliases("{{#each user.items:i}}"),
            "{#each user.items as x, i}\n<!-- TODO CONVERT EACH BODY TO USE ALIAS -->"
        );
        assert_eq!(
            each_aliases("{{#each items}}"),
            "{#each items as x}\n<!-- TODO CONVERT EACH BODY TO USE ALIAS -->"
        );
    }

    #[test]
    fn each_with_alias_is_left_for_interpolation() {
        let source = "{{#each items as item}}";
        assert_eq!(each_aliases(source), source);
    }

    #[test]
    fn mustaches_become_braces() {
        assert_eq!(interpolation("<p>{{value}}</p>"), "<p>{value}</p>");
        assert_eq!(interpolation("<p>{{{html}}}</p>"), "<p>{@html html}</p>");
    }

    #[test]
    fn braces_in_scripts_survive() {
        let source = "<p>{{a}}</p>\n<script>\n\tconst o = {a: {b: 1}}\n</script>";
        assert_eq!(
            interpolation(source),
            "<p>{a}</p>\n<script>\n\tconst o = {a: {b: 1}}\n</script>"
        );
    }

    #[test]
    fn matching_props_collapse() {
        assert_eq!(
            simple_props(r#"<Card title="{title}" open={open} size={large}/>"#),
            "<Card {title} {open} size={large}/>"
        );
    }

    #[test]
    fn prefixed_attributes_do_not_collapse() {
        let source = r#"<div data-value="{value}" value="{value}x">"#;
        assert_eq!(simple_props(source), source);
    }
}
