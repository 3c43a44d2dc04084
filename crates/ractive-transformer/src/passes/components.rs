//! Component tag resolution and prop renaming.

use crate::context::TransformContext;
use crate::naming::to_upper_name;
use crate::regions::map_markup;
use crate::rules::RuleSet;
use regex::{Captures, Regex};
use rustc_hash::FxHashMap;
use std::sync::LazyLock;

static COMPONENT_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<link\s+rel="ractive"\s+name="([^"]+)"\s+href="([^"]+)"\s*/?>[ \t]*\r?\n?"#)
        .expect("valid regex")
});
static TAG_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(</?)([a-zA-Z][a-zA-Z0-9-]*)").expect("valid regex"));

/// Removes `<link rel="ractive">` declarations, then renames every usage of
/// an explicitly linked or implicitly available component tag to its
/// capitalized form and records the import it needs.
pub fn links_to_imports(source: &str, cx: &mut TransformContext, rules: &RuleSet) -> String {
    let mut links: FxHashMap<String, String> = FxHashMap::default();
    let source = COMPONENT_LINK.replace_all(source, |caps: &Captures| {
        links.insert(caps[1].to_string(), caps[2].to_string());
        String::new()
    });

    map_markup(&source, |segment| {
        TAG_NAME
            .replace_all(segment, |caps: &Captures| {
                let tag = &caps[2];
                let path = links
                    .get(tag)
                    .map(String::as_str)
                    .or_else(|| rules.component_path(tag));
                match path {
                    Some(path) => {
                        let name = to_upper_name(tag);
                        cx.import_default(name.as_str(), component_import_path(tag, path));
                        format!("{}{}", &caps[1], name)
                    }
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    })
}

/// Builds the import path of a component: the last occurrence of the tag in
/// `path` is capitalized and `.svelte` is appended.
///
/// `components/fields/input-text` imported as `input-text` becomes
/// `components/fields/InputText.svelte`.
pub fn component_import_path(tag: &str, path: &str) -> String {
    let path = path.strip_suffix(".html").unwrap_or(path);
    match path.rfind(tag) {
        Some(at) => format!(
            "{}{}{}.svelte",
            &path[..at],
            to_upper_name(tag),
            &path[at + tag.len()..]
        ),
        None => format!("{}.svelte", path),
    }
}

/// Renames attributes on the components and declarations a prop rename
/// applies to, e.g. `class` to `className`.
pub fn class_props(source: &str, rules: &RuleSet) -> String {
    let mut out = source.to_string();
    for rename in rules.prop_renames() {
        let replacement = format!("<${{1}}${{2}}{}=", rename.renamed);
        out = rename
            .usage_pattern()
            .replace_all(&out, replacement.as_str())
            .into_owned();
        out = rename
            .declaration_pattern()
            .replace_all(&out, format!("let {} =", rename.renamed).as_str())
            .into_owned();
    }
    out
}
