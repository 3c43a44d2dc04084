//! Capitalization rules shared by tag renaming and output file naming.

use crate::transform::UnitKind;

/// Converts a hyphen-delimited name to its capitalized-concatenated form.
///
/// `input-text` becomes `InputText`; empty segments are dropped.
pub fn to_upper_name(name: &str) -> String {
    name.split('-').map(capitalize).collect()
}

/// Upper-cases the first character of `word`.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Returns the output file name for a unit with the given file stem.
///
/// Template-bearing units become `.svelte` components with a capitalized
/// base name; plain-script units keep their name.
pub fn output_file_name(stem: &str, kind: UnitKind) -> String {
    match kind {
        UnitKind::Template => format!("{}.svelte", to_upper_name(stem)),
        UnitKind::Script => format!("{}.js", stem),
    }
}

/// Rewrites a module path that points at a template-bearing unit so that it
/// points at the converted component.
///
/// `./fields/input-text.html` becomes `./fields/InputText.svelte`. Paths that
/// do not end in `.html` are returned unchanged.
pub fn component_module_path(path: &str) -> String {
    let Some(without_ext) = path.strip_suffix(".html") else {
        return path.to_string();
    };
    let (dir, stem) = match without_ext.rfind('/') {
        Some(slash) => without_ext.split_at(slash + 1),
        None => ("", without_ext),
    };
    format!("{}{}.svelte", dir, to_upper_name(stem))
}
