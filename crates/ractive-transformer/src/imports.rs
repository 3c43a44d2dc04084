//! Import injection.
//!
//! Pending import requests are written once, as a block at the start of the
//! unit's behavior-script region. A request whose module path is already
//! referenced anywhere in the unit is dropped, which makes injection
//! idempotent.

use crate::context::ImportRequest;
use crate::regions::insert_at_script_start;

/// Injects `requests` into `source` using a tab as the indent unit.
pub fn inject<'a>(source: &str, requests: impl IntoIterator<Item = &'a ImportRequest>) -> String {
    inject_with_indent(source, requests, "\t")
}

/// Injects `requests` into `source`, indenting each import with `indent`.
pub fn inject_with_indent<'a>(
    source: &str,
    requests: impl IntoIterator<Item = &'a ImportRequest>,
    indent: &str,
) -> String {
    let block: Vec<String> = requests
        .into_iter()
        .filter(|request| !references_module(source, &request.module))
        .map(|request| format!("{}{}", indent, request))
        .collect();

    if block.is_empty() {
        return source.to_string();
    }
    insert_at_script_start(source, &block.join("\n"))
}

/// Whether `source` already mentions `module` as a quoted module path.
pub fn references_module(source: &str, module: &str) -> bool {
    source.contains(&format!("'{}'", module)) || source.contains(&format!("\"{}\"", module))
}
