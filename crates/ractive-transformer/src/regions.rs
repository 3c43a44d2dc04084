//! Locating the behavior-script region of a template-bearing unit.

/// Returns the byte offset just past the first `<script ...>` open tag.
pub fn script_open_end(source: &str) -> Option<usize> {
    let mut search = 0;
    while let Some(found) = source[search..].find("<script") {
        let tag_start = search + found;
        let after_name = tag_start + "<script".len();
        match source[after_name..].chars().next() {
            Some('>') => return Some(after_name + 1),
            Some(c) if c.is_whitespace() => {
                return source[after_name..]
                    .find('>')
                    .map(|close| after_name + close + 1);
            }
            _ => search = after_name,
        }
    }
    None
}

/// Inserts `content` on its own line right after the script open tag, or
/// appends a new script region holding it when the unit has none.
pub fn insert_at_script_start(source: &str, content: &str) -> String {
    if content.trim().is_empty() {
        return source.to_string();
    }
    match script_open_end(source) {
        Some(end) => {
            let mut out = String::with_capacity(source.len() + content.len() + 1);
            out.push_str(&source[..end]);
            out.push('\n');
            out.push_str(content);
            out.push_str(&source[end..]);
            out
        }
        None => format!("{}\n\n<script>\n{}\n</script>", source, content),
    }
}

/// Applies `f` to every segment of `source` outside `<script>` and `<style>`
/// elements, leaving those elements untouched.
pub fn map_markup(source: &str, mut f: impl FnMut(&str) -> String) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some((start, end)) = next_raw_element(rest) {
        out.push_str(&f(&rest[..start]));
        out.push_str(&rest[start..end]);
        rest = &rest[end..];
    }
    out.push_str(&f(rest));
    out
}

/// Finds the next `<script>` or `<style>` element, returning its byte range.
fn next_raw_element(source: &str) -> Option<(usize, usize)> {
    ["script", "style"]
        .iter()
        .filter_map(|tag| {
            let open = format!("<{}", tag);
            let close = format!("</{}>", tag);
            let mut search = 0;
            while let Some(found) = source[search..].find(&open) {
                let start = search + found;
                let after = start + open.len();
                if matches!(source[after..].chars().next(), Some(c) if c == '>' || c.is_whitespace())
                {
                    let end = source[after..]
                        .find(&close)
                        .map(|i| after + i + close.len())
                        .unwrap_or(source.len());
                    return Some((start, end));
                }
                search = after;
            }
            None
        })
        .min_by_key(|&(start, _)| start)
}
