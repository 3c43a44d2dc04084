//! Bracket-balanced value extraction.
//!
//! Carves the definition of a single key out of object-literal-like text
//! without parsing it. The scan keeps an explicit stack of open delimiters
//! and ignores anything inside string literals and comments, so nested
//! arrow functions, nested literals and shorthand keys come out whole.
//!
//! ```
//! use ractive_transformer::extract;
//!
//! let text = "{ a: 1, b: [2,3], c: (x)=>{return x} }";
//! assert_eq!(extract(text, "b").unwrap().as_str(), "[2,3]");
//! assert_eq!(extract(text, "c").unwrap().as_str(), "(x)=>{return x}");
//! ```

use std::iter::Peekable;
use std::str::CharIndices;
use thiserror::Error;

/// Errors produced while extracting a value definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// No occurrence of the key followed by `,`, `:` or `(`.
    #[error("key `{key}` not found")]
    KeyNotFound {
        /// The requested key.
        key: String,
    },

    /// A closing delimiter did not match the innermost open one.
    #[error("mismatched `{found}` at offset {offset}, expected `{expected}`")]
    MismatchedCloser {
        /// The closer the open delimiter requires.
        expected: char,
        /// The closer that was found.
        found: char,
        /// Byte offset of the offending closer.
        offset: usize,
    },

    /// The text ended while a delimiter opened by the value was still open.
    #[error("unterminated `{open}` opened at offset {offset}")]
    Unterminated {
        /// The open delimiter.
        open: char,
        /// Byte offset where it was opened.
        offset: usize,
    },
}

/// How the key introduced its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueForm {
    /// `{ key, ... }`: the value is the key name itself.
    Shorthand,
    /// `key: value`
    KeyValue,
    /// `key(params) { body }`: the value is `(params) { body }`.
    Method,
}

/// The bracket-balanced slice holding one key's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueDefinition<'a> {
    text: &'a str,
    offset: usize,
    form: ValueForm,
}

impl<'a> ValueDefinition<'a> {
    /// The value text, trimmed of surrounding whitespace.
    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// Byte offset of the value within the searched text.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// How the key introduced the value.
    pub fn form(&self) -> ValueForm {
        self.form
    }
}

impl std::fmt::Display for ValueDefinition<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text)
    }
}

/// Extracts the definition of `key` from `text`.
///
/// The first occurrence of `key` (outside strings and comments, on an
/// identifier boundary) followed by `,`, `:` or `(` is used:
/// - `key,` yields the key itself (shorthand reference)
/// - `key:` scans from just after the colon
/// - `key(` scans from the parenthesis (method shorthand)
///
/// The scan stops at a comma with no open delimiter (excluded), at the
/// `}` or `]` that closes the value's own outermost literal (included), or at
/// a closer that belongs to an enclosing structure (excluded).
pub fn extract<'a>(text: &'a str, key: &str) -> Result<ValueDefinition<'a>, ExtractError> {
    let (key_pos, delimiter_pos, delimiter) =
        locate_key(text, key).ok_or_else(|| ExtractError::KeyNotFound {
            key: key.to_string(),
        })?;

    let (start, form) = match delimiter {
        ',' => {
            return Ok(ValueDefinition {
                text: &text[key_pos..key_pos + key.len()],
                offset: key_pos,
                form: ValueForm::Shorthand,
            })
        }
        ':' => (delimiter_pos + 1, ValueForm::KeyValue),
        _ => (delimiter_pos, ValueForm::Method),
    };

    let end = scan_value(text, start)?;
    let raw = &text[start..end];
    let leading = raw.len() - raw.trim_start().len();
    Ok(ValueDefinition {
        text: raw.trim(),
        offset: start + leading,
        form,
    })
}

/// Returns the byte offset of the delimiter closing the one opened at
/// `open` (which must be `(`, `[` or `{`).
pub(crate) fn find_closing(text: &str, open: usize) -> Option<usize> {
    let mut stack = Vec::new();
    for (i, ch) in CodeChars::new(text, open) {
        if let Some(delim) = Delimiter::opened_by(ch) {
            stack.push(delim);
        } else if let Some(delim) = Delimiter::closed_by(ch) {
            if stack.pop() != Some(delim) {
                return None;
            }
            if stack.is_empty() {
                return Some(i);
            }
        }
    }
    None
}

/// Finds `key` followed (after optional horizontal whitespace) by `,`, `:`
/// or `(`. Returns the key offset, the delimiter offset and the delimiter.
fn locate_key(text: &str, key: &str) -> Option<(usize, usize, char)> {
    if key.is_empty() {
        return None;
    }

    for (i, _) in CodeChars::new(text, 0) {
        if !text[i..].starts_with(key) {
            continue;
        }
        let preceded_by_ident = text[..i]
            .chars()
            .next_back()
            .is_some_and(|c| is_ident_char(c) || c == '.');
        if preceded_by_ident {
            continue;
        }

        let after = i + key.len();
        let rest = &text[after..];
        let gap = rest.len() - rest.trim_start_matches([' ', '\t']).len();
        match rest[gap..].chars().next() {
            Some(c @ (',' | ':' | '(')) => return Some((i, after + gap, c)),
            _ => continue,
        }
    }

    None
}

/// Scans a value starting at `start` and returns its exclusive end offset.
fn scan_value(text: &str, start: usize) -> Result<usize, ExtractError> {
    let mut stack: Vec<(Delimiter, usize)> = Vec::new();

    for (i, ch) in CodeChars::new(text, start) {
        if let Some(delim) = Delimiter::opened_by(ch) {
            stack.push((delim, i));
            continue;
        }

        if let Some(delim) = Delimiter::closed_by(ch) {
            match stack.pop() {
                // Closes the structure that encloses this value.
                None => return Ok(i),
                Some((open, _)) if open != delim => {
                    return Err(ExtractError::MismatchedCloser {
                        expected: open.closer(),
                        found: ch,
                        offset: i,
                    })
                }
                Some(_) => {
                    if stack.is_empty() && delim != Delimiter::Paren {
                        return Ok(i + ch.len_utf8());
                    }
                }
            }
            continue;
        }

        if ch == ',' && stack.is_empty() {
            return Ok(i);
        }
    }

    match stack.last() {
        Some(&(open, offset)) => Err(ExtractError::Unterminated {
            open: open.opener(),
            offset,
        }),
        None => Ok(text.len()),
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Bracket,
    Brace,
    Paren,
}

impl Delimiter {
    fn opened_by(ch: char) -> Option<Self> {
        match ch {
            '[' => Some(Self::Bracket),
            '{' => Some(Self::Brace),
            '(' => Some(Self::Paren),
            _ => None,
        }
    }

    fn closed_by(ch: char) -> Option<Self> {
        match ch {
            ']' => Some(Self::Bracket),
            '}' => Some(Self::Brace),
            ')' => Some(Self::Paren),
            _ => None,
        }
    }

    fn opener(self) -> char {
        match self {
            Self::Bracket => '[',
            Self::Brace => '{',
            Self::Paren => '(',
        }
    }

    fn closer(self) -> char {
        match self {
            Self::Bracket => ']',
            Self::Brace => '}',
            Self::Paren => ')',
        }
    }
}

/// Keywords after which a `/` opens a regex literal.
const REGEX_KEYWORDS: &[&str] = &[
    "return", "typeof", "case", "do", "else", "in", "of", "new", "delete", "void", "throw",
    "yield", "await",
];

/// Iterates the characters of `text` that are code, skipping string
/// literals (including their quotes), regex literals and comments.
struct CodeChars<'a> {
    chars: Peekable<CharIndices<'a>>,
    offset: usize,
    /// Last significant character seen, `(` at the start of the text.
    prev_non_ws: char,
    /// Identifier ending at `prev_non_ws`, if any.
    word: String,
    /// Whitespace was seen after `prev_non_ws`.
    gap: bool,
}

impl<'a> CodeChars<'a> {
    fn new(text: &'a str, start: usize) -> Self {
        Self {
            chars: text[start..].char_indices().peekable(),
            offset: start,
            prev_non_ws: '(',
            word: String::new(),
            gap: false,
        }
    }

    /// Whether a `/` here starts a regex literal rather than a division.
    fn could_start_regex(&self) -> bool {
        if is_ident_char(self.prev_non_ws) {
            return REGEX_KEYWORDS.contains(&self.word.as_str());
        }
        matches!(
            self.prev_non_ws,
            '=' | '!'
                | '+'
                | '-'
                | '*'
                | '%'
                | '<'
                | '>'
                | '&'
                | '|'
                | '^'
                | '~'
                | '?'
                | ':'
                | '('
                | '['
                | '{'
                | ','
                | ';'
        )
    }

    /// Skips a regex literal and its flags. The opening `/` is consumed.
    fn skip_regex(&mut self) {
        let mut in_class = false;
        while let Some((_, ch)) = self.chars.next() {
            match ch {
                '\\' => {
                    self.chars.next();
                }
                '/' if !in_class => {
                    while matches!(self.chars.peek(), Some((_, c)) if c.is_ascii_alphabetic()) {
                        self.chars.next();
                    }
                    return;
                }
                '[' => in_class = true,
                ']' => in_class = false,
                '\n' => return,
                _ => {}
            }
        }
    }

    fn record(&mut self, ch: char) {
        if ch.is_whitespace() {
            self.gap = true;
            return;
        }
        if is_ident_char(ch) {
            if self.gap || !is_ident_char(self.prev_non_ws) {
                self.word.clear();
            }
            self.word.push(ch);
        } else {
            self.word.clear();
        }
        self.prev_non_ws = ch;
        self.gap = false;
    }

    fn skip_string(&mut self, quote: char) {
        while let Some((_, ch)) = self.chars.next() {
            if ch == '\\' {
                self.chars.next();
            } else if ch == quote {
                return;
            }
        }
    }

    fn skip_line_comment(&mut self) {
        for (_, ch) in self.chars.by_ref() {
            if ch == '\n' {
                return;
            }
        }
    }

    fn skip_block_comment(&mut self) {
        while let Some((_, ch)) = self.chars.next() {
            if ch == '*' && matches!(self.chars.peek(), Some((_, '/'))) {
                self.chars.next();
                return;
            }
        }
    }
}

impl Iterator for CodeChars<'_> {
    type Item = (usize, char);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (i, ch) = self.chars.next()?;
            match ch {
                '\'' | '"' | '`' => {
                    self.skip_string(ch);
                    self.record(ch);
                }
                '/' => match self.chars.peek().map(|&(_, next)| next) {
                    Some('/') => {
                        self.chars.next();
                        self.skip_line_comment();
                    }
                    Some('*') => {
                        self.chars.next();
                        self.skip_block_comment();
                    }
                    _ if self.could_start_regex() => {
                        self.skip_regex();
                        // A regex ends like a value does.
                        self.record(')');
                    }
                    _ => {
                        self.record(ch);
                        return Some((i + self.offset, ch));
                    }
                },
                _ => {
                    self.record(ch);
                    return Some((i + self.offset, ch));
                }
            }
        }
    }
}
