//! Placeholder scanning
//!
//! Splits text into literal runs and `${NAME}` / `${NAME:default}`
//! placeholders. Braces nest, so a default may itself contain placeholders.
//! Anything that does not parse as a placeholder stays literal.

use std::sync::LazyLock;

use regex::Regex;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    Text(&'a str),
    Placeholder(Placeholder<'a>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Placeholder<'a> {
    /// The full `${...}` text
    pub raw: &'a str,
    pub name: &'a str,
    pub default: Option<&'a str>,
}

pub(crate) fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

pub(crate) fn tokenize(text: &str) -> Vec<Segment<'_>> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i + 1 < bytes.len() {
        if bytes[i] != b'$' || bytes[i + 1] != b'{' {
            i += 1;
            continue;
        }

        // An unclosed or malformed `${` is literal; scanning resumes inside it
        let Some(close) = find_close(bytes, i + 2) else {
            i += 2;
            continue;
        };

        let inner = &text[i + 2..close];
        let (name, default) = match inner.find(':') {
            Some(colon) => (&inner[..colon], Some(&inner[colon + 1..])),
            None => (inner, None),
        };

        if is_identifier(name) {
            if text_start < i {
                segments.push(Segment::Text(&text[text_start..i]));
            }
            segments.push(Segment::Placeholder(Placeholder {
                raw: &text[i..=close],
                name,
                default,
            }));
            text_start = close + 1;
            i = close + 1;
        } else {
            i += 2;
        }
    }

    if text_start < text.len() {
        segments.push(Segment::Text(&text[text_start..]));
    }
    segments
}

/// Index of the `}` closing a placeholder whose body starts at `start`.
fn find_close(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut j = start;
    while j < bytes.len() {
        match bytes[j] {
            b'$' if bytes.get(j + 1) == Some(&b'{') => {
                depth += 1;
                j += 2;
                continue;
            }
            b'}' if depth == 0 => return Some(j),
            b'}' => depth -= 1,
            _ => {}
        }
        j += 1;
    }
    None
}
