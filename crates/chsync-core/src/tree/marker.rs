//! First-line header comments embedded in script files

/// `// @sequence <n>` at the top of step scripts
pub const SEQUENCE_MARKER: &str = "@sequence";

/// `// @template-id <id>` at the top of code-template scripts
pub const TEMPLATE_MARKER: &str = "@template-id";

/// Prefix `body` with a `// <marker> <value>` line.
pub fn with_marker(marker: &str, value: &str, body: &str) -> String {
    format!("// {} {}\n{}", marker, value, body)
}

/// Split a marker line off `content`.
///
/// Returns the marker value and the remaining body, or `None` when the first
/// line is not that marker.
pub fn read_marker<'a>(marker: &str, content: &'a str) -> Option<(&'a str, &'a str)> {
    let (first, rest) = match content.split_once('\n') {
        Some((first, rest)) => (first, rest),
        None => (content, ""),
    };
    let first = first.trim_end_matches('\r');
    let value = first
        .trim_start()
        .strip_prefix("//")?
        .trim_start()
        .strip_prefix(marker)?;
    if !value.is_empty() && !value.starts_with(char::is_whitespace) {
        return None;
    }
    Some((value.trim(), rest))
}
