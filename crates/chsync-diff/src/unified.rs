//! Line-based unified diff

use std::fmt::Write;
use std::ops::Range;

use similar::{Algorithm, DiffTag, capture_diff_slices, group_diff_ops};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnifiedDiffOptions {
    /// Unchanged lines shown around each change
    pub context: usize,
    /// File name shown as `a/<header>` / `b/<header>`
    pub header: Option<String>,
}

impl Default for UnifiedDiffOptions {
    fn default() -> Self {
        Self {
            context: 3,
            header: None,
        }
    }
}

/// Render the unified diff of two texts.
///
/// Changes separated by more than `2 * context` unchanged lines land in
/// separate hunks. Identical inputs produce an empty string.
pub fn unified_diff(old: &str, new: &str, options: &UnifiedDiffOptions) -> String {
    if old == new {
        return String::new();
    }

    let old_lines: Vec<&str> = old.split('\n').collect();
    let new_lines: Vec<&str> = new.split('\n').collect();
    let ops = capture_diff_slices(Algorithm::Myers, &old_lines, &new_lines);
    let groups = group_diff_ops(ops, options.context);

    let mut out = String::new();
    match &options.header {
        Some(header) => {
            let _ = writeln!(out, "--- a/{}", header);
            let _ = writeln!(out, "+++ b/{}", header);
        }
        None => {
            out.push_str("--- a\n");
            out.push_str("+++ b\n");
        }
    }

    for group in &groups {
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            continue;
        };
        let old_range = first.old_range().start..last.old_range().end;
        let new_range = first.new_range().start..last.new_range().end;
        let _ = writeln!(
            out,
            "@@ -{} +{} @@",
            format_range(&old_range),
            format_range(&new_range)
        );

        for op in group {
            let (tag, old_span, new_span) = op.as_tag_tuple();
            match tag {
                DiffTag::Equal => push_lines(&mut out, ' ', &old_lines[old_span]),
                DiffTag::Delete => push_lines(&mut out, '-', &old_lines[old_span]),
                DiffTag::Insert => push_lines(&mut out, '+', &new_lines[new_span]),
                DiffTag::Replace => {
                    push_lines(&mut out, '-', &old_lines[old_span]);
                    push_lines(&mut out, '+', &new_lines[new_span]);
                }
            }
        }
    }

    out
}

/// `start,count` with 1-based start; an empty range names the line before it.
fn format_range(range: &Range<usize>) -> String {
    let len = range.len();
    let start = if len == 0 { range.start } else { range.start + 1 };
    format!("{},{}", start, len)
}

fn push_lines(out: &mut String, prefix: char, lines: &[&str]) {
    for line in lines {
        out.push(prefix);
        out.push_str(line);
        out.push('\n');
    }
}
