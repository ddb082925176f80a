//! Change intelligence for channel configurations
//!
//! - [`diff_objects`]: recursive structural diff with dot/bracket paths
//! - [`unified_diff`]: line-based unified diff with context-grouped hunks
//! - [`diff`]: full channel comparison producing a [`DiffResult`]
//! - [`format_for_cli`]: terminal rendering of a [`DiffResult`]

mod channel;
mod report;
mod structural;
mod unified;

pub use channel::{ChangeKind, ConfigChange, DiffOptions, DiffResult, ScriptChange, diff};
pub use report::format_for_cli;
pub use structural::diff_objects;
pub use unified::{UnifiedDiffOptions, unified_diff};

/// Collapse every run of whitespace to a single space.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}
