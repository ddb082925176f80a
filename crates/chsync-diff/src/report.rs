use std::fmt::Write;

use chsync_model::Value;

use crate::channel::{ChangeKind, DiffResult};

const MAX_VALUE_WIDTH: usize = 60;

/// Render a [`DiffResult`] as plain terminal text.
pub fn format_for_cli(result: &DiffResult) -> String {
    let mut out = String::new();
    let name = if result.channel_name.is_empty() {
        "(unnamed channel)"
    } else {
        result.channel_name.as_str()
    };
    let _ = writeln!(
        out,
        "Channel '{}': {} change{}",
        name,
        result.change_count,
        if result.change_count == 1 { "" } else { "s" }
    );

    if result.change_count == 0 {
        return out;
    }

    if !result.config_changes.is_empty() {
        out.push('\n');
        out.push_str("Config changes:\n");
        for change in &result.config_changes {
            let _ = match change.kind {
                ChangeKind::Changed => writeln!(
                    out,
                    "  Changed {}: {} -> {}",
                    change.path,
                    display_value(change.old_value.as_ref()),
                    display_value(change.new_value.as_ref())
                ),
                ChangeKind::Added => writeln!(
                    out,
                    "  Added {}: {}",
                    change.path,
                    display_value(change.new_value.as_ref())
                ),
                ChangeKind::Removed => writeln!(
                    out,
                    "  Removed {}: {}",
                    change.path,
                    display_value(change.old_value.as_ref())
                ),
            };
        }
    }

    for script in &result.script_changes {
        out.push('\n');
        let _ = writeln!(out, "--- {} ---", script.path);
        match script.kind {
            ChangeKind::Added => out.push_str("(new file)\n"),
            ChangeKind::Removed => out.push_str("(deleted)\n"),
            ChangeKind::Changed => {
                if let Some(diff) = &script.unified_diff {
                    out.push_str(diff);
                }
            }
        }
    }

    out
}

fn display_value(value: Option<&Value>) -> String {
    let rendered = match value {
        Some(Value::Scalar(chsync_model::Scalar::String(s))) => format!("\"{}\"", s),
        Some(v) => v.render(),
        None => "null".to_string(),
    };
    truncate(&rendered)
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_VALUE_WIDTH {
        return text.to_string();
    }
    let head: String = text.chars().take(MAX_VALUE_WIDTH).collect();
    format!("{}...", head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{ConfigChange, ScriptChange};

    fn result(config: Vec<ConfigChange>, scripts: Vec<ScriptChange>) -> DiffResult {
        DiffResult {
            channel_name: "ADT Receiver".into(),
            change_count: config.len() + scripts.len(),
            config_changes: config,
            script_changes: scripts,
            summary: String::new(),
        }
    }

    #[test]
    fn empty_result_is_header_only() {
        let text = format_for_cli(&result(vec![], vec![]));
        assert_eq!(text, "Channel 'ADT Receiver': 0 changes\n");
    }

    #[test]
    fn config_lines_use_change_labels() {
        let text = format_for_cli(&result(
            vec![
                ConfigChange::changed("port".into(), Value::from(6661i64), Value::from(6662i64)),
                ConfigChange::added("host".into(), Value::from("localhost")),
            ],
            vec![],
        ));
        assert!(text.contains("  Changed port: 6661 -> 6662\n"));
        assert!(text.contains("  Added host: \"localhost\"\n"));
    }

    #[test]
    fn long_values_are_truncated() {
        let long = "x".repeat(100);
        let text = format_for_cli(&result(
            vec![ConfigChange::removed("blob".into(), Value::from(long))],
            vec![],
        ));
        let line = text.lines().find(|l| l.contains("Removed blob")).unwrap();
        assert!(line.ends_with("..."));
        assert!(line.len() < 100);
    }

    #[test]
    fn script_blocks_mark_additions_and_deletions() {
        let text = format_for_cli(&result(
            vec![],
            vec![
                ScriptChange {
                    path: "scripts/deploy.js".into(),
                    kind: ChangeKind::Added,
                    unified_diff: None,
                },
                ScriptChange {
                    path: "source/filter/step-0-accept.js".into(),
                    kind: ChangeKind::Removed,
                    unified_diff: None,
                },
            ],
        ));
        assert!(text.contains("--- scripts/deploy.js ---\n(new file)\n"));
        assert!(text.contains("--- source/filter/step-0-accept.js ---\n(deleted)\n"));
    }
}
