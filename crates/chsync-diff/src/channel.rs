//! Channel-level comparison

use std::collections::{BTreeMap, BTreeSet};

use chsync_model::{FlatChannel, Value};
use serde::Serialize;

use crate::collapse_whitespace;
use crate::structural::diff_objects_with;
use crate::unified::{UnifiedDiffOptions, unified_diff};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Changed,
}

impl ChangeKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Added => "Added",
            Self::Removed => "Removed",
            Self::Changed => "Changed",
        }
    }
}

/// A structural difference at a dot/bracket path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigChange {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
}

impl ConfigChange {
    pub fn added(path: String, value: Value) -> Self {
        Self {
            path,
            kind: ChangeKind::Added,
            old_value: None,
            new_value: Some(value),
        }
    }

    pub fn removed(path: String, value: Value) -> Self {
        Self {
            path,
            kind: ChangeKind::Removed,
            old_value: Some(value),
            new_value: None,
        }
    }

    pub fn changed(path: String, old: Value, new: Value) -> Self {
        Self {
            path,
            kind: ChangeKind::Changed,
            old_value: Some(old),
            new_value: Some(new),
        }
    }
}

/// A script body difference at a slash path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptChange {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unified_diff: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    pub channel_name: String,
    pub config_changes: Vec<ConfigChange>,
    pub script_changes: Vec<ScriptChange>,
    /// Always `config_changes.len() + script_changes.len()`
    pub change_count: usize,
    pub summary: String,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.change_count == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffOptions {
    /// Collapse whitespace runs before comparing strings and script bodies
    pub ignore_whitespace: bool,
    pub context_lines: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            ignore_whitespace: false,
            context_lines: 3,
        }
    }
}

/// Compare two flattened channels.
///
/// Destinations present on only one side are reported as a single change at
/// `destinations.<name>`; their scripts are not listed separately.
pub fn diff(old: &FlatChannel, new: &FlatChannel, options: &DiffOptions) -> DiffResult {
    let ignore_ws = options.ignore_whitespace;
    let mut config_changes = Vec::new();
    let mut script_changes = Vec::new();

    config_changes.extend(diff_objects_with(&old.metadata, &new.metadata, "metadata", ignore_ws));
    config_changes.extend(diff_objects_with(
        &old.source_connector,
        &new.source_connector,
        "source.connector",
        ignore_ws,
    ));

    diff_scripts("scripts", &old.scripts, &new.scripts, options, &mut script_changes);
    diff_scripts(
        "source",
        &old.source_scripts,
        &new.source_scripts,
        options,
        &mut script_changes,
    );

    for old_dest in &old.destinations {
        let path = format!("destinations.{}", old_dest.name);
        match new.destination(&old_dest.name) {
            Some(new_dest) => {
                config_changes.extend(diff_objects_with(
                    &old_dest.connector,
                    &new_dest.connector,
                    &format!("{}.connector", path),
                    ignore_ws,
                ));
                diff_scripts(
                    &format!("destinations/{}", old_dest.name),
                    &old_dest.scripts,
                    &new_dest.scripts,
                    options,
                    &mut script_changes,
                );
            }
            None => config_changes.push(ConfigChange::removed(path, old_dest.connector.clone())),
        }
    }
    for new_dest in &new.destinations {
        if old.destination(&new_dest.name).is_none() {
            config_changes.push(ConfigChange::added(
                format!("destinations.{}", new_dest.name),
                new_dest.connector.clone(),
            ));
        }
    }

    let channel_name = new
        .name()
        .or_else(|| old.name())
        .unwrap_or_default()
        .to_string();
    let summary = summarize(config_changes.len(), script_changes.len());

    DiffResult {
        channel_name,
        change_count: config_changes.len() + script_changes.len(),
        config_changes,
        script_changes,
        summary,
    }
}

fn diff_scripts(
    prefix: &str,
    old: &BTreeMap<String, String>,
    new: &BTreeMap<String, String>,
    options: &DiffOptions,
    out: &mut Vec<ScriptChange>,
) {
    let keys: BTreeSet<&String> = old.keys().chain(new.keys()).collect();

    for key in keys {
        let path = format!("{}/{}.js", prefix, key);
        match (old.get(key), new.get(key)) {
            (Some(before), Some(after)) => {
                let equal = if options.ignore_whitespace {
                    collapse_whitespace(before) == collapse_whitespace(after)
                } else {
                    before == after
                };
                if !equal {
                    let text = unified_diff(
                        before,
                        after,
                        &UnifiedDiffOptions {
                            context: options.context_lines,
                            header: Some(path.clone()),
                        },
                    );
                    out.push(ScriptChange {
                        path,
                        kind: ChangeKind::Changed,
                        unified_diff: Some(text),
                    });
                }
            }
            (Some(_), None) => out.push(ScriptChange {
                path,
                kind: ChangeKind::Removed,
                unified_diff: None,
            }),
            (None, Some(_)) => out.push(ScriptChange {
                path,
                kind: ChangeKind::Added,
                unified_diff: None,
            }),
            (None, None) => {}
        }
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

fn summarize(config: usize, scripts: usize) -> String {
    if config + scripts == 0 {
        return "no changes".to_string();
    }
    let mut parts = Vec::new();
    if config > 0 {
        parts.push(plural(config, "config change"));
    }
    if scripts > 0 {
        parts.push(plural(scripts, "script change"));
    }
    parts.join(", ")
}
