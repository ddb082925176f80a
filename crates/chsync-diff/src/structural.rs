//! Recursive structural comparison of configuration values

use chsync_model::{Scalar, Value};

use crate::channel::{ChangeKind, ConfigChange};
use crate::collapse_whitespace;

/// Maximum recursion depth; deeper differences are reported as one change.
const MAX_DIFF_DEPTH: usize = 128;

/// Compare two values and list every difference.
///
/// Mapping keys are dot-joined, sequence indices bracket-appended, and
/// `prefix` (when non-empty) is prepended to every path. Scalars are equal
/// only when both value and type match.
pub fn diff_objects(old: &Value, new: &Value, prefix: &str) -> Vec<ConfigChange> {
    let mut changes = Vec::new();
    diff_values(old, new, prefix.to_string(), false, &mut changes, 0);
    changes
}

pub(crate) fn diff_objects_with(
    old: &Value,
    new: &Value,
    prefix: &str,
    ignore_whitespace: bool,
) -> Vec<ConfigChange> {
    let mut changes = Vec::new();
    diff_values(old, new, prefix.to_string(), ignore_whitespace, &mut changes, 0);
    changes
}

fn child_key(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn child_index(path: &str, index: usize) -> String {
    format!("{}[{}]", path, index)
}

fn scalars_equal(old: &Scalar, new: &Scalar, ignore_whitespace: bool) -> bool {
    match (old, new) {
        (Scalar::String(a), Scalar::String(b)) if ignore_whitespace => {
            collapse_whitespace(a) == collapse_whitespace(b)
        }
        _ => old == new,
    }
}

fn diff_values(
    old: &Value,
    new: &Value,
    path: String,
    ignore_whitespace: bool,
    changes: &mut Vec<ConfigChange>,
    depth: usize,
) {
    if depth > MAX_DIFF_DEPTH {
        if old != new {
            changes.push(ConfigChange::changed(path, old.clone(), new.clone()));
        }
        return;
    }

    match (old, new) {
        (Value::Mapping(old_map), Value::Mapping(new_map)) => {
            for (key, old_value) in old_map {
                let child_path = child_key(&path, key);
                match new_map.get(key) {
                    Some(new_value) => diff_values(
                        old_value,
                        new_value,
                        child_path,
                        ignore_whitespace,
                        changes,
                        depth + 1,
                    ),
                    None => changes.push(ConfigChange::removed(child_path, old_value.clone())),
                }
            }
            for (key, new_value) in new_map {
                if !old_map.contains_key(key) {
                    changes.push(ConfigChange::added(child_key(&path, key), new_value.clone()));
                }
            }
        }

        (Value::Sequence(old_items), Value::Sequence(new_items)) => {
            let max_len = old_items.len().max(new_items.len());
            for i in 0..max_len {
                let child_path = child_index(&path, i);
                match (old_items.get(i), new_items.get(i)) {
                    (Some(o), Some(n)) => {
                        diff_values(o, n, child_path, ignore_whitespace, changes, depth + 1)
                    }
                    (Some(o), None) => changes.push(ConfigChange::removed(child_path, o.clone())),
                    (None, Some(n)) => changes.push(ConfigChange::added(child_path, n.clone())),
                    (None, None) => unreachable!(),
                }
            }
        }

        (Value::Scalar(a), Value::Scalar(b)) => {
            if !scalars_equal(a, b, ignore_whitespace) {
                changes.push(ConfigChange::changed(path, old.clone(), new.clone()));
            }
        }

        // Shape changed, e.g. scalar replaced by a mapping
        _ => changes.push(ConfigChange::changed(path, old.clone(), new.clone())),
    }
}
