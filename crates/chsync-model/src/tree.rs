//! Externalized file entries

use serde::{Deserialize, Serialize};

/// What an externalized file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Yaml,
    Script,
    Document,
}

/// One externalized file. Paths are relative, forward-slash separated and
/// unique within one channel's tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTreeEntry {
    pub path: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl FileTreeEntry {
    pub fn yaml(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            kind: EntryKind::Yaml,
        }
    }

    pub fn script(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            kind: EntryKind::Script,
        }
    }

    pub fn document(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            kind: EntryKind::Document,
        }
    }
}
