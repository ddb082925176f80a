//! The merged `config.toml` shape

use serde::{Deserialize, Serialize};

/// Effective tool configuration after every layer is merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub sync: SyncSettings,
    pub variables: VariablesSettings,
    pub secrets: SecretsSettings,
    pub diff: DiffSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Replace credential-shaped values with parameter references on push
    pub mask_secrets: bool,
    pub remote: String,
    /// Branch used for push and pull; the current branch when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Push to the remote after every successful commit
    pub push_remote: bool,
    /// Commit message used instead of the count-based default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            mask_secrets: true,
            remote: "origin".to_string(),
            branch: None,
            push_remote: false,
            commit_message: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariablesSettings {
    /// Environment loaded on pull when none is given explicitly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    pub strict: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretsSettings {
    /// Field names treated as sensitive in addition to the built-in patterns
    pub extra_fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffSettings {
    pub context_lines: usize,
    pub ignore_whitespace: bool,
}

impl Default for DiffSettings {
    fn default() -> Self {
        Self {
            context_lines: 3,
            ignore_whitespace: false,
        }
    }
}

impl SyncConfig {
    /// The commented default file written by `chsync init`.
    pub fn default_file_content() -> String {
        r#"# Channel Sync configuration
#
# Overrides for this machine only belong in .chsync/config.local.toml

[sync]
mask_secrets = true
remote = "origin"
push_remote = false

[variables]
strict = false

[secrets]
extra_fields = []

[diff]
context_lines = 3
ignore_whitespace = false
"#
        .to_string()
    }
}
