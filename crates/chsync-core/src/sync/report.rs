//! Workflow inputs and reports

use std::collections::HashMap;

use chsync_model::CodeTemplateLibrary;
use chsync_secrets::SensitiveField;
use chsync_vars::ProcessEnv;
use serde::Serialize;

use super::filter::ChannelFilter;
use crate::config::SyncConfig;

/// One native channel document handed to push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelDocument {
    /// Where the document came from, used when it cannot be decoded
    pub origin: String,
    pub content: String,
}

impl ChannelDocument {
    pub fn new(origin: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PushRequest {
    pub documents: Vec<ChannelDocument>,
    pub libraries: Vec<CodeTemplateLibrary>,
}

#[derive(Debug, Clone)]
pub struct PushOptions {
    pub mask_secrets: bool,
    /// Commit message; a count-based summary when `None`
    pub message: Option<String>,
    /// Push to the configured remote after a successful commit
    pub push_remote: bool,
    pub filter: ChannelFilter,
}

impl Default for PushOptions {
    fn default() -> Self {
        Self::from(&SyncConfig::default())
    }
}

impl From<&SyncConfig> for PushOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            mask_secrets: config.sync.mask_secrets,
            message: config.sync.commit_message.clone(),
            push_remote: config.sync.push_remote,
            filter: ChannelFilter::all(),
        }
    }
}

/// A channel or library that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelError {
    pub channel: String,
    pub message: String,
}

impl ChannelError {
    pub fn new(channel: impl Into<String>, message: impl ToString) -> Self {
        Self {
            channel: channel.into(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushedChannel {
    pub name: String,
    pub slug: String,
    /// Repository-relative paths written because they were new or changed
    pub files_written: Vec<String>,
    /// Stale files removed from the channel directory
    pub files_removed: Vec<String>,
    /// Masked fields. Serializes without the original values.
    #[serde(serialize_with = "serialize_masked")]
    pub masked: Vec<SensitiveField>,
}

fn serialize_masked<S: serde::Serializer>(
    fields: &[SensitiveField],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    use serde::ser::SerializeSeq;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Masked<'a> {
        path: &'a str,
        parameter_name: &'a str,
        transport_type: &'a str,
    }

    let mut seq = serializer.serialize_seq(Some(fields.len()))?;
    for field in fields {
        seq.serialize_element(&Masked {
            path: &field.path,
            parameter_name: &field.parameter_name,
            transport_type: &field.transport_type,
        })?;
    }
    seq.end()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushedLibrary {
    pub name: String,
    pub slug: String,
    pub files_written: Vec<String>,
    pub files_removed: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushReport {
    pub channels: Vec<PushedChannel>,
    pub libraries: Vec<PushedLibrary>,
    pub errors: Vec<ChannelError>,
    pub warnings: Vec<String>,
    /// Hash of the commit, when one was made
    pub commit: Option<String>,
    pub pushed: bool,
    /// Failure of the commit or remote push; everything before it still happened
    pub vcs_error: Option<String>,
}

impl PushReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && self.vcs_error.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PullOptions {
    /// Environment variable file to layer over `base`
    pub environment: Option<String>,
    pub extra_variables: HashMap<String, String>,
    pub strict: bool,
    pub filter: ChannelFilter,
    /// Pull from the configured remote before reading the tree
    pub update_from_remote: bool,
    pub process_env: ProcessEnv,
}

impl From<&SyncConfig> for PullOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            environment: config.variables.environment.clone(),
            strict: config.variables.strict,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PulledChannel {
    pub name: String,
    pub slug: String,
    /// The reassembled native document
    pub document: String,
    pub unresolved_vars: Vec<String>,
    /// Channel-relative paths whose edits changed the document
    pub overlaid: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullReport {
    pub channels: Vec<PulledChannel>,
    pub libraries: Vec<CodeTemplateLibrary>,
    pub errors: Vec<ChannelError>,
    pub warnings: Vec<String>,
}

impl PullReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
