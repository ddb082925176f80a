//! Code-template libraries

use serde::{Deserialize, Serialize};

/// A reusable script shared between channels.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CodeTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub code: String,
}

/// A named group of code templates and the channels it is enabled for.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeTemplateLibrary {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub enabled_channel_ids: Vec<String>,
    #[serde(default)]
    pub templates: Vec<CodeTemplate>,
}
