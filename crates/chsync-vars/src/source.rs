//! Variable sources and reporting entries

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// Where a variable's winning value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VariableSource {
    #[serde(rename = "process environment")]
    ProcessEnvironment,
    #[serde(rename = "extra")]
    Extra,
    #[serde(rename = "environment")]
    Environment,
    #[serde(rename = "base")]
    Base,
    #[serde(rename = "inline default")]
    InlineDefault,
}

impl VariableSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProcessEnvironment => "process environment",
            Self::Extra => "extra",
            Self::Environment => "environment",
            Self::Base => "base",
            Self::InlineDefault => "inline default",
        }
    }
}

impl fmt::Display for VariableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only report of a variable's value and origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableEntry {
    pub value: String,
    pub source: VariableSource,
}

/// How the highest-priority layer is consulted.
#[derive(Debug, Clone, Default)]
pub enum ProcessEnv {
    /// Read `std::env` at lookup time
    #[default]
    System,
    /// A fixed table standing in for the process environment
    Fixed(HashMap<String, String>),
    /// Skip the process environment layer
    Disabled,
}

impl ProcessEnv {
    pub(crate) fn get(&self, name: &str) -> Option<String> {
        match self {
            Self::System => std::env::var(name).ok(),
            Self::Fixed(vars) => vars.get(name).cloned(),
            Self::Disabled => None,
        }
    }

    pub(crate) fn known_names(&self) -> Vec<String> {
        match self {
            Self::Fixed(vars) => vars.keys().cloned().collect(),
            Self::System | Self::Disabled => Vec::new(),
        }
    }
}
