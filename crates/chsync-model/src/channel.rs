//! Decomposed channel model

use std::collections::BTreeMap;

use chsync_fs::slugify;
use serde::{Deserialize, Serialize};

use crate::value::Mapping;

/// Channel identity and top-level flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelMetadata {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<i64>,
}

fn default_enabled() -> bool {
    true
}

impl Default for ChannelMetadata {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            description: String::new(),
            enabled: true,
            revision: None,
        }
    }
}

/// The channel-level automation script slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptSlot {
    Deploy,
    Undeploy,
    Preprocess,
    Postprocess,
}

impl ScriptSlot {
    pub const ALL: [ScriptSlot; 4] = [
        ScriptSlot::Deploy,
        ScriptSlot::Undeploy,
        ScriptSlot::Preprocess,
        ScriptSlot::Postprocess,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deploy => "deploy",
            Self::Undeploy => "undeploy",
            Self::Preprocess => "preprocess",
            Self::Postprocess => "postprocess",
        }
    }

    pub fn from_name(name: &str) -> Option<ScriptSlot> {
        Self::ALL.into_iter().find(|slot| slot.as_str() == name)
    }
}

impl std::fmt::Display for ScriptSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Channel-level scripts by slot. Absent slots have no script.
pub type ChannelScripts = BTreeMap<ScriptSlot, String>;

/// Which step list of a connector a step belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepKind {
    Filter,
    Transformer,
    ResponseTransformer,
}

impl StepKind {
    pub const ALL: [StepKind; 3] = [
        StepKind::Filter,
        StepKind::Transformer,
        StepKind::ResponseTransformer,
    ];

    /// Directory name used in the file tree.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Filter => "filter",
            Self::Transformer => "transformer",
            Self::ResponseTransformer => "response-transformer",
        }
    }

    pub fn from_dir_name(name: &str) -> Option<StepKind> {
        Self::ALL.into_iter().find(|kind| kind.dir_name() == name)
    }
}

/// One numbered filter rule or transformer step.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Step {
    pub sequence: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub script: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StepList {
    pub steps: Vec<Step>,
}

impl StepList {
    pub fn find(&self, sequence: u32) -> Option<&Step> {
        self.steps.iter().find(|s| s.sequence == sequence)
    }

    pub fn find_mut(&mut self, sequence: u32) -> Option<&mut Step> {
        self.steps.iter_mut().find(|s| s.sequence == sequence)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    pub transport_type: String,
    #[serde(default)]
    pub properties: Mapping,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<StepList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformer: Option<StepList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_transformer: Option<StepList>,
}

impl Connector {
    pub fn step_list(&self, kind: StepKind) -> Option<&StepList> {
        match kind {
            StepKind::Filter => self.filter.as_ref(),
            StepKind::Transformer => self.transformer.as_ref(),
            StepKind::ResponseTransformer => self.response_transformer.as_ref(),
        }
    }

    pub fn step_list_mut(&mut self, kind: StepKind) -> Option<&mut StepList> {
        match kind {
            StepKind::Filter => self.filter.as_mut(),
            StepKind::Transformer => self.transformer.as_mut(),
            StepKind::ResponseTransformer => self.response_transformer.as_mut(),
        }
    }

    /// Every step of every list, in file-tree order.
    pub fn steps(&self) -> impl Iterator<Item = (StepKind, &Step)> {
        StepKind::ALL.into_iter().flat_map(move |kind| {
            self.step_list(kind)
                .into_iter()
                .flat_map(move |list| list.steps.iter().map(move |step| (kind, step)))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Destination {
    pub name: String,
    pub connector: Connector,
}

/// Identifies a connector within one channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConnectorRef {
    Source,
    Destination(String),
}

impl std::fmt::Display for ConnectorRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Destination(name) => write!(f, "destinations.{}", name),
        }
    }
}

/// Canonical structured projection of one channel.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DecomposedChannel {
    pub metadata: ChannelMetadata,
    #[serde(default)]
    pub scripts: ChannelScripts,
    pub source: Connector,
    #[serde(default)]
    pub destinations: Vec<Destination>,
}

impl DecomposedChannel {
    pub fn destination(&self, name: &str) -> Option<&Destination> {
        self.destinations.iter().find(|d| d.name == name)
    }

    /// Locate a destination by the slug of its name, as used for directory names.
    pub fn destination_by_slug_mut(&mut self, slug: &str) -> Option<&mut Destination> {
        self.destinations
            .iter_mut()
            .find(|d| slugify(&d.name) == slug)
    }

    pub fn connector(&self, target: &ConnectorRef) -> Option<&Connector> {
        match target {
            ConnectorRef::Source => Some(&self.source),
            ConnectorRef::Destination(name) => self.destination(name).map(|d| &d.connector),
        }
    }

    pub fn connector_mut(&mut self, target: &ConnectorRef) -> Option<&mut Connector> {
        match target {
            ConnectorRef::Source => Some(&mut self.source),
            ConnectorRef::Destination(name) => self
                .destinations
                .iter_mut()
                .find(|d| &d.name == name)
                .map(|d| &mut d.connector),
        }
    }

    /// Every connector, source first, with its reference.
    pub fn connectors(&self) -> impl Iterator<Item = (ConnectorRef, &Connector)> {
        std::iter::once((ConnectorRef::Source, &self.source)).chain(
            self.destinations
                .iter()
                .map(|d| (ConnectorRef::Destination(d.name.clone()), &d.connector)),
        )
    }
}

/// File stem of a step script relative to its connector directory,
/// e.g. `transformer/step-0-map-pid`.
pub fn step_file_stem(kind: StepKind, step: &Step) -> String {
    let name = if step.name.trim().is_empty() {
        "step"
    } else {
        step.name.as_str()
    };
    format!("{}/step-{}-{}", kind.dir_name(), step.sequence, slugify(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn step(sequence: u32, name: &str) -> Step {
        Step {
            sequence,
            name: name.to_string(),
            script: String::new(),
        }
    }

    #[test]
    fn step_file_stem_uses_kind_dir_and_slug() {
        assert_eq!(
            step_file_stem(StepKind::ResponseTransformer, &step(2, "Map PID.3")),
            "response-transformer/step-2-map-pid-3"
        );
        assert_eq!(step_file_stem(StepKind::Filter, &step(0, " ")), "filter/step-0-step");
    }

    #[test]
    fn connector_steps_iterate_in_tree_order() {
        let connector = Connector {
            transformer: Some(StepList {
                steps: vec![step(0, "t0")],
            }),
            filter: Some(StepList {
                steps: vec![step(0, "f0"), step(1, "f1")],
            }),
            ..Default::default()
        };
        let names: Vec<_> = connector.steps().map(|(_, s)| s.name.as_str()).collect();
        assert_eq!(names, vec!["f0", "f1", "t0"]);
    }

    #[test]
    fn destination_lookup_by_slug() {
        let mut channel = DecomposedChannel {
            destinations: vec![Destination {
                name: "File Writer".to_string(),
                connector: Connector::default(),
            }],
            ..Default::default()
        };
        assert!(channel.destination_by_slug_mut("file-writer").is_some());
        assert!(channel.destination_by_slug_mut("file").is_none());
    }

    #[test]
    fn script_slot_round_trip_by_name() {
        for slot in ScriptSlot::ALL {
            assert_eq!(ScriptSlot::from_name(slot.as_str()), Some(slot));
        }
        assert_eq!(ScriptSlot::from_name("attachment"), None);
    }
}
