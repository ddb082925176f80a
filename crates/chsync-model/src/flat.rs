//! Flattened projection used for diffing

use std::collections::BTreeMap;

use crate::channel::{Connector, DecomposedChannel, step_file_stem};
use crate::value::{Mapping, Value};

/// Shallow view of a channel: metadata, connector properties and script
/// bodies keyed by their file-tree stem.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlatChannel {
    pub metadata: Value,
    /// Channel-level scripts keyed by slot name
    pub scripts: BTreeMap<String, String>,
    /// Source connector properties
    pub source_connector: Value,
    /// Source step scripts keyed by `<kind>/step-<n>-<slug>`
    pub source_scripts: BTreeMap<String, String>,
    pub destinations: Vec<FlatDestination>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlatDestination {
    pub name: String,
    pub connector: Value,
    pub scripts: BTreeMap<String, String>,
}

impl FlatChannel {
    pub fn name(&self) -> Option<&str> {
        self.metadata
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
    }

    pub fn destination(&self, name: &str) -> Option<&FlatDestination> {
        self.destinations.iter().find(|d| d.name == name)
    }
}

fn connector_scripts(connector: &Connector) -> BTreeMap<String, String> {
    connector
        .steps()
        .map(|(kind, step)| (step_file_stem(kind, step), step.script.clone()))
        .collect()
}

impl From<&DecomposedChannel> for FlatChannel {
    fn from(channel: &DecomposedChannel) -> Self {
        let meta = &channel.metadata;
        let mut metadata = Mapping::new();
        metadata.insert("id".to_string(), meta.id.clone().into());
        metadata.insert("name".to_string(), meta.name.clone().into());
        metadata.insert("description".to_string(), meta.description.clone().into());
        metadata.insert("enabled".to_string(), meta.enabled.into());
        if let Some(revision) = meta.revision {
            metadata.insert("revision".to_string(), revision.into());
        }

        Self {
            metadata: Value::Mapping(metadata),
            scripts: channel
                .scripts
                .iter()
                .map(|(slot, body)| (slot.as_str().to_string(), body.clone()))
                .collect(),
            source_connector: Value::Mapping(channel.source.properties.clone()),
            source_scripts: connector_scripts(&channel.source),
            destinations: channel
                .destinations
                .iter()
                .map(|d| FlatDestination {
                    name: d.name.clone(),
                    connector: Value::Mapping(d.connector.properties.clone()),
                    scripts: connector_scripts(&d.connector),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{ChannelMetadata, Destination, ScriptSlot, Step, StepList};

    #[test]
    fn flattening_keys_scripts_by_tree_stem() {
        let mut channel = DecomposedChannel {
            metadata: ChannelMetadata {
                id: "c1".into(),
                name: "ADT".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        channel.scripts.insert(ScriptSlot::Deploy, "init();".into());
        channel.source.transformer = Some(StepList {
            steps: vec![Step {
                sequence: 0,
                name: "Map PID".into(),
                script: "msg.pid = 1;".into(),
            }],
        });
        channel.destinations.push(Destination {
            name: "d1".into(),
            connector: Connector {
                filter: Some(StepList {
                    steps: vec![Step {
                        sequence: 1,
                        name: "Accept".into(),
                        script: "return true;".into(),
                    }],
                }),
                ..Default::default()
            },
        });

        let flat = FlatChannel::from(&channel);

        assert_eq!(flat.name(), Some("ADT"));
        assert_eq!(flat.scripts["deploy"], "init();");
        assert_eq!(flat.source_scripts["transformer/step-0-map-pid"], "msg.pid = 1;");
        assert_eq!(
            flat.destination("d1").unwrap().scripts["filter/step-1-accept"],
            "return true;"
        );
    }

    #[test]
    fn empty_name_is_none() {
        let flat = FlatChannel::from(&DecomposedChannel::default());
        assert_eq!(flat.name(), None);
    }
}
