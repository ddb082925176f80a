use chsync_fs::layout::{CHANNEL_FILE, CONNECTOR_FILE};
use chsync_fs::slugify;
use chsync_model::{Connector, DecomposedChannel, FileTreeEntry, Mapping, step_file_stem};
use serde::{Deserialize, Serialize};

use super::marker::{SEQUENCE_MARKER, with_marker};
use crate::Result;

/// Contents of `connector.yaml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorFile {
    /// Destination name; absent for the source connector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub transport_type: String,
    #[serde(default)]
    pub properties: Mapping,
}

/// Directory slug of every destination, in order. Colliding slugs get a
/// numeric suffix (`archive`, `archive-2`).
pub fn destination_slugs(channel: &DecomposedChannel) -> Vec<String> {
    let mut slugs: Vec<String> = Vec::with_capacity(channel.destinations.len());
    for destination in &channel.destinations {
        let base = slugify(&destination.name);
        let mut slug = base.clone();
        let mut n = 2;
        while slugs.contains(&slug) {
            slug = format!("{}-{}", base, n);
            n += 1;
        }
        slugs.push(slug);
    }
    slugs
}

fn connector_entries(
    dir: &str,
    name: Option<&str>,
    connector: &Connector,
    out: &mut Vec<FileTreeEntry>,
) -> Result<()> {
    let file = ConnectorFile {
        name: name.map(str::to_string),
        transport_type: connector.transport_type.clone(),
        properties: connector.properties.clone(),
    };
    out.push(FileTreeEntry::yaml(
        format!("{}/{}", dir, CONNECTOR_FILE),
        serde_yaml::to_string(&file)?,
    ));

    for (kind, step) in connector.steps() {
        out.push(FileTreeEntry::script(
            format!("{}/{}.js", dir, step_file_stem(kind, step)),
            with_marker(SEQUENCE_MARKER, &step.sequence.to_string(), &step.script),
        ));
    }
    Ok(())
}

/// The shared file-tree layout of one channel, relative to its directory.
pub fn channel_file_tree(channel: &DecomposedChannel) -> Result<Vec<FileTreeEntry>> {
    let mut entries = vec![FileTreeEntry::yaml(
        CHANNEL_FILE,
        serde_yaml::to_string(&channel.metadata)?,
    )];

    connector_entries("source", None, &channel.source, &mut entries)?;
    for (destination, slug) in channel.destinations.iter().zip(destination_slugs(channel)) {
        connector_entries(
            &format!("destinations/{}", slug),
            Some(&destination.name),
            &destination.connector,
            &mut entries,
        )?;
    }

    for (slot, body) in &channel.scripts {
        if !body.is_empty() {
            entries.push(FileTreeEntry::script(format!("scripts/{}.js", slot), body.clone()));
        }
    }
    Ok(entries)
}
