//! Overlay of edited repository files onto a snapshot decomposition
//!
//! Every path inside a channel directory maps to exactly one
//! [`OverlayTarget`]; applying a target either changes the decomposition,
//! leaves it as it was, or reports why it could not be located.

use chsync_fs::layout::{CHANNEL_FILE, CONNECTOR_FILE, SNAPSHOT_FILE};
use chsync_fs::{NormalizedPath, io};
use chsync_model::{ChannelMetadata, Connector, DecomposedChannel, ScriptSlot, StepKind};
use tracing::debug;

use crate::tree::{ConnectorFile, SEQUENCE_MARKER, destination_slugs, read_marker};
use crate::{Error, Result};

/// A connector directory: `source` or `destinations/<slug>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectorDir {
    Source,
    Destination(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayTarget {
    Metadata,
    SourceConnector,
    DestinationConnector(String),
    /// `sequence` is parsed from the file name; the marker line wins.
    Step {
        connector: ConnectorDir,
        kind: StepKind,
        sequence: Option<u32>,
    },
    ChannelScript(ScriptSlot),
    /// The snapshot file
    Ignored,
    /// Anything not produced by the file-tree layout
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayOutcome {
    Applied,
    Unchanged,
    NotFound(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayReport {
    /// Paths whose content changed the decomposition
    pub applied: Vec<String>,
    /// `(path, reason)` for files that matched nothing
    pub not_found: Vec<(String, String)>,
    /// Channel script slots dropped because their file is gone
    pub removed: Vec<String>,
}

/// `step-<n>-<slug>.js` -> `n`
fn sequence_from_file_name(file: &str) -> Option<u32> {
    file.strip_prefix("step-")?
        .split(['-', '.'])
        .next()?
        .parse()
        .ok()
}

fn classify_connector(connector: ConnectorDir, rest: &[&str]) -> OverlayTarget {
    match rest {
        [file] if *file == CONNECTOR_FILE => match connector {
            ConnectorDir::Source => OverlayTarget::SourceConnector,
            ConnectorDir::Destination(slug) => OverlayTarget::DestinationConnector(slug),
        },
        [kind_dir, file] if file.ends_with(".js") => match StepKind::from_dir_name(kind_dir) {
            Some(kind) => OverlayTarget::Step {
                connector,
                kind,
                sequence: sequence_from_file_name(file),
            },
            None => OverlayTarget::Unrecognized,
        },
        _ => OverlayTarget::Unrecognized,
    }
}

/// Map a path relative to the channel directory to its overlay target.
pub fn classify(path: &str) -> OverlayTarget {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [file] if *file == CHANNEL_FILE => OverlayTarget::Metadata,
        [file] if *file == SNAPSHOT_FILE => OverlayTarget::Ignored,
        ["source", rest @ ..] => classify_connector(ConnectorDir::Source, rest),
        ["destinations", slug, rest @ ..] => {
            classify_connector(ConnectorDir::Destination(slug.to_string()), rest)
        }
        ["scripts", file] => file
            .strip_suffix(".js")
            .and_then(ScriptSlot::from_name)
            .map(OverlayTarget::ChannelScript)
            .unwrap_or(OverlayTarget::Unrecognized),
        _ => OverlayTarget::Unrecognized,
    }
}

fn parse_yaml<T: serde::de::DeserializeOwned>(path: &str, content: &str) -> Result<T> {
    serde_yaml::from_str(content).map_err(|e| Error::InvalidFile {
        path: path.to_string(),
        message: e.to_string(),
    })
}

fn outcome(changed: bool) -> OverlayOutcome {
    if changed {
        OverlayOutcome::Applied
    } else {
        OverlayOutcome::Unchanged
    }
}

fn overlay_connector(connector: &mut Connector, file: ConnectorFile) -> bool {
    let changed =
        connector.transport_type != file.transport_type || connector.properties != file.properties;
    connector.transport_type = file.transport_type;
    connector.properties = file.properties;
    changed
}

/// Apply one file to `channel`.
///
/// `slugs` are the destination directory slugs computed before any overlay,
/// so renaming a destination does not break the lookup of its steps.
pub fn apply(
    channel: &mut DecomposedChannel,
    slugs: &[String],
    target: &OverlayTarget,
    path: &str,
    content: &str,
) -> Result<OverlayOutcome> {
    let destination_index = |slug: &str| slugs.iter().position(|s| s == slug);

    match target {
        OverlayTarget::Metadata => {
            let metadata: ChannelMetadata = parse_yaml(path, content)?;
            let changed = channel.metadata != metadata;
            channel.metadata = metadata;
            Ok(outcome(changed))
        }
        OverlayTarget::SourceConnector => {
            let file: ConnectorFile = parse_yaml(path, content)?;
            Ok(outcome(overlay_connector(&mut channel.source, file)))
        }
        OverlayTarget::DestinationConnector(slug) => {
            let Some(index) = destination_index(slug) else {
                return Ok(OverlayOutcome::NotFound(format!(
                    "no destination with directory '{}'",
                    slug
                )));
            };
            let mut file: ConnectorFile = parse_yaml(path, content)?;
            let destination = &mut channel.destinations[index];
            let mut changed = false;
            if let Some(name) = file.name.take()
                && !name.is_empty()
                && name != destination.name
            {
                destination.name = name;
                changed = true;
            }
            changed |= overlay_connector(&mut destination.connector, file);
            Ok(outcome(changed))
        }
        OverlayTarget::Step {
            connector,
            kind,
            sequence,
        } => {
            let (marker, body) = match read_marker(SEQUENCE_MARKER, content) {
                Some((value, body)) => (value.parse::<u32>().ok(), body),
                None => (None, content),
            };
            let Some(sequence) = marker.or(*sequence) else {
                return Ok(OverlayOutcome::NotFound(
                    "no sequence marker or step number".to_string(),
                ));
            };

            let target_connector = match connector {
                ConnectorDir::Source => Some(&mut channel.source),
                ConnectorDir::Destination(slug) => {
                    destination_index(slug).map(|index| &mut channel.destinations[index].connector)
                }
            };
            let Some(target_connector) = target_connector else {
                return Ok(OverlayOutcome::NotFound("connector not found".to_string()));
            };
            let Some(step) = target_connector
                .step_list_mut(*kind)
                .and_then(|list| list.find_mut(sequence))
            else {
                return Ok(OverlayOutcome::NotFound(format!(
                    "no {} step with sequence {}",
                    kind.dir_name(),
                    sequence
                )));
            };
            let changed = step.script != body;
            step.script = body.to_string();
            Ok(outcome(changed))
        }
        OverlayTarget::ChannelScript(slot) => {
            let previous = channel.scripts.insert(*slot, content.to_string());
            Ok(outcome(previous.as_deref() != Some(content)))
        }
        OverlayTarget::Ignored => Ok(OverlayOutcome::Unchanged),
        OverlayTarget::Unrecognized => Ok(OverlayOutcome::NotFound(
            "not part of the channel layout".to_string(),
        )),
    }
}

/// Overlay every file of a channel directory onto `channel`.
pub fn overlay_directory(channel: &mut DecomposedChannel, dir: &NormalizedPath) -> Result<OverlayReport> {
    let slugs = destination_slugs(channel);
    let files = io::list_files(dir)?;
    let mut report = OverlayReport::default();

    // Descriptors before scripts.
    let mut ordered: Vec<(&String, OverlayTarget)> =
        files.iter().map(|path| (path, classify(path))).collect();
    ordered.sort_by_key(|(_, target)| {
        !matches!(
            target,
            OverlayTarget::Metadata
                | OverlayTarget::SourceConnector
                | OverlayTarget::DestinationConnector(_)
        )
    });

    for (path, target) in &ordered {
        if matches!(target, OverlayTarget::Ignored) {
            continue;
        }
        let content = io::read_text(&dir.join(path))?;
        match apply(channel, &slugs, target, path, &content)? {
            OverlayOutcome::Applied => {
                debug!(path = %path, "Overlaid edited file");
                report.applied.push(path.to_string());
            }
            OverlayOutcome::Unchanged => {}
            OverlayOutcome::NotFound(reason) => {
                report.not_found.push((path.to_string(), reason));
            }
        }
    }

    let present: Vec<ScriptSlot> = ordered
        .iter()
        .filter_map(|(_, target)| match target {
            OverlayTarget::ChannelScript(slot) => Some(*slot),
            _ => None,
        })
        .collect();
    channel.scripts.retain(|slot, body| {
        let keep = body.is_empty() || present.contains(slot);
        if !keep {
            report.removed.push(format!("scripts/{}.js", slot));
        }
        keep
    });

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("channel.yaml", OverlayTarget::Metadata)]
    #[case("_snapshot.raw", OverlayTarget::Ignored)]
    #[case("source/connector.yaml", OverlayTarget::SourceConnector)]
    #[case(
        "destinations/archive/connector.yaml",
        OverlayTarget::DestinationConnector("archive".into())
    )]
    #[case(
        "source/transformer/step-2-map-pid.js",
        OverlayTarget::Step { connector: ConnectorDir::Source, kind: StepKind::Transformer, sequence: Some(2) }
    )]
    #[case(
        "destinations/archive/response-transformer/step-0-ack.js",
        OverlayTarget::Step {
            connector: ConnectorDir::Destination("archive".into()),
            kind: StepKind::ResponseTransformer,
            sequence: Some(0),
        }
    )]
    #[case(
        "source/filter/custom.js",
        OverlayTarget::Step { connector: ConnectorDir::Source, kind: StepKind::Filter, sequence: None }
    )]
    #[case("scripts/deploy.js", OverlayTarget::ChannelScript(ScriptSlot::Deploy))]
    #[case("scripts/other.js", OverlayTarget::Unrecognized)]
    #[case("source/unknown/step-1.js", OverlayTarget::Unrecognized)]
    #[case("README.md", OverlayTarget::Unrecognized)]
    fn classifies_paths(#[case] path: &str, #[case] expected: OverlayTarget) {
        assert_eq!(classify(path), expected);
    }

    fn channel() -> DecomposedChannel {
        use chsync_model::{Destination, Step, StepList};

        let mut channel = DecomposedChannel::default();
        channel.metadata.name = "ADT Receiver".into();
        channel.destinations.push(Destination {
            name: "Archive".into(),
            connector: Connector {
                transport_type: "File Writer".into(),
                transformer: Some(StepList {
                    steps: vec![Step {
                        sequence: 3,
                        name: "Stamp".into(),
                        script: "stamp();".into(),
                    }],
                }),
                ..Default::default()
            },
        });
        channel
    }

    #[test]
    fn destination_rename_keeps_step_lookup() {
        let mut channel = channel();
        let slugs = destination_slugs(&channel);

        let renamed = apply(
            &mut channel,
            &slugs,
            &classify("destinations/archive/connector.yaml"),
            "destinations/archive/connector.yaml",
            "name: Cold Archive\ntransportType: File Writer\n",
        )
        .unwrap();
        assert_eq!(renamed, OverlayOutcome::Applied);
        assert_eq!(channel.destinations[0].name, "Cold Archive");

        let path = "destinations/archive/transformer/step-3-stamp.js";
        let step = apply(&mut channel, &slugs, &classify(path), path, "// @sequence 3\nstamp(2);").unwrap();
        assert_eq!(step, OverlayOutcome::Applied);
        let steps = &channel.destinations[0].connector.transformer.as_ref().unwrap().steps;
        assert_eq!(steps[0].script, "stamp(2);");
    }

    #[test]
    fn missing_destination_is_not_found() {
        let mut channel = channel();
        let slugs = destination_slugs(&channel);
        let path = "destinations/gone/connector.yaml";
        let outcome = apply(&mut channel, &slugs, &classify(path), path, "transportType: x\n").unwrap();
        assert!(matches!(outcome, OverlayOutcome::NotFound(reason) if reason.contains("gone")));
    }

    #[test]
    fn file_name_sequence_used_without_marker() {
        let mut channel = channel();
        let slugs = destination_slugs(&channel);
        let path = "destinations/archive/transformer/step-3-stamp.js";
        let same = apply(&mut channel, &slugs, &classify(path), path, "stamp();").unwrap();
        assert_eq!(same, OverlayOutcome::Unchanged);
    }

    #[test]
    fn sequence_parses_from_file_name() {
        assert_eq!(sequence_from_file_name("step-12-map.js"), Some(12));
        assert_eq!(sequence_from_file_name("step-3.js"), Some(3));
        assert_eq!(sequence_from_file_name("custom.js"), None);
    }
}
