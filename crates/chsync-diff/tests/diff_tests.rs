use chsync_diff::{ChangeKind, DiffOptions, diff, diff_objects, format_for_cli};
use chsync_model::{
    ChannelMetadata, Connector, DecomposedChannel, Destination, FlatChannel, Mapping, ScriptSlot,
    Step, StepList, Value,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn props(pairs: &[(&str, Value)]) -> Mapping {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn channel() -> DecomposedChannel {
    let mut channel = DecomposedChannel {
        metadata: ChannelMetadata {
            id: "ch-1".into(),
            name: "ADT Receiver".into(),
            description: "Inbound ADT feed".into(),
            enabled: true,
            revision: Some(3),
        },
        ..Default::default()
    };
    channel.scripts.insert(ScriptSlot::Deploy, "init();".into());
    channel.source = Connector {
        transport_type: "TCP Listener".into(),
        properties: props(&[
            ("port", Value::from(6661i64)),
            ("host", Value::from("0.0.0.0")),
        ]),
        transformer: Some(StepList {
            steps: vec![Step {
                sequence: 0,
                name: "Map PID".into(),
                script: "var pid = msg['PID'];\nlogger.info(pid);\nreturn pid;".into(),
            }],
        }),
        ..Default::default()
    };
    channel.destinations.push(Destination {
        name: "Archive".into(),
        connector: Connector {
            transport_type: "File Writer".into(),
            properties: props(&[("directory", Value::from("/var/archive"))]),
            ..Default::default()
        },
    });
    channel
}

#[test]
fn identical_channels_have_no_changes() {
    let flat = FlatChannel::from(&channel());
    let result = diff(&flat, &flat, &DiffOptions::default());

    assert_eq!(result.change_count, 0);
    assert_eq!(result.summary, "no changes");
    assert_eq!(result.channel_name, "ADT Receiver");
}

#[test]
fn port_change_is_reported_under_source_connector() {
    let old = channel();
    let mut new = channel();
    new.source
        .properties
        .insert("port".into(), Value::from(6662i64));

    let result = diff(
        &FlatChannel::from(&old),
        &FlatChannel::from(&new),
        &DiffOptions::default(),
    );

    assert_eq!(result.change_count, 1);
    let change = &result.config_changes[0];
    assert_eq!(change.path, "source.connector.port");
    assert_eq!(change.kind, ChangeKind::Changed);
    assert_eq!(change.old_value, Some(Value::from(6661i64)));
    assert_eq!(change.new_value, Some(Value::from(6662i64)));
    assert_eq!(result.summary, "1 config change");
}

#[test]
fn edited_step_script_carries_unified_diff() {
    let old = channel();
    let mut new = channel();
    new.source.transformer.as_mut().unwrap().steps[0].script =
        "var pid = msg['PID'];\nlogger.debug(pid);\nreturn pid;".into();

    let result = diff(
        &FlatChannel::from(&old),
        &FlatChannel::from(&new),
        &DiffOptions::default(),
    );

    assert_eq!(result.script_changes.len(), 1);
    let script = &result.script_changes[0];
    assert_eq!(script.path, "source/transformer/step-0-map-pid.js");
    assert_eq!(script.kind, ChangeKind::Changed);
    let text = script.unified_diff.as_deref().unwrap();
    assert!(text.contains("-logger.info(pid);"));
    assert!(text.contains("+logger.debug(pid);"));
    assert_eq!(result.summary, "1 script change");
}

#[test]
fn channel_scripts_added_and_removed() {
    let old = channel();
    let mut new = channel();
    new.scripts.remove(&ScriptSlot::Deploy);
    new.scripts
        .insert(ScriptSlot::Undeploy, "cleanup();".into());

    let result = diff(
        &FlatChannel::from(&old),
        &FlatChannel::from(&new),
        &DiffOptions::default(),
    );

    let kinds: Vec<_> = result
        .script_changes
        .iter()
        .map(|s| (s.path.as_str(), s.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("scripts/deploy.js", ChangeKind::Removed),
            ("scripts/undeploy.js", ChangeKind::Added),
        ]
    );
}

#[test]
fn whole_destination_added_is_one_change() {
    let old = channel();
    let mut new = channel();
    new.destinations.push(Destination {
        name: "Audit".into(),
        connector: Connector {
            transport_type: "Database Writer".into(),
            properties: props(&[("url", Value::from("jdbc:postgresql://db/audit"))]),
            filter: Some(StepList {
                steps: vec![Step {
                    sequence: 0,
                    name: "Only ADT".into(),
                    script: "return true;".into(),
                }],
            }),
            ..Default::default()
        },
    });

    let result = diff(
        &FlatChannel::from(&old),
        &FlatChannel::from(&new),
        &DiffOptions::default(),
    );

    assert_eq!(result.change_count, 1);
    assert_eq!(result.config_changes[0].path, "destinations.Audit");
    assert_eq!(result.config_changes[0].kind, ChangeKind::Added);
    assert!(result.script_changes.is_empty());
}

#[test]
fn destination_property_change_uses_destination_prefix() {
    let old = channel();
    let mut new = channel();
    new.destinations[0]
        .connector
        .properties
        .insert("directory".into(), Value::from("/srv/archive"));

    let result = diff(
        &FlatChannel::from(&old),
        &FlatChannel::from(&new),
        &DiffOptions::default(),
    );

    assert_eq!(
        result.config_changes[0].path,
        "destinations.Archive.connector.directory"
    );
}

#[test]
fn ignore_whitespace_suppresses_formatting_only_edits() {
    let old = channel();
    let mut new = channel();
    new.metadata.description = "Inbound   ADT\tfeed".into();
    new.source.transformer.as_mut().unwrap().steps[0].script =
        "var pid =  msg['PID'];\nlogger.info(pid);\nreturn  pid;".into();

    let strict = diff(
        &FlatChannel::from(&old),
        &FlatChannel::from(&new),
        &DiffOptions::default(),
    );
    assert_eq!(strict.change_count, 2);

    let relaxed = diff(
        &FlatChannel::from(&old),
        &FlatChannel::from(&new),
        &DiffOptions {
            ignore_whitespace: true,
            ..Default::default()
        },
    );
    assert_eq!(relaxed.change_count, 0);
}

#[rstest]
#[case::strict(false)]
#[case::ignoring_whitespace(true)]
fn mixed_edit_diff_shows_original_spacing(#[case] ignore_whitespace: bool) {
    let old = channel();
    let mut new = channel();
    new.source.transformer.as_mut().unwrap().steps[0].script =
        "var pid =  msg['PID'];\nlogger.warn(pid);\nreturn pid;".into();

    let result = diff(
        &FlatChannel::from(&old),
        &FlatChannel::from(&new),
        &DiffOptions {
            ignore_whitespace,
            ..Default::default()
        },
    );

    assert_eq!(result.change_count, 1);
    let text = result.script_changes[0].unified_diff.as_deref().unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines.contains(&"-var pid = msg['PID'];"));
    assert!(lines.contains(&"+var pid =  msg['PID'];"));
    assert!(lines.contains(&"+logger.warn(pid);"));
    assert!(lines.contains(&" return pid;"));
}

#[test]
fn metadata_changes_are_prefixed() {
    let old = channel();
    let mut new = channel();
    new.metadata.enabled = false;

    let result = diff(
        &FlatChannel::from(&old),
        &FlatChannel::from(&new),
        &DiffOptions::default(),
    );
    assert_eq!(result.config_changes[0].path, "metadata.enabled");
}

#[test]
fn summary_counts_both_kinds() {
    let old = channel();
    let mut new = channel();
    new.metadata.description = "Outbound".into();
    new.source
        .properties
        .insert("port".into(), Value::from(7000i64));
    new.scripts.insert(ScriptSlot::Deploy, "start();".into());

    let result = diff(
        &FlatChannel::from(&old),
        &FlatChannel::from(&new),
        &DiffOptions::default(),
    );
    assert_eq!(result.summary, "2 config changes, 1 script change");
    assert_eq!(result.change_count, 3);
}

#[test]
fn cli_report_includes_header_and_script_block() {
    let old = channel();
    let mut new = channel();
    new.scripts.insert(ScriptSlot::Deploy, "start();".into());

    let result = diff(
        &FlatChannel::from(&old),
        &FlatChannel::from(&new),
        &DiffOptions::default(),
    );
    let text = format_for_cli(&result);
    assert!(text.starts_with("Channel 'ADT Receiver': 1 change\n"));
    assert!(text.contains("--- scripts/deploy.js ---\n"));
    assert!(text.contains("-init();\n+start();\n"));
}

#[test]
fn diff_objects_scenario_single_port_change() {
    let old = Value::Mapping(props(&[
        ("port", Value::from(6661i64)),
        ("host", Value::from("l")),
    ]));
    let new = Value::Mapping(props(&[
        ("port", Value::from(6662i64)),
        ("host", Value::from("l")),
    ]));

    let changes = diff_objects(&old, &new, "");
    assert_eq!(changes.len(), 1);
    let json = serde_json::to_value(&changes[0]).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"path": "port", "type": "changed", "oldValue": 6661, "newValue": 6662})
    );
}
