use std::collections::BTreeMap;

use chsync_delta::{DetectOptions, LibraryRef, detect, format_for_cli};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn paths(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn util_lib() -> LibraryRef {
    LibraryRef {
        name: "util-lib".into(),
        enabled_channel_ids: vec!["ch-1".into(), "ch-2".into()],
    }
}

#[test]
fn empty_input_has_no_changes() {
    let result = detect(&[], &DetectOptions::default());
    assert_eq!(result.total_affected, 0);
    assert_eq!(result.summary, "No changes");
    assert_eq!(format_for_cli(&result), "Delta: No changes\n");
}

#[test]
fn channel_files_group_into_one_entry_per_channel() {
    let result = detect(
        &paths(&[
            "channels/adt-receiver/source/connector.yaml",
            "channels/adt-receiver/destinations/dest-1/transformer/step-0-map.js",
            "channels/adt-receiver/source/transformer/step-1-pid.js",
            "channels/lab-results/scripts/deploy.js",
        ]),
        &DetectOptions::default(),
    );

    assert_eq!(result.changed_channels.len(), 2);
    let adt = &result.changed_channels[0];
    assert_eq!(adt.channel_name, "adt-receiver");
    assert_eq!(adt.changed_files.len(), 3);
    assert_eq!(adt.sections, vec!["destinations/dest-1", "source"]);
    assert_eq!(result.changed_channels[1].sections, vec!["scripts"]);
    assert_eq!(result.summary, "2 channels");
}

#[test]
fn library_change_cascades_enabled_channels() {
    let options = DetectOptions {
        code_template_libraries: Some(vec![util_lib()]),
        ..Default::default()
    };
    let result = detect(&paths(&["code-templates/util-lib/library.yaml"]), &options);

    let cascaded: Vec<_> = result
        .cascaded_channels
        .iter()
        .map(|c| (c.channel_name.as_str(), c.reason.as_str()))
        .collect();
    assert_eq!(
        cascaded,
        vec![
            ("ch-1", "Uses modified code template library 'util-lib'"),
            ("ch-2", "Uses modified code template library 'util-lib'"),
        ]
    );
    assert_eq!(result.total_affected, 2);
}

#[test]
fn cascade_names_resolve_through_id_map() {
    let mut names = BTreeMap::new();
    names.insert("ch-1".to_string(), "ADT Receiver".to_string());
    let options = DetectOptions {
        code_template_libraries: Some(vec![util_lib()]),
        channel_id_to_name: Some(names),
        ..Default::default()
    };
    let result = detect(&paths(&["code-templates/util-lib/format.js"]), &options);

    assert_eq!(result.cascaded_channels[0].channel_name, "ADT Receiver");
    assert_eq!(result.cascaded_channels[0].channel_id.as_deref(), Some("ch-1"));
    assert_eq!(result.cascaded_channels[1].channel_name, "ch-2");
    assert_eq!(
        result.changed_code_templates[0].template_name.as_deref(),
        Some("format")
    );
}

#[test]
fn channel_cascaded_by_two_libraries_appears_once() {
    let options = DetectOptions {
        code_template_libraries: Some(vec![
            util_lib(),
            LibraryRef {
                name: "hl7-lib".into(),
                enabled_channel_ids: vec!["ch-2".into(), "ch-3".into()],
            },
        ]),
        ..Default::default()
    };
    let result = detect(
        &paths(&[
            "code-templates/util-lib/library.yaml",
            "code-templates/hl7-lib/parse.js",
        ]),
        &options,
    );
    let names: Vec<_> = result
        .cascaded_channels
        .iter()
        .map(|c| c.channel_name.as_str())
        .collect();
    assert_eq!(names, vec!["ch-1", "ch-2", "ch-3"]);
}

#[test]
fn direct_changes_are_excluded_from_cascades() {
    let options = DetectOptions {
        code_template_libraries: Some(vec![util_lib()]),
        ..Default::default()
    };
    let result = detect(
        &paths(&[
            "code-templates/util-lib/library.yaml",
            "channels/ch-1/channel.yaml",
        ]),
        &options,
    );
    assert_eq!(result.changed_channels[0].channel_name, "ch-1");
    assert_eq!(result.cascaded_channels.len(), 1);
    assert_eq!(result.cascaded_channels[0].channel_name, "ch-2");
}

#[test]
fn environment_change_cascades_all_channels() {
    let options = DetectOptions {
        all_channel_names: Some(vec!["adt-receiver".into(), "lab-results".into()]),
        ..Default::default()
    };
    let result = detect(
        &paths(&[
            "environments/staging.yaml",
            "channels/lab-results/channel.yaml",
        ]),
        &options,
    );
    assert!(result.changed_config.is_empty());
    assert_eq!(result.cascaded_channels.len(), 1);
    assert_eq!(result.cascaded_channels[0].channel_name, "adt-receiver");
    assert_eq!(result.cascaded_channels[0].reason, "Environment config changed");
}

#[test]
fn cascades_can_be_disabled() {
    let options = DetectOptions {
        include_cascades: false,
        code_template_libraries: Some(vec![util_lib()]),
        ..Default::default()
    };
    let result = detect(&paths(&["code-templates/util-lib/library.yaml"]), &options);
    assert!(result.cascaded_channels.is_empty());
    assert_eq!(result.summary, "1 code template");
}

#[test]
fn config_files_are_listed_verbatim() {
    let result = detect(
        &paths(&["config/config.yaml", "config/config.yaml", "README.md"]),
        &DetectOptions::default(),
    );
    assert_eq!(result.changed_config.len(), 1);
    assert_eq!(result.changed_config[0].file, "config/config.yaml");
    assert_eq!(result.summary, "1 config file");
}

#[test]
fn cli_report_sections() {
    let options = DetectOptions {
        code_template_libraries: Some(vec![util_lib()]),
        ..Default::default()
    };
    let result = detect(
        &paths(&[
            "channels/adt-receiver/source/connector.yaml",
            "code-templates/util-lib/library.yaml",
            "config/config.yaml",
        ]),
        &options,
    );
    let text = format_for_cli(&result);
    assert!(text.starts_with("Delta: 3 channels, 1 code template, 1 config file\n"));
    assert!(text.contains("Changed:\n  ~ adt-receiver (source)\n"));
    assert!(text.contains("Cascaded:\n  -> ch-1 (Uses modified code template library 'util-lib')\n"));
    assert!(text.contains("Config:\n  ~ config/config.yaml\n"));
}

#[test]
fn json_shape_uses_camel_case() {
    let result = detect(
        &paths(&["channels/a/scripts/deploy.js"]),
        &DetectOptions::default(),
    );
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["changedChannels"][0]["channelName"], "a");
    assert_eq!(json["totalAffected"], 1);
}

proptest! {
    #[test]
    fn cascades_never_repeat_or_overlap_direct_changes(
        direct in prop::collection::vec("ch-[0-9]", 0..4),
        lib_a in prop::collection::vec("ch-[0-9]", 0..6),
        lib_b in prop::collection::vec("ch-[0-9]", 0..6),
    ) {
        let mut changed: Vec<String> = direct
            .iter()
            .map(|c| format!("channels/{}/channel.yaml", c))
            .collect();
        changed.push("code-templates/a/library.yaml".into());
        changed.push("code-templates/b/library.yaml".into());
        let options = DetectOptions {
            code_template_libraries: Some(vec![
                LibraryRef { name: "a".into(), enabled_channel_ids: lib_a },
                LibraryRef { name: "b".into(), enabled_channel_ids: lib_b },
            ]),
            ..Default::default()
        };

        let result = detect(&changed, &options);
        let mut seen = std::collections::HashSet::new();
        for cascaded in &result.cascaded_channels {
            prop_assert!(seen.insert(cascaded.channel_name.clone()));
            prop_assert!(!direct.contains(&cascaded.channel_name));
        }
        prop_assert_eq!(
            result.total_affected,
            result.changed_channels.len() + result.cascaded_channels.len()
        );
    }
}
