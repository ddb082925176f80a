//! Push -> edit -> pull round trips against real git repositories.
//!
//! Two working copies share a bare remote, the way two engineers would.

use std::path::Path;

use chsync_core::{
    ChannelDocument, JsonChannelCodec, PullOptions, PushOptions, PushRequest, RepositoryMetadata,
    SyncConfig, SyncEngine,
};
use chsync_fs::NormalizedPath;
use chsync_git::GitClient;
use chsync_test_utils::fixtures::{ADT_RECEIVER, LAB_RESULTS, util_lib};
use chsync_test_utils::git::{add_remote, bare_remote, commit_count};
use chsync_test_utils::repo::TestRepo;
use chsync_vars::ProcessEnv;
use pretty_assertions::assert_eq;
use serde_json::Value as Json;
use tempfile::TempDir;

type Engine = SyncEngine<JsonChannelCodec, GitClient>;

const STEP: &str = "channels/adt-receiver/source/transformer/step-0-map-pid.js";

fn engine_at(root: &Path) -> Engine {
    SyncEngine::new(
        NormalizedPath::new(root),
        JsonChannelCodec::new(),
        GitClient::new(root),
        SyncConfig::default(),
    )
}

fn exports() -> PushRequest {
    PushRequest {
        documents: vec![
            ChannelDocument::new("adt-receiver.json", ADT_RECEIVER),
            ChannelDocument::new("lab-results.json", LAB_RESULTS),
        ],
        libraries: vec![util_lib()],
    }
}

fn offline() -> PullOptions {
    PullOptions {
        process_env: ProcessEnv::Disabled,
        ..PullOptions::default()
    }
}

fn branch_of(root: &Path) -> String {
    let repo = git2::Repository::open(root).unwrap();
    let head = repo.head().unwrap();
    head.shorthand().unwrap().to_string()
}

fn document(report: &chsync_core::PullReport, slug: &str) -> Json {
    let channel = report
        .channels
        .iter()
        .find(|c| c.slug == slug)
        .unwrap_or_else(|| panic!("channel {slug} not pulled"));
    serde_json::from_str(&channel.document).unwrap()
}

#[tokio::test]
async fn edits_travel_through_a_shared_remote() {
    let remote_dir = TempDir::new().unwrap();
    let bare = bare_remote(remote_dir.path());
    let remote_url = remote_dir.path().to_str().unwrap().to_string();

    // First working copy exports and publishes.
    let alice = TestRepo::with_git();
    add_remote(alice.root(), "origin", &remote_url);
    let alice_engine = engine_at(alice.root());
    alice_engine.init(&RepositoryMetadata::default()).unwrap();

    let publish = PushOptions {
        push_remote: true,
        ..PushOptions::default()
    };
    let report = alice_engine.push(&exports(), &publish).unwrap();
    assert!(report.pushed, "push failed: {:?}", report.vcs_error);
    assert_eq!(report.channels.len(), 2);

    let branch = branch_of(alice.root());
    bare.set_head(&format!("refs/heads/{branch}")).unwrap();

    // Second working copy clones and rebuilds the exports.
    let bob_dir = TempDir::new().unwrap();
    git2::Repository::clone(&remote_url, bob_dir.path()).unwrap();
    let bob_engine = engine_at(bob_dir.path());

    let first = bob_engine.pull(&offline()).await.unwrap();
    assert!(first.is_success(), "{:?}", first.errors);
    assert_eq!(first.libraries.len(), 1);
    let adt = document(&first, "adt-receiver");
    assert_eq!(
        adt["sourceConnector"]["properties"]["password"],
        "${ADT_RECEIVER_SOURCE_PASSWORD}"
    );
    assert_eq!(adt["exportData"]["metadata"]["pruningSettings"]["archiveEnabled"], true);

    // The first copy edits a step in the tree, rebuilds and republishes.
    let step = alice.read(STEP);
    alice.write(STEP, &step.replace("var pid", "var patient"));
    let rebuilt = alice_engine.pull(&offline()).await.unwrap();
    let adt_doc = rebuilt
        .channels
        .iter()
        .find(|c| c.slug == "adt-receiver")
        .unwrap()
        .document
        .clone();
    let republish = PushRequest {
        documents: vec![ChannelDocument::new("adt-receiver.json", adt_doc)],
        libraries: Vec::new(),
    };
    let report = alice_engine.push(&republish, &publish).unwrap();
    assert!(report.pushed, "push failed: {:?}", report.vcs_error);
    assert_eq!(commit_count(alice.root()), 2);

    // The second copy fast-forwards and sees the edit.
    let update = PullOptions {
        update_from_remote: true,
        ..offline()
    };
    let second = bob_engine.pull(&update).await.unwrap();
    assert!(second.is_success(), "{:?}", second.errors);
    assert_eq!(commit_count(bob_dir.path()), 2);
    let adt = document(&second, "adt-receiver");
    let script = adt["sourceConnector"]["transformer"]["steps"][0]["script"]
        .as_str()
        .unwrap();
    assert!(script.starts_with("var patient = msg['PID'];"));

    let delta = bob_engine.delta("HEAD~1", Some("HEAD"), true).unwrap();
    let changed = &delta.changed_channels[0];
    assert_eq!(changed.channel_name, "adt-receiver");
    assert!(changed.changed_files.contains(&STEP.to_string()));
    assert!(delta.changed_channels.iter().all(|c| c.channel_name != "lab-results"));
}

#[tokio::test]
async fn republishing_a_pulled_document_only_touches_resolved_fields() {
    let repo = TestRepo::with_git();
    let engine = engine_at(repo.root());
    engine.init(&RepositoryMetadata::default()).unwrap();
    engine.push(&exports(), &PushOptions::default()).unwrap();

    let pulled = engine.pull(&offline()).await.unwrap();
    let adt = pulled
        .channels
        .iter()
        .find(|c| c.slug == "adt-receiver")
        .unwrap();
    // Only the inline default resolves with the process environment disabled.
    let doc: Json = serde_json::from_str(&adt.document).unwrap();
    assert_eq!(doc["destinationConnectors"][0]["properties"]["host"], "sftp.local");
    assert_eq!(doc["destinationConnectors"][1]["properties"]["url"], "${LAB_URL}");

    let request = PushRequest {
        documents: vec![ChannelDocument::new("adt-receiver.json", adt.document.clone())],
        libraries: Vec::new(),
    };
    let report = engine.push(&request, &PushOptions::default()).unwrap();
    assert!(report.channels[0].masked.is_empty());
    assert_eq!(commit_count(repo.root()), 2);

    let delta = engine.delta("HEAD~1", Some("HEAD"), false).unwrap();
    assert_eq!(delta.changed_channels.len(), 1);
    let files = &delta.changed_channels[0].changed_files;
    assert!(files.contains(&"channels/adt-receiver/destinations/archive/connector.yaml".to_string()));
    assert!(!files.contains(&"channels/adt-receiver/source/connector.yaml".to_string()));
    assert!(!files.iter().any(|f| f.ends_with(".js")));
    repo.assert_file_contains(
        "channels/adt-receiver/destinations/archive/connector.yaml",
        "sftp.local",
    );
}
