//! End-to-end tests that run the compiled `chsync` binary.

use std::path::Path;

use assert_cmd::Command;
use chsync_test_utils::fixtures::fixture_path;
use chsync_test_utils::repo::TestRepo;
use predicates::prelude::*;

fn chsync(root: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("chsync"));
    cmd.current_dir(root).env_remove("RUST_LOG").env("NO_COLOR", "1");
    cmd
}

/// An initialized repository with the ADT Receiver channel and the util
/// library pushed.
fn pushed_repo() -> TestRepo {
    let repo = TestRepo::with_git();
    chsync(repo.root()).arg("init").assert().success();
    chsync(repo.root())
        .arg("push")
        .arg(fixture_path("channels/adt-receiver.json"))
        .arg("--library")
        .arg(fixture_path("code-templates/util-lib.json"))
        .assert()
        .success();
    repo
}

#[test]
fn help_lists_commands() {
    let repo = TestRepo::new();
    chsync(repo.root())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("push"))
        .stdout(predicate::str::contains("pull"))
        .stdout(predicate::str::contains("delta"));
}

#[test]
fn init_writes_layout() {
    let repo = TestRepo::new();
    chsync(repo.root())
        .args(["init", "--engine", "mirth", "--engine-version", "4.5.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("repository.yaml"));

    repo.assert_file_contains("repository.yaml", "engine: mirth");
    repo.assert_file_exists(".chsync/config.toml");
    repo.assert_file_contains(".gitignore", ".chsync/config.local.toml");
}

#[test]
fn push_without_init_fails() {
    let repo = TestRepo::new();
    chsync(repo.root())
        .arg("push")
        .arg(fixture_path("channels/adt-receiver.json"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error:"))
        .stderr(predicate::str::contains("chsync init"));
}

#[test]
fn push_masks_credentials_and_commits() {
    let repo = pushed_repo();

    repo.assert_file_exists("channels/adt-receiver/channel.yaml");
    repo.assert_file_exists("code-templates/util-lib/library.yaml");
    repo.assert_file_not_contains("channels/adt-receiver/source/connector.yaml", "s3cret");
    repo.assert_file_not_contains("channels/adt-receiver/_snapshot.raw", "s3cret");
    repo.assert_file_contains(
        "channels/adt-receiver/source/connector.yaml",
        "${ADT_RECEIVER_SOURCE_PASSWORD}",
    );
    assert_eq!(chsync_test_utils::git::commit_count(repo.root()), 1);
}

#[test]
fn push_json_report_has_no_secret_values() {
    let repo = TestRepo::with_git();
    chsync(repo.root()).arg("init").assert().success();
    let output = chsync(repo.root())
        .arg("push")
        .arg(fixture_path("channels/adt-receiver.json"))
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["channels"][0]["slug"], "adt-receiver");
    assert!(!stdout.contains("s3cret"));
    assert!(!stdout.contains("arch1ve"));
    assert!(!stdout.contains("k-123"));
}

#[test]
fn push_no_mask_keeps_values() {
    let repo = TestRepo::with_git();
    chsync(repo.root()).arg("init").assert().success();
    chsync(repo.root())
        .arg("push")
        .arg(fixture_path("channels/adt-receiver.json"))
        .arg("--no-mask")
        .assert()
        .success();

    repo.assert_file_contains("channels/adt-receiver/source/connector.yaml", "s3cret");
}

#[test]
fn pull_writes_resolved_documents() {
    let repo = pushed_repo();
    repo.write("environments/base.yaml", "LAB_URL: https://lab.local/api\n");

    chsync(repo.root())
        .args(["pull", "--out", "out"])
        .env("ARCHIVE_HOST", "files.prod")
        .assert()
        .success()
        .stdout(predicate::str::contains("ADT Receiver"));

    repo.assert_file_contains("out/adt-receiver.json", "https://lab.local/api");
    repo.assert_file_contains("out/adt-receiver.json", "files.prod");
    repo.assert_file_exists("out/code-templates/util-lib.json");
}

#[test]
fn pull_strict_fails_on_unresolved() {
    let repo = pushed_repo();

    chsync(repo.root())
        .args(["pull", "--strict"])
        .env_remove("LAB_URL")
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not be pulled"));
}

#[test]
fn pull_unknown_environment_fails() {
    let repo = pushed_repo();
    chsync(repo.root())
        .args(["pull", "--env", "nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nowhere"));
}

#[test]
fn pull_rejects_malformed_variable() {
    let repo = pushed_repo();
    chsync(repo.root())
        .args(["pull", "--var", "NOEQUALS"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected NAME=VALUE"));
}

#[test]
fn commands_find_root_from_subdirectory() {
    let repo = pushed_repo();
    chsync(&repo.path("channels/adt-receiver/source"))
        .args(["delta", "channels/adt-receiver/source/connector.yaml", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("adt-receiver"));
}

#[test]
fn delta_cascades_library_changes() {
    let repo = pushed_repo();
    chsync(repo.root())
        .args(["delta", "code-templates/util-lib/formatdate.js", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ADT Receiver"));

    chsync(repo.root())
        .args(["delta", "code-templates/util-lib/formatdate.js", "--no-cascade", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ADT Receiver").not());
}

#[test]
fn delta_text_output_has_one_headline() {
    let repo = pushed_repo();
    let output = chsync(repo.root())
        .args(["delta", "code-templates/util-lib/formatdate.js"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.matches("Delta").count(), 1);
    assert!(stdout.starts_with("Delta: "));
}

#[test]
fn delta_against_head_sees_working_tree_edits() {
    let repo = pushed_repo();
    repo.write("channels/adt-receiver/scripts/deploy.js", "return 1;\n");

    chsync(repo.root())
        .args(["delta", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("channels/adt-receiver/scripts/deploy.js"));
}

#[test]
fn diff_identical_documents() {
    let path = fixture_path("channels/adt-receiver.json");
    let repo = TestRepo::new();
    chsync(repo.root())
        .arg("diff")
        .arg(&path)
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("has no changes"));
}

#[test]
fn diff_reports_changes_as_json() {
    let repo = TestRepo::new();
    let output = chsync(repo.root())
        .arg("diff")
        .arg(fixture_path("channels/adt-receiver.json"))
        .arg(fixture_path("channels/lab-results.json"))
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(result["changeCount"].as_u64().unwrap() > 0);
}

#[test]
fn scan_reports_parameters_without_values() {
    let repo = TestRepo::new();
    chsync(repo.root())
        .arg("scan")
        .arg(fixture_path("channels/adt-receiver.json"))
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"parameterName\": \"SOURCE_PASSWORD\""))
        .stdout(predicate::str::contains("s3cret").not())
        .stdout(predicate::str::contains("k-123").not());
}

#[test]
fn vars_masks_sensitive_values() {
    let repo = TestRepo::new();
    chsync(repo.root()).arg("init").assert().success();
    repo.write(
        "environments/base.yaml",
        "CHSYNC_TEST_URL: https://lab.local\nCHSYNC_TEST_PASSWORD: hunter2\n",
    );
    repo.write("environments/staging.yaml", "CHSYNC_TEST_URL: https://staging.local\n");

    chsync(repo.root())
        .args(["vars", "--env", "staging"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://staging.local"))
        .stdout(predicate::str::contains("(environment)"))
        .stdout(predicate::str::contains("********"))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn completions_generate_for_bash() {
    let repo = TestRepo::new();
    chsync(repo.root())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("chsync"));
}
