//! Integration tests for the CLI
//!
//! Runs the built binary against the JSON fixtures.

use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mpd-patcher"))
        .args(args)
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .output()
        .unwrap()
}

#[test]
fn test_help_lists_commands() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("inspect"));
    assert!(stdout.contains("resolve"));
    assert!(stdout.contains("check"));
}

#[test]
fn test_inspect_patch() {
    let output = run(&["inspect", "tests/fixtures/patch.json"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("mpdId: live-1"));
    assert!(stdout.contains("4 operations"));
    assert!(stdout.contains("/MPD/Period[1]"));
    assert!(stdout.contains("pos=after"));
    assert!(stdout.contains("ignoring unsupported type 'bogus'"));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("ignoring patch node of unsupported type").count(), 1);
}

#[test]
fn test_inspect_json_output() {
    let output = run(&["inspect", "--json", "tests/fixtures/patch-clean.json"]);
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["metadata"]["mpd_id"], "live-1");
    assert_eq!(report["operations"][0]["kind"], "replace");
    assert_eq!(report["operations"][0]["value"], "2020-01-01T00:00:20Z");
    assert_eq!(report["operations"][1]["kind"], "remove");
}

#[test]
fn test_inspect_directory() {
    let dir = TempDir::new().unwrap();
    fs::copy("tests/fixtures/patch-clean.json", dir.path().join("a.json")).unwrap();
    fs::copy("tests/fixtures/patch.json", dir.path().join("b.json")).unwrap();
    fs::write(dir.path().join("notes.txt"), "not a patch").unwrap();

    let output = run(&["inspect", dir.path().to_str().unwrap()]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 operations"));
    assert!(stdout.contains("4 operations"));
    assert!(!stdout.contains("notes.txt"));
}

#[test]
fn test_resolve_sibling_and_child() {
    let sibling = run(&[
        "resolve",
        "--manifest",
        "tests/fixtures/manifest.json",
        "--sibling",
        "/MPD/Period[1]",
    ]);
    assert!(sibling.status.success());
    let stdout = String::from_utf8_lossy(&sibling.stdout);
    assert!(stdout.contains("target: <MPD"));

    let child = run(&[
        "resolve",
        "--manifest",
        "tests/fixtures/manifest.json",
        "/MPD/Period[1]",
    ]);
    assert!(child.status.success());
    let stdout = String::from_utf8_lossy(&child.stdout);
    assert!(stdout.contains("target: <Period id=\"p1\""));
}

#[test]
fn test_resolve_attribute_value() {
    let output = run(&[
        "resolve",
        "--manifest",
        "tests/fixtures/manifest.json",
        "/MPD/Period[@id=\"p2\"]/@start",
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("attribute: start"));
    assert!(stdout.contains("value: \"PT30S\""));
}

#[test]
fn test_resolve_not_found_exits_nonzero() {
    let output = run(&[
        "resolve",
        "--manifest",
        "tests/fixtures/manifest.json",
        "/MPD/Period[7]",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_resolve_malformed_selector_fails() {
    let output = run(&[
        "resolve",
        "--manifest",
        "tests/fixtures/manifest.json",
        "/MPD/Period[1][2]",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("malformed selector component"));
}

#[test]
fn test_check_reports_conflicts() {
    let output = run(&[
        "check",
        "--manifest",
        "tests/fixtures/manifest.json",
        "tests/fixtures/patch.json",
    ]);
    assert!(!output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("3 resolved"));
    assert!(stdout.contains("1 not found"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("CONFLICT"));
}

#[test]
fn test_check_clean_patch() {
    let output = run(&[
        "check",
        "--manifest",
        "tests/fixtures/manifest.json",
        "tests/fixtures/patch-clean.json",
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 resolved"));
    assert!(stdout.contains("0 not found"));
}

#[test]
fn test_check_rejects_patch_without_child_order() {
    let dir = TempDir::new().unwrap();
    let patch = dir.path().join("keyed.json");
    fs::write(
        &patch,
        r#"{"Patch": {
            "replace": {"sel": "/MPD/@publishTime", "__text": "2020-01-01T00:00:10Z"},
            "add": {"sel": "/MPD/Period"}
        }}"#,
    )
    .unwrap();

    let output = run(&[
        "check",
        "--manifest",
        "tests/fixtures/manifest.json",
        patch.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("carry no document order"));
}

#[test]
fn test_config_skip_policy() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("mpd-patcher.toml");
    fs::write(&config, "[extraction]\nmalformed_selector = \"skip\"\n").unwrap();
    let patch = dir.path().join("patch.json");
    fs::write(
        &patch,
        r#"{"Patch": {"__children": [
            {"remove": {"sel": "/MPD/*"}},
            {"remove": {"sel": "/MPD/Period[2]"}}
        ]}}"#,
    )
    .unwrap();

    let aborted = run(&["inspect", patch.to_str().unwrap()]);
    assert!(!aborted.status.success());
    let stderr = String::from_utf8_lossy(&aborted.stderr);
    assert!(stderr.contains("failed to extract operations from"));
    assert!(stderr.contains(patch.to_str().unwrap()));

    let skipped = run(&[
        "--config",
        config.to_str().unwrap(),
        "inspect",
        patch.to_str().unwrap(),
    ]);
    assert!(skipped.status.success());
    let stdout = String::from_utf8_lossy(&skipped.stdout);
    assert!(stdout.contains("1 operations"));
    assert!(stdout.contains("node 0: skipped"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("bad.toml");
    fs::write(&config, "[document]\nroot = \"\"\n").unwrap();

    let output = run(&[
        "--config",
        config.to_str().unwrap(),
        "inspect",
        "tests/fixtures/patch.json",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("document.root"));
}
