//! Smoke tests for the pagespec CLI
//!
//! These tests run the binary against spec and snapshot files written to a
//! temporary directory.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const SPEC: &str = "\
===
logo     id   logo
menu     css  #menu
===

@ Main | desktop
logo
    width: ${LOGO_WIDTH}px
menu
    below: logo 0 to 10px

@ Mobile | mobile
menu
    width: 320px
";

const PAGE: &str = r##"{
  "screen": {"x": 0, "y": 0, "width": 1024, "height": 768},
  "elements": [
    {"kind": "id", "selector": "logo", "rect": {"x": 0, "y": 0, "width": 120, "height": 40}},
    {"kind": "css", "selector": "#menu", "rect": {"x": 0, "y": 45, "width": 1024, "height": 30}}
  ]
}"##;

/// Get a command for the pagespec binary
fn pagespec() -> Command {
    Command::cargo_bin("pagespec").expect("pagespec binary should exist")
}

/// Write the sample spec and page into a temp directory
fn workspace() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let spec = dir.path().join("home.spec");
    let page = dir.path().join("home.json");
    fs::write(&spec, SPEC).unwrap();
    fs::write(&page, PAGE).unwrap();
    (dir, spec, page)
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    pagespec()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.4.0"));
}

#[test]
fn test_help_flag() {
    pagespec()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("parse"));
}

#[test]
fn test_no_args_shows_help() {
    pagespec().assert().failure();
}

#[test]
fn test_check_subcommand_help() {
    pagespec()
        .args(["check", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--page"))
        .stdout(predicate::str::contains("--tags"))
        .stdout(predicate::str::contains("--property"));
}

// ============================================================================
// Check Command
// ============================================================================

#[test]
fn test_check_passes() {
    let (_dir, spec, page) = workspace();
    pagespec()
        .args(["--color", "never", "check"])
        .arg(&spec)
        .arg("--page")
        .arg(&page)
        .args(["--tags", "desktop", "-P", "LOGO_WIDTH=120"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS logo: width: 120px"))
        .stdout(predicate::str::contains(
            "Summary: 2 passed, 0 warnings, 0 failed, 0 missing",
        ));
}

#[test]
fn test_check_fails_with_message() {
    let (_dir, spec, page) = workspace();
    pagespec()
        .args(["--color", "never", "check"])
        .arg(&spec)
        .arg("--page")
        .arg(&page)
        .args(["--tags", "desktop", "-P", "LOGO_WIDTH=100"])
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "\"logo\" width is 120px but it should be 100px",
        ))
        .stderr(predicate::str::contains(
            "Layout check failed: 1 of 2 specs did not pass",
        ));
}

#[test]
fn test_check_tags_select_sections() {
    let (_dir, spec, page) = workspace();
    pagespec()
        .args(["--color", "never", "check"])
        .arg(&spec)
        .arg("--page")
        .arg(&page)
        .args(["--tags", "mobile", "-P", "LOGO_WIDTH=1"])
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "\"menu\" width is 1024px but it should be 320px",
        ))
        .stdout(predicate::str::contains("logo").not());
}

#[test]
fn test_check_quiet_hides_passes() {
    let (_dir, spec, page) = workspace();
    pagespec()
        .args(["-q", "--color", "never", "check"])
        .arg(&spec)
        .arg("--page")
        .arg(&page)
        .args(["--tags", "desktop", "-P", "LOGO_WIDTH=120"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS").not())
        .stdout(predicate::str::contains("Summary"));
}

#[test]
fn test_check_json_output() {
    let (_dir, spec, page) = workspace();
    let output = pagespec()
        .arg("check")
        .arg(&spec)
        .arg("--page")
        .arg(&page)
        .args(["--tags", "desktop", "-P", "LOGO_WIDTH=120", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let results = report["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["object"], "logo");
    assert_eq!(results[0]["outcome"]["status"], "pass");
}

#[test]
fn test_check_with_project_config() {
    let (dir, spec, page) = workspace();
    let config = dir.path().join("pagespec.yaml");
    fs::write(&config, "properties:\n  LOGO_WIDTH: \"120\"\ntags: [desktop]\n").unwrap();
    pagespec()
        .args(["--color", "never", "check"])
        .arg(&spec)
        .arg("--page")
        .arg(&page)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 passed"));
}

#[test]
fn test_check_rejects_bad_property() {
    let (_dir, spec, page) = workspace();
    pagespec()
        .arg("check")
        .arg(&spec)
        .arg("--page")
        .arg(&page)
        .args(["-P", "LOGO_WIDTH"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NAME=VALUE"));
}

#[test]
fn test_check_missing_page() {
    let (dir, spec, _page) = workspace();
    pagespec()
        .arg("check")
        .arg(&spec)
        .arg("--page")
        .arg(dir.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not read file"));
}

// ============================================================================
// Parse Command
// ============================================================================

#[test]
fn test_parse_text_outline() {
    let (_dir, spec, _page) = workspace();
    pagespec()
        .arg("parse")
        .arg(&spec)
        .args(["-P", "LOGO_WIDTH=120"])
        .assert()
        .success()
        .stdout(predicate::str::contains("@ Main | desktop"))
        .stdout(predicate::str::contains("        width: 120px"));
}

#[test]
fn test_parse_json_output() {
    let (_dir, spec, _page) = workspace();
    let output = pagespec()
        .arg("parse")
        .arg(&spec)
        .args(["-P", "LOGO_WIDTH=120", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let compiled: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(compiled["sections"][0]["name"], "Main");
    assert_eq!(compiled["sections"][1]["tags"][0], "mobile");
    assert_eq!(compiled["objects"]["menu"]["selector"], "#menu");
}

#[test]
fn test_parse_reports_compile_error() {
    let dir = TempDir::new().unwrap();
    let spec = dir.path().join("broken.spec");
    fs::write(&spec, "===\nlogo id logo\n===\nlogo\n\twidth: 100px\n").unwrap();
    pagespec()
        .arg("parse")
        .arg(&spec)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Incorrect indentation. Should not use tabs. Use spaces",
        ))
        .stderr(predicate::str::contains("broken.spec:5"));
}
