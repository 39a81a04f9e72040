//! Integration tests for `vsp config` command.
//!
//! All filesystem-touching tests set `VSP_CONFIG` to a temp path so they
//! never read or write `~/.vsp/config.yaml`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn vsp() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vsp"));
    cmd.env("NO_COLOR", "1").env_remove("HV_STORAGE_MGMT_PATH");
    cmd
}

/// Returns a `TempDir` and the path string for a config file inside it.
fn temp_config_path() -> (TempDir, String) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir
        .path()
        .join("config.yaml")
        .to_string_lossy()
        .into_owned();
    (dir, path)
}

#[test]
fn test_config_help_shows_show_and_set_subcommands() {
    vsp()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("set"));
}

#[test]
fn test_config_show_without_file_prints_defaults() {
    let (_dir, path) = temp_config_path();
    vsp()
        .args(["config", "show"])
        .env("VSP_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("interval_secs: 5"))
        .stdout(predicate::str::contains("max_attempts: 60"))
        .stdout(predicate::str::contains("timeout_secs: 300"));
}

#[test]
fn test_config_show_json_includes_path() {
    let (_dir, path) = temp_config_path();
    let output = vsp()
        .args(["config", "show", "--json"])
        .env("VSP_CONFIG", &path)
        .output()
        .expect("run vsp");
    assert!(output.status.success());
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).expect("JSON");
    assert_eq!(doc["path"], path.as_str());
    assert_eq!(doc["config"]["polling"]["interval_secs"], 5);
}

#[test]
fn test_config_lives_under_storage_mgmt_home() {
    let dir = TempDir::new().expect("temp dir");
    let output = vsp()
        .args(["config", "show", "--json"])
        .env_remove("VSP_CONFIG")
        .env("HV_STORAGE_MGMT_PATH", dir.path())
        .output()
        .expect("run vsp");
    assert!(output.status.success());
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).expect("JSON");
    let expected = dir.path().join("vsp").join("config.yaml");
    assert_eq!(doc["path"], expected.to_string_lossy().as_ref());
}

#[test]
fn test_config_set_persists_value() {
    let (_dir, path) = temp_config_path();
    vsp()
        .args(["config", "set", "polling.max_attempts", "120"])
        .env("VSP_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("polling.max_attempts = 120"));

    let written = std::fs::read_to_string(&path).expect("config written");
    assert!(written.contains("max_attempts: 120"), "got: {written}");

    vsp()
        .args(["config", "show"])
        .env("VSP_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("max_attempts: 120"));
}

#[test]
fn test_config_set_json_echoes_key_and_value() {
    let (_dir, path) = temp_config_path();
    vsp()
        .args(["config", "set", "http.timeout_secs", "45", "--json"])
        .env("VSP_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""key":"http.timeout_secs""#))
        .stdout(predicate::str::contains(r#""value":"45""#));
}

#[test]
fn test_config_set_unknown_key_fails() {
    let (_dir, path) = temp_config_path();
    vsp()
        .args(["config", "set", "security.level", "strict"])
        .env("VSP_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown setting"));
    assert!(!std::path::Path::new(&path).exists());
}

#[test]
fn test_config_set_out_of_range_value_fails() {
    let (_dir, path) = temp_config_path();
    vsp()
        .args(["config", "set", "polling.interval_secs", "0"])
        .env("VSP_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("between 1 and 600"));
}
