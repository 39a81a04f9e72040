//! Integration tests for the vsp CLI skeleton: help, version, subcommand
//! registration and global flags.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn vsp() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vsp"));
    cmd.env("NO_COLOR", "1");
    cmd
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help() {
    // arg_required_else_help prints help on stderr and exits 2
    vsp().assert().code(2).stderr(predicate::str::contains(
        "Declarative block-storage automation",
    ));
}

#[test]
fn test_cli_help_flag_shows_help() {
    vsp()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    vsp()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("vsp"));
}

#[test]
fn test_version_command_shows_version() {
    vsp()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(concat!("vsp ", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let output = vsp()
        .args(["version", "--json"])
        .output()
        .expect("run vsp");
    assert!(output.status.success());
    let doc: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(doc["version"], env!("CARGO_PKG_VERSION"));
}

// --- Command hierarchy tests ---

#[test]
fn test_help_lists_every_module() {
    let assert = vsp().arg("--help").assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    for module in [
        "volume",
        "volume-facts",
        "pool",
        "pool-facts",
        "host-group",
        "host-group-facts",
        "shadow-image",
        "shadow-image-facts",
        "nvm-subsystem",
        "nvm-subsystem-facts",
        "storage-facts",
        "config",
        "version",
    ] {
        assert!(stdout.contains(module), "--help misses {module}:\n{stdout}");
    }
}

#[test]
fn test_module_requires_args_flag() {
    vsp()
        .arg("volume")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--args"));
}

#[test]
fn test_unknown_subcommand_is_rejected() {
    vsp().arg("snapshot").assert().code(2);
}

#[test]
fn test_global_flags_are_accepted_after_subcommand() {
    vsp()
        .args(["version", "--quiet", "--no-color", "--verbose", "--yes"])
        .assert()
        .success();
}
