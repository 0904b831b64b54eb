//! CLI integration tests for the partmap binary.
//!
//! Only the offline surface is exercised here; commands that need a running
//! server are covered by the server's API integration tests.

use assert_cmd::Command;
use predicates::prelude::*;

fn partmap() -> Command {
    Command::cargo_bin("partmap").expect("binary built")
}

#[test]
fn test_help_lists_subcommands() {
    partmap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("suggest"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("refresh-cache"));
}

#[test]
fn test_extract_finds_prefixed_number() {
    partmap()
        .args(["extract", "J1234567_detail.jpg"])
        .assert()
        .success()
        .stdout(predicate::str::contains("J1234567"));
}

#[test]
fn test_extract_strips_counter_suffix() {
    partmap()
        .args(["extract", "12345 (2).jpg"])
        .assert()
        .success()
        .stdout(predicate::str::contains("12345"));
}

#[test]
fn test_extract_json_output() {
    partmap()
        .args(["extract", "--json", "OLD12345_1.jpg"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"OLD12345\""));
}

#[test]
fn test_extract_reports_no_candidates() {
    partmap()
        .args(["extract", "12.jpg"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no candidates"));
}

#[test]
fn test_extract_requires_filename() {
    partmap().arg("extract").assert().failure();
}

#[test]
fn test_unknown_subcommand_fails() {
    partmap().arg("frobnicate").assert().failure();
}
