// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;
use common::*;
use yare::parameterized;

#[test]
fn set_then_show() {
    let temp = init_temp();

    kt().args(["config", "set", "sync.repository", "alice/notes"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated sync.repository"));

    kt().args(["config", "show"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("alice/notes"))
        .stdout(predicate::str::contains("sync.branch"));
}

#[test]
fn show_masks_credential() {
    let temp = init_temp();

    kt().args(["config", "set", "sync.credential", "ghp_supersecrettoken"])
        .current_dir(temp.path())
        .assert()
        .success();

    kt().args(["config", "show"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("ghp_supersecrettoken").not());
}

#[test]
fn prefix_is_optional() {
    let temp = init_temp();

    kt().args(["config", "set", "auto_sync", "true"])
        .current_dir(temp.path())
        .assert()
        .success();

    let config = std::fs::read_to_string(temp.path().join(".ktree/config.toml")).unwrap();
    assert!(config.contains("auto_sync = true"));
}

#[parameterized(
    no_slash = { "sync.repository", "alice", "invalid repository" },
    bad_bool = { "sync.auto_sync", "maybe", "invalid value" },
    bad_policy = { "sync.rate_limit_policy", "sometimes", "wait or fail-fast" },
    unknown = { "sync.colour", "blue", "unknown setting" },
)]
fn rejects_invalid_settings(key: &str, value: &str, message: &str) {
    let temp = init_temp();
    let before = std::fs::read_to_string(temp.path().join(".ktree/config.toml")).unwrap();

    kt().args(["config", "set", key, value])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains(message));

    let after = std::fs::read_to_string(temp.path().join(".ktree/config.toml")).unwrap();
    assert_eq!(before, after);
}
