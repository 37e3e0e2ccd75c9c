// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// `kt` with the token override cleared so stored settings apply.
pub fn kt() -> Command {
    let mut cmd = cargo_bin_cmd!("kt");
    cmd.env_remove("KT_TOKEN").env_remove("KT_LOG");
    cmd
}

/// Helper to create an initialized temp directory
pub fn init_temp() -> TempDir {
    let temp = TempDir::new().unwrap();
    kt().arg("init").current_dir(temp.path()).assert().success();
    temp
}

/// Helper to create a tree or note and return its id
pub fn create_item(temp: &TempDir, kind: &str, name: &str) -> String {
    let output = kt()
        .args(["add", kind, name])
        .current_dir(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    // "Created tree tree-1a2b3c4d: Rust"
    String::from_utf8_lossy(&output.stdout)
        .split_whitespace()
        .nth(2)
        .unwrap()
        .trim_end_matches(':')
        .to_string()
}
