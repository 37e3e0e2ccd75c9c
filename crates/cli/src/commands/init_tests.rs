// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use crate::config::Config;
use crate::error::Error;
use tempfile::TempDir;

#[test]
fn test_init_creates_config_and_data() {
    let temp = TempDir::new().unwrap();
    let work_dir = run_impl(temp.path()).unwrap();

    assert_eq!(work_dir, temp.path().join(".ktree"));
    assert!(Config::load(&work_dir).is_ok());

    let data = std::fs::read_to_string(work_dir.join("data.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&data).unwrap();
    assert_eq!(value["trees"], serde_json::json!([]));
    assert_eq!(value["notes"], serde_json::json!([]));
}

#[test]
fn test_init_keeps_existing_data() {
    let temp = TempDir::new().unwrap();
    let work_dir = temp.path().join(".ktree");
    std::fs::create_dir_all(&work_dir).unwrap();
    std::fs::write(work_dir.join("data.json"), r#"{"trees":[],"notes":[]}  "#).unwrap();

    run_impl(temp.path()).unwrap();

    let data = std::fs::read_to_string(work_dir.join("data.json")).unwrap();
    assert!(data.ends_with("  "));
}

#[test]
fn test_init_twice_fails() {
    let temp = TempDir::new().unwrap();
    run_impl(temp.path()).unwrap();
    assert!(matches!(
        run_impl(temp.path()),
        Err(Error::AlreadyInitialized(_))
    ));
}
