// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use crate::commands::testing::TestContext;

#[test]
fn test_clear_requires_confirmation() {
    let err = run(false).unwrap_err();
    assert!(matches!(err, Error::ConfirmationRequired { .. }));
    assert!(err.to_string().contains("--yes"));
}

#[tokio::test]
async fn test_clear_deletes_everything() {
    let ctx = TestContext::new();
    ctx.remote.insert("backup.json", "{}");
    ctx.remote.insert("knowledge-backup.json", "{}");
    ctx.remote.insert("archive/2025.json", "{}");

    let report = run_impl(&ctx.orchestrator()).await.unwrap();

    assert_eq!(report, ClearReport { deleted: 3, failed: 0 });
    assert!(ctx.remote.paths().is_empty());
}

#[tokio::test]
async fn test_clear_counts_failures() {
    let ctx = TestContext::new();
    ctx.remote.insert("a.json", "{}");
    ctx.remote.insert("b.json", "{}");
    ctx.remote.fail_delete("b.json");

    let report = run_impl(&ctx.orchestrator()).await.unwrap();

    assert_eq!(report, ClearReport { deleted: 1, failed: 1 });
    assert_eq!(ctx.remote.paths(), vec!["b.json".to_string()]);
}

#[tokio::test]
async fn test_clear_empty_repository() {
    let ctx = TestContext::new();
    let report = run_impl(&ctx.orchestrator()).await.unwrap();
    assert_eq!(report, ClearReport::default());
}
