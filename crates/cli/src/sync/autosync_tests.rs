// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for debounced auto-sync.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::runtime::Handle;

use kt_core::backup::{AppSettings, DeviceInfo};
use kt_core::{Category, Item, MemoryStore, Store, Tree};

use super::autosync::*;
use super::context::BACKUP_PATH;
use super::orchestrator::Orchestrator;
use super::test_helpers::{client_for, FakeRemote, START_MS};
use super::transport::Method;

struct Fixture {
    remote: FakeRemote,
    store: Arc<MemoryStore>,
    orchestrator: Arc<Orchestrator<FakeRemote>>,
    auto: Arc<AutoSync<FakeRemote>>,
}

fn fixture(enabled: bool) -> Fixture {
    let remote = FakeRemote::new();
    let store = Arc::new(MemoryStore::new());
    let settings = AppSettings {
        auto_sync: enabled,
        ..AppSettings::default()
    };
    let orchestrator = Arc::new(Orchestrator::new(
        client_for(&remote),
        store.clone(),
        DeviceInfo::current("ktree/test"),
        settings,
    ));
    let auto = AutoSync::new(Arc::clone(&orchestrator), DEFAULT_WINDOW, Handle::current());
    auto.attach(store.as_ref());
    Fixture {
        remote,
        store,
        orchestrator,
        auto,
    }
}

fn add_tree(store: &MemoryStore, id: &str) {
    store
        .upsert(Item::Tree(Tree::new(id, id, Category::Other, Utc::now())))
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_burst_of_changes_produces_one_upload() {
    let f = fixture(true);
    f.orchestrator.test_connection().await.unwrap();

    add_tree(&f.store, "a");
    tokio::time::sleep(Duration::from_secs(2)).await;
    add_tree(&f.store, "b");
    tokio::time::sleep(Duration::from_secs(2)).await;
    add_tree(&f.store, "c");
    assert!(f.auto.is_pending());

    // Four seconds after the first change nothing has been written
    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(f.remote.count(Method::Put), 0);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(f.remote.count(Method::Put), 1);
    assert!(!f.auto.is_pending());

    let doc: serde_json::Value =
        serde_json::from_str(&f.remote.content(BACKUP_PATH).unwrap()).unwrap();
    assert_eq!(doc["statistics"]["treesCount"], 3);
}

#[tokio::test(start_paused = true)]
async fn test_changes_ignored_before_connection_test() {
    let f = fixture(true);

    add_tree(&f.store, "a");
    assert!(!f.auto.is_pending());

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(f.remote.requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_changes_ignored_when_disabled() {
    let f = fixture(false);
    f.orchestrator.test_connection().await.unwrap();
    f.remote.clear_requests();

    add_tree(&f.store, "a");
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert!(!f.auto.is_pending());
    assert!(f.remote.requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_drops_pending_pass() {
    let f = fixture(true);
    f.orchestrator.test_connection().await.unwrap();

    add_tree(&f.store, "a");
    assert!(f.auto.is_pending());
    f.auto.cancel();
    assert!(!f.auto.is_pending());

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(f.remote.count(Method::Put), 0);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_waits_for_started_pass() {
    let f = fixture(true);
    // A low budget paces every call, keeping the pass in flight for a while
    f.remote.set_budget(300, START_MS / 1000 + 3600);
    f.orchestrator.test_connection().await.unwrap();

    add_tree(&f.store, "a");
    tokio::time::sleep(DEFAULT_WINDOW + Duration::from_millis(50)).await;
    assert!(!f.auto.is_pending());
    assert!(f.orchestrator.is_busy());
    assert!(f.remote.content(BACKUP_PATH).is_none());

    assert!(!f.auto.shutdown().await);
    assert!(!f.orchestrator.is_busy());
    assert!(f.remote.content(BACKUP_PATH).is_some());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_reports_unstarted_pass() {
    let f = fixture(true);
    f.orchestrator.test_connection().await.unwrap();

    add_tree(&f.store, "a");
    assert!(f.auto.is_pending());
    assert!(f.auto.shutdown().await);
    assert!(!f.auto.is_pending());

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(f.remote.count(Method::Put), 0);
}

#[tokio::test(start_paused = true)]
async fn test_changes_after_shutdown_are_reported_not_scheduled() {
    let f = fixture(true);
    f.orchestrator.test_connection().await.unwrap();
    assert!(!f.auto.shutdown().await);

    add_tree(&f.store, "a");
    assert!(!f.auto.is_pending());
    assert!(f.auto.shutdown().await);
    assert!(!f.auto.shutdown().await);
}

#[tokio::test(start_paused = true)]
async fn test_failed_pass_does_not_block_next_one() {
    let f = fixture(true);
    f.orchestrator.test_connection().await.unwrap();

    f.remote.set_offline(true);
    add_tree(&f.store, "a");
    tokio::time::sleep(Duration::from_secs(6)).await;
    assert!(f.remote.content(BACKUP_PATH).is_none());

    f.remote.set_offline(false);
    add_tree(&f.store, "b");
    tokio::time::sleep(Duration::from_secs(6)).await;
    assert!(f.remote.content(BACKUP_PATH).is_some());
    assert!(!f.orchestrator.is_busy());
}
