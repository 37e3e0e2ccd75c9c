// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

//! Test infrastructure for command testing.
//!
//! `TestContext` owns an initialized `.ktree/` in a temp directory,
//! configured for the in-memory [`FakeRemote`], so commands run against
//! real files without network access.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::commands::testing::TestContext;
//!
//! #[tokio::test]
//! async fn test_some_command() {
//!     let ctx = TestContext::new();
//!     ctx.add_tree("Rust");
//!     let orchestrator = ctx.orchestrator();
//!     // run the command against ctx.workspace / orchestrator
//! }
//! ```

use chrono::{TimeZone, Utc};
use kt_core::{Category, Item, Note, Store, Tree};
use tempfile::TempDir;

use crate::config::{init_work_dir, Config, SyncSettings};
use crate::sync::test_helpers::{context_with, FakeRemote, REPO};
use crate::sync::{GatePolicy, Orchestrator};

use super::Workspace;

/// Test context providing a configured workspace and a fake remote.
pub struct TestContext {
    pub workspace: Workspace,
    pub remote: FakeRemote,
    _temp_dir: TempDir, // Keep alive for duration of test
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Create a workspace with sync configured for [`REPO`].
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let work_dir = init_work_dir(temp_dir.path()).expect("Failed to init work dir");
        let mut config = Config::default();
        config.sync.repository = REPO.to_string();
        config.sync.credential = "test-token".to_string();
        config.save(&work_dir).expect("Failed to save config");

        TestContext {
            workspace: Workspace::open(work_dir).expect("Failed to open workspace"),
            remote: FakeRemote::new(),
            _temp_dir: temp_dir,
        }
    }

    /// A second workspace backed by the same remote as `other`.
    pub fn sharing_remote(other: &TestContext) -> Self {
        TestContext {
            remote: other.remote.clone(),
            ..Self::new()
        }
    }

    /// Enable auto-sync in the stored config and the loaded workspace.
    pub fn with_auto_sync(mut self) -> Self {
        self.workspace.config.sync.auto_sync = true;
        self.workspace
            .config
            .save(&self.workspace.work_dir)
            .expect("Failed to save config");
        self
    }

    pub fn settings(&self) -> SyncSettings {
        self.workspace.config.sync.clone()
    }

    /// Orchestrator over the fake remote, sharing the workspace store.
    pub fn orchestrator(&self) -> Orchestrator<FakeRemote> {
        let (ctx, _) = context_with(GatePolicy::default());
        self.workspace
            .orchestrator(&self.settings(), self.remote.clone(), ctx)
    }

    /// Reloaded config, as written by commands.
    pub fn config(&self) -> Config {
        Config::load(&self.workspace.work_dir).expect("Failed to load config")
    }

    pub fn add_tree(&self, id: &str, name: &str) -> &Self {
        let tree = Tree::new(id, name, Category::Technology, created());
        self.workspace
            .store
            .upsert(Item::Tree(tree))
            .expect("Failed to add tree");
        self
    }

    pub fn add_note(&self, id: &str, name: &str) -> &Self {
        let note = Note::new(id, name, Category::Personal, created());
        self.workspace
            .store
            .upsert(Item::Note(note))
            .expect("Failed to add note");
        self
    }
}

/// Fixed creation time for fixtures.
pub fn created() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 5, 9, 30, 0).unwrap()
}
