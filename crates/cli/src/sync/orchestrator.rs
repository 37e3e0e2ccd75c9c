// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end save and restore workflow.
//!
//! A sync pass walks `Idle → Connecting → Uploading(Metadata) →
//! Uploading(Payload) → Done`, or stops in `Failed(phase)` at the first
//! error. Only one pass (sync, restore or clear) runs at a time.

use chrono::{DateTime, Utc};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

use kt_core::backup::{self, AppSettings, BackupFormat, DeviceInfo};
use kt_core::{apply_restore, ApplyMode, Dataset, MergeOutcome, Store};

use super::client::{ContentsClient, EntryKind, ObjectEntry, RepositoryInfo, UploadOutcome};
use super::context::{BACKUP_PATH, LEGACY_BACKUP_PATH};
use super::response::RemoteError;
use super::transport::HttpTransport;

/// Objects deleted concurrently per batch when clearing.
pub const CLEAR_BATCH_SIZE: usize = 5;

/// Pause between clear batches.
pub const CLEAR_BATCH_PAUSE: Duration = Duration::from_millis(100);

/// The step an error is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Connect,
    Upload,
    Download,
    Clear,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Connect => "connect",
            Phase::Upload => "upload",
            Phase::Download => "download",
            Phase::Clear => "clear",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStep {
    /// Resolving the concurrency token of the backup object.
    Metadata,
    /// Writing the backup object.
    Payload,
}

/// Progress of the most recent sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Connecting,
    Uploading(UploadStep),
    Done,
    Failed(Phase),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Requested by the user; starts from an empty cache.
    Manual,
    /// Fired by the debouncer after local changes.
    Auto,
}

/// Error type for orchestrated operations.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("a sync is already in progress")]
    Busy,

    #[error("{phase} failed: {source}")]
    Remote {
        phase: Phase,
        #[source]
        source: RemoteError,
    },

    #[error("{phase} failed: {source}")]
    Data {
        phase: Phase,
        #[source]
        source: kt_core::Error,
    },
}

impl SyncError {
    pub fn phase(&self) -> Option<Phase> {
        match self {
            SyncError::Busy => None,
            SyncError::Remote { phase, .. } | SyncError::Data { phase, .. } => Some(*phase),
        }
    }

    fn remote(phase: Phase) -> impl FnOnce(RemoteError) -> SyncError {
        move |source| SyncError::Remote { phase, source }
    }

    fn data(phase: Phase) -> impl FnOnce(kt_core::Error) -> SyncError {
        move |source| SyncError::Data { phase, source }
    }
}

/// Result type for orchestrated operations.
pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub trees: usize,
    pub notes: usize,
    /// The remote already held identical content.
    pub skipped: bool,
    pub synced_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    /// Remote path the backup was read from.
    pub source: String,
    pub format: BackupFormat,
    pub trees: usize,
    pub notes: usize,
    pub outcome: MergeOutcome,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearReport {
    pub deleted: usize,
    pub failed: usize,
}

impl std::ops::AddAssign for ClearReport {
    fn add_assign(&mut self, rhs: ClearReport) {
        self.deleted += rhs.deleted;
        self.failed += rhs.failed;
    }
}

/// Persists the time of the last successful sync.
pub trait LastSyncStore: Send + Sync {
    fn save_last_sync(&self, at: DateTime<Utc>) -> crate::Result<()>;
}

struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Drives sync, restore and clear against one remote target.
pub struct Orchestrator<T: HttpTransport> {
    client: ContentsClient<T>,
    store: Arc<dyn Store>,
    last_sync: Option<Arc<dyn LastSyncStore>>,
    device: DeviceInfo,
    settings: Mutex<AppSettings>,
    busy: AtomicBool,
    connected: AtomicBool,
    state: Mutex<SyncState>,
}

impl<T: HttpTransport> Orchestrator<T> {
    pub fn new(
        client: ContentsClient<T>,
        store: Arc<dyn Store>,
        device: DeviceInfo,
        settings: AppSettings,
    ) -> Self {
        Orchestrator {
            client,
            store,
            last_sync: None,
            device,
            settings: Mutex::new(settings),
            busy: AtomicBool::new(false),
            connected: AtomicBool::new(false),
            state: Mutex::new(SyncState::Idle),
        }
    }

    pub fn with_last_sync_store(mut self, last_sync: Arc<dyn LastSyncStore>) -> Self {
        self.last_sync = Some(last_sync);
        self
    }

    pub fn client(&self) -> &ContentsClient<T> {
        &self.client
    }

    pub fn state(&self) -> SyncState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: SyncState) {
        tracing::debug!(?state, "sync state");
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }

    /// True once a connection test succeeded in this process.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Auto-sync runs only when enabled and after a successful connection test.
    pub fn auto_sync_ready(&self) -> bool {
        let enabled = self
            .settings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .auto_sync;
        enabled && self.is_connected()
    }

    fn try_begin(&self) -> SyncResult<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| SyncError::Busy)?;
        Ok(BusyGuard(&self.busy))
    }

    async fn connect(&self) -> SyncResult<RepositoryInfo> {
        let info = self
            .client
            .probe_repository()
            .await
            .map_err(SyncError::remote(Phase::Connect))?;
        self.connected.store(true, Ordering::SeqCst);
        Ok(info)
    }

    /// Validates the credential and repository with one read call.
    pub async fn test_connection(&self) -> SyncResult<RepositoryInfo> {
        let info = self.connect().await?;
        tracing::info!(repository = %info.full_name, "connection verified");
        Ok(info)
    }

    /// Uploads a snapshot of the local store as the composite backup.
    pub async fn sync_now(&self, trigger: Trigger) -> SyncResult<SyncReport> {
        let _guard = self.try_begin()?;
        if trigger == Trigger::Manual {
            self.client.context().cache.clear();
        }

        let result = self.run_pass().await;
        match &result {
            Ok(report) => {
                self.set_state(SyncState::Done);
                tracing::info!(
                    trees = report.trees,
                    notes = report.notes,
                    skipped = report.skipped,
                    ?trigger,
                    "sync complete"
                );
            }
            Err(e) => {
                self.set_state(SyncState::Failed(e.phase().unwrap_or(Phase::Upload)));
                tracing::warn!(?trigger, "sync failed: {e}");
            }
        }
        result
    }

    async fn run_pass(&self) -> SyncResult<SyncReport> {
        self.set_state(SyncState::Connecting);
        self.connect().await?;

        let Dataset { trees, notes } = self
            .store
            .dataset()
            .map_err(SyncError::data(Phase::Upload))?;
        let (tree_count, note_count) = (trees.len(), notes.len());

        let created = self.client.context().clock.now_utc();
        let settings = self
            .settings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        let document = backup::encode(trees, notes, self.device.clone(), settings, created);
        let json = document.to_json().map_err(SyncError::data(Phase::Upload))?;

        self.set_state(SyncState::Uploading(UploadStep::Metadata));
        let check = self
            .client
            .resolve_version_with(BACKUP_PATH, &json, backup::same_payload)
            .await
            .map_err(SyncError::remote(Phase::Upload))?;

        self.set_state(SyncState::Uploading(UploadStep::Payload));
        let message = format!("Backup: {tree_count} trees, {note_count} notes");
        let outcome = self
            .client
            .write_resolved(BACKUP_PATH, &json, check, &message)
            .await
            .map_err(SyncError::remote(Phase::Upload))?;

        self.mark_synced(created);
        Ok(SyncReport {
            trees: tree_count,
            notes: note_count,
            skipped: outcome == UploadOutcome::Unchanged,
            synced_at: created,
        })
    }

    fn mark_synced(&self, at: DateTime<Utc>) {
        self.settings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last_sync = Some(at);
        if let Some(store) = &self.last_sync {
            if let Err(e) = store.save_last_sync(at) {
                tracing::warn!("failed to record last sync time: {e}");
            }
        }
    }

    /// Fetches the composite backup and applies it to the local store.
    ///
    /// Falls back to the legacy backup path when no composite backup
    /// exists. Decode failures leave the store untouched.
    pub async fn restore(&self, mode: ApplyMode) -> SyncResult<RestoreReport> {
        let _guard = self.try_begin()?;
        if !self.is_connected() {
            self.connect().await?;
        }

        let object = match self.client.get_object(BACKUP_PATH).await {
            Ok(object) => object,
            Err(RemoteError::NotFound(_)) => {
                tracing::info!("no {BACKUP_PATH} found, trying {LEGACY_BACKUP_PATH}");
                self.client
                    .get_object_lossy(LEGACY_BACKUP_PATH)
                    .await
                    .map_err(SyncError::remote(Phase::Download))?
            }
            Err(e) => return Err(SyncError::remote(Phase::Download)(e)),
        };

        let decoded = backup::decode(&object.content).map_err(SyncError::data(Phase::Download))?;
        let (trees, notes) = (decoded.trees.len(), decoded.notes.len());
        let format = decoded.format;
        let outcome = apply_restore(self.store.as_ref(), decoded.trees, decoded.notes, mode)
            .map_err(SyncError::data(Phase::Download))?;

        tracing::info!(
            source = %object.path,
            trees,
            notes,
            inserted = outcome.inserted,
            updated = outcome.updated,
            "restore complete"
        );
        Ok(RestoreReport {
            source: object.path,
            format,
            trees,
            notes,
            outcome,
        })
    }

    /// Deletes every object in the repository, best effort.
    ///
    /// Individual failures are logged and counted; nothing is rolled back.
    pub async fn clear_repository(&self) -> SyncResult<ClearReport> {
        let _guard = self.try_begin()?;
        if !self.is_connected() {
            self.connect().await?;
        }

        let entries = match self.client.list_objects("").await {
            Ok(entries) => entries,
            // An empty repository has no root listing
            Err(RemoteError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(SyncError::remote(Phase::Clear)(e)),
        };

        let report = self.delete_entries(entries).await;
        self.client.context().cache.clear();
        tracing::info!(
            deleted = report.deleted,
            failed = report.failed,
            "repository cleared"
        );
        Ok(report)
    }

    fn delete_entries(
        &self,
        entries: Vec<ObjectEntry>,
    ) -> Pin<Box<dyn Future<Output = ClearReport> + Send + '_>> {
        Box::pin(async move {
            let mut report = ClearReport::default();
            for (index, batch) in entries.chunks(CLEAR_BATCH_SIZE).enumerate() {
                if index > 0 {
                    tokio::time::sleep(CLEAR_BATCH_PAUSE).await;
                }
                let results =
                    futures_util::future::join_all(batch.iter().map(|e| self.delete_entry(e))).await;
                for result in results {
                    report += result;
                }
            }
            report
        })
    }

    async fn delete_entry(&self, entry: &ObjectEntry) -> ClearReport {
        if entry.kind == EntryKind::Dir {
            return match self.client.list_objects(&entry.path).await {
                Ok(children) => self.delete_entries(children).await,
                Err(e) => {
                    tracing::warn!(path = %entry.path, "failed to list directory: {e}");
                    ClearReport {
                        deleted: 0,
                        failed: 1,
                    }
                }
            };
        }

        let message = format!("Clear repository: delete {}", entry.path);
        match self
            .client
            .delete_object(&entry.path, &entry.token, &message)
            .await
        {
            Ok(()) => ClearReport {
                deleted: 1,
                failed: 0,
            },
            Err(e) => {
                tracing::warn!(path = %entry.path, "failed to delete: {e}");
                ClearReport {
                    deleted: 0,
                    failed: 1,
                }
            }
        }
    }
}
