// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Debounced automatic sync.
//!
//! Each local change cancels the pending pass and schedules a new one
//! `window` later, so a burst of edits produces a single upload.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use kt_core::Store;

use super::orchestrator::{Orchestrator, SyncError, Trigger};
use super::transport::HttpTransport;

/// Default quiet period before an automatic sync.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(5);

pub struct AutoSync<T: HttpTransport + 'static> {
    orchestrator: Arc<Orchestrator<T>>,
    window: Duration,
    runtime: Handle,
    pending: Mutex<Option<CancellationToken>>,
    /// Spawned passes that may still be running.
    tasks: Mutex<Vec<JoinHandle<()>>>,
    closed: AtomicBool,
    /// A change arrived or a pass was deferred after shutdown began.
    deferred: AtomicBool,
}

impl<T: HttpTransport + 'static> AutoSync<T> {
    /// Creates a debouncer that spawns its passes on `runtime`.
    pub fn new(orchestrator: Arc<Orchestrator<T>>, window: Duration, runtime: Handle) -> Arc<Self> {
        Arc::new(AutoSync {
            orchestrator,
            window,
            runtime,
            pending: Mutex::new(None),
            tasks: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
            deferred: AtomicBool::new(false),
        })
    }

    /// Subscribes to change notifications of `store`.
    pub fn attach(self: &Arc<Self>, store: &dyn Store) {
        let weak = Arc::downgrade(self);
        store.on_change(Box::new(move |kind| {
            if let Some(auto) = weak.upgrade() {
                tracing::trace!(%kind, "local change");
                auto.notify();
            }
        }));
    }

    /// Records a local change.
    ///
    /// Ignored unless auto-sync is enabled and the connection was verified.
    pub fn notify(self: &Arc<Self>) {
        if !self.orchestrator.auto_sync_ready() {
            tracing::debug!("auto-sync not armed, ignoring change");
            return;
        }
        self.schedule();
    }

    /// True while a pass is scheduled but not yet started.
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Drops the pending pass, if any. Returns true if one was dropped.
    pub fn cancel(&self) -> bool {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        match pending.take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Stops scheduling and waits for every started pass to finish.
    ///
    /// Returns true if changes are still unsynced: a pass was waiting out
    /// its window, or a change arrived while shutting down.
    pub async fn shutdown(&self) -> bool {
        self.closed.store(true, Ordering::SeqCst);
        let dropped = self.cancel();
        loop {
            let tasks = {
                let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
                std::mem::take(&mut *tasks)
            };
            if tasks.is_empty() {
                break;
            }
            for task in tasks {
                if let Err(e) = task.await {
                    if !e.is_cancelled() {
                        tracing::warn!("auto-sync pass ended abnormally: {e}");
                    }
                }
            }
        }
        dropped || self.deferred.swap(false, Ordering::SeqCst)
    }

    fn schedule(self: &Arc<Self>) {
        if self.closed.load(Ordering::SeqCst) {
            self.deferred.store(true, Ordering::SeqCst);
            return;
        }
        let token = CancellationToken::new();
        let previous = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(token.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }

        let this = Arc::clone(self);
        let task = self.runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(this.window) => {}
            }
            if !this.take_pending(&token) {
                return;
            }

            match this.orchestrator.sync_now(Trigger::Auto).await {
                Ok(report) if report.skipped => tracing::debug!("auto-sync: remote already current"),
                Ok(report) => tracing::info!(
                    trees = report.trees,
                    notes = report.notes,
                    "auto-sync complete"
                ),
                Err(SyncError::Busy) => {
                    tracing::debug!("auto-sync deferred, another pass is running");
                    this.schedule();
                }
                Err(e) => tracing::warn!("auto-sync failed: {e}"),
            }
        });

        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.retain(|task| !task.is_finished());
        tasks.push(task);
    }

    /// Clears the pending slot if `token` still owns it.
    fn take_pending(&self, token: &CancellationToken) -> bool {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        // A newer schedule replaces the slot and cancels this token
        if token.is_cancelled() {
            return false;
        }
        *pending = None;
        true
    }
}

impl<T: HttpTransport + 'static> Drop for AutoSync<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}
