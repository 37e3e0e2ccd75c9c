// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Long-running auto-sync.
//!
//! Polls the data file for changes made by other `kt` invocations and
//! feeds them to the debouncer until Ctrl-C.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::store::FileStore;
use crate::sync::{
    spawn_sweeper, AutoSync, HttpTransport, Orchestrator, SyncError, Trigger, SWEEP_INTERVAL,
};

use super::{block_on, open_workspace};

/// How often the data file is checked for changes.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

pub fn run() -> Result<()> {
    let workspace = open_workspace()?;
    if !workspace.config.sync.auto_sync {
        return Err(Error::AutoSyncDisabled);
    }
    let settings = workspace.sync_settings()?;
    let orchestrator = Arc::new(workspace.connect_remote()?);
    let store = Arc::clone(&workspace.store);

    block_on(run_impl(
        store,
        orchestrator,
        settings.debounce(),
        POLL_INTERVAL,
        shutdown_signal(),
    ))?
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("cannot listen for Ctrl-C: {e}");
    }
}

/// Watches `store` until `shutdown` completes, then flushes a pending pass.
pub(crate) async fn run_impl<T: HttpTransport + 'static>(
    store: Arc<FileStore>,
    orchestrator: Arc<Orchestrator<T>>,
    window: Duration,
    poll: Duration,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    let info = orchestrator.test_connection().await?;
    println!(
        "Watching {} for changes, backing up to {} (Ctrl-C to stop)",
        store.path().display(),
        info.full_name
    );

    let cancel = CancellationToken::new();
    let sweeper = spawn_sweeper(
        Arc::clone(&orchestrator.client().context().cache),
        SWEEP_INTERVAL,
        cancel.clone(),
    );
    let auto = AutoSync::new(Arc::clone(&orchestrator), window, Handle::current());
    auto.attach(store.as_ref());

    tokio::pin!(shutdown);
    let mut ticker = tokio::time::interval(poll);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                if let Err(e) = store.reload_if_changed() {
                    tracing::warn!("failed to reload data file: {e}");
                }
            }
        }
    }

    cancel.cancel();
    if let Err(e) = sweeper.await {
        tracing::warn!("cache sweeper ended abnormally: {e}");
    }

    if auto.shutdown().await {
        tracing::info!("syncing pending changes before exit");
        match orchestrator.sync_now(Trigger::Auto).await {
            Ok(_) | Err(SyncError::Busy) => {}
            Err(e) => return Err(e.into()),
        }
    }
    println!("Stopped watching");
    Ok(())
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
