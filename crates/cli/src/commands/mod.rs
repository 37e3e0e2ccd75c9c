// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod add;
pub mod clear;
pub mod config;
pub mod connect;
pub mod export;
pub mod import;
pub mod init;
pub mod list;
pub mod node;
pub mod restore;
pub mod status;
pub mod sync;
#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;
pub mod watch;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use kt_core::{DeviceInfo, Store};

use crate::config::{find_work_dir, get_data_path, Config, ConfigLastSync, SyncSettings};
use crate::env;
use crate::error::{Error, Result};
use crate::store::FileStore;
use crate::sync::{ContentsClient, HttpTransport, Orchestrator, ReqwestTransport, SyncContext};

/// Sent as `User-Agent` and recorded in backups as the creating client.
pub const CLIENT_ID: &str = concat!("ktree/", env!("CARGO_PKG_VERSION"));

/// An opened `.ktree/` directory.
pub struct Workspace {
    pub work_dir: PathBuf,
    pub config: Config,
    pub store: Arc<FileStore>,
}

impl Workspace {
    pub fn open(work_dir: PathBuf) -> Result<Self> {
        let config = Config::load(&work_dir)?;
        let store = FileStore::open(&get_data_path(&work_dir))?;
        Ok(Workspace {
            work_dir,
            config,
            store: Arc::new(store),
        })
    }

    /// Sync settings with `KT_TOKEN` applied, checked for completeness.
    pub fn sync_settings(&self) -> Result<SyncSettings> {
        let settings = self
            .config
            .sync
            .clone()
            .with_credential_override(env::token());
        settings.validate()?;
        Ok(settings)
    }

    /// Builds an orchestrator over `transport` that records syncs in `config.toml`.
    pub fn orchestrator<T: HttpTransport>(
        &self,
        settings: &SyncSettings,
        transport: T,
        ctx: Arc<SyncContext>,
    ) -> Orchestrator<T> {
        let client = ContentsClient::new(transport, ctx);
        let store: Arc<dyn Store> = self.store.clone();
        Orchestrator::new(
            client,
            store,
            DeviceInfo::current(CLIENT_ID),
            settings.app_settings(),
        )
        .with_last_sync_store(Arc::new(ConfigLastSync::new(&self.work_dir)))
    }

    /// Builds an orchestrator talking to the configured API over HTTPS.
    pub fn connect_remote(&self) -> Result<Orchestrator<ReqwestTransport>> {
        let settings = self.sync_settings()?;
        let transport = ReqwestTransport::new(&settings.api_base, &settings.credential, CLIENT_ID)?;
        let ctx = Arc::new(SyncContext::new(settings.target(), settings.gate_policy()));
        Ok(self.orchestrator(&settings, transport, ctx))
    }
}

/// Helper to open the workspace from the current context.
pub fn open_workspace() -> Result<Workspace> {
    Workspace::open(find_work_dir()?)
}

/// Runs `future` to completion on a fresh multi-threaded runtime.
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Runtime(format!("failed to start runtime: {}", e)))?;
    Ok(runtime.block_on(future))
}
