// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::Result;
use crate::sync::{HttpTransport, Orchestrator, SyncReport, Trigger, BACKUP_PATH};

use super::{block_on, open_workspace};

pub fn run() -> Result<()> {
    let workspace = open_workspace()?;
    let orchestrator = workspace.connect_remote()?;
    let report = block_on(run_impl(&orchestrator))??;

    if report.skipped {
        println!("Backup already up to date ({} trees, {} notes)", report.trees, report.notes);
    } else {
        println!(
            "Backed up {} trees and {} notes to {}/{}",
            report.trees, report.notes, workspace.config.sync.repository, BACKUP_PATH
        );
    }
    Ok(())
}

pub(crate) async fn run_impl<T: HttpTransport>(orchestrator: &Orchestrator<T>) -> Result<SyncReport> {
    Ok(orchestrator.sync_now(Trigger::Manual).await?)
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
