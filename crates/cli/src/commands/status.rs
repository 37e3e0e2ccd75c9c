// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt::Write;

use kt_core::backup::statistics;
use kt_core::Dataset;

use crate::config::SyncSettings;
use crate::env;
use crate::error::Result;
use crate::sync::{HttpTransport, Orchestrator};

use super::{block_on, open_workspace};

pub fn run(remote: bool) -> Result<()> {
    let workspace = open_workspace()?;
    let settings = workspace
        .config
        .sync
        .clone()
        .with_credential_override(env::token());
    print!("{}", render_local(&workspace.store.snapshot(), &settings));

    if remote {
        let orchestrator = workspace.connect_remote()?;
        print!("{}", block_on(render_remote(&orchestrator))??);
    }
    Ok(())
}

/// Item counts and the stored sync settings.
pub(crate) fn render_local(data: &Dataset, settings: &SyncSettings) -> String {
    let stats = statistics(&data.trees, &data.notes);
    let mut out = String::new();
    let _ = writeln!(out, "Trees:       {}", stats.trees_count);
    let _ = writeln!(out, "Notes:       {}", stats.notes_count);
    let _ = writeln!(out, "Nodes:       {}", stats.total_nodes);

    if settings.is_configured() {
        let _ = writeln!(
            out,
            "Sync:        {} (branch {})",
            settings.repository, settings.branch
        );
    } else {
        let _ = writeln!(out, "Sync:        not configured");
    }
    let _ = writeln!(
        out,
        "Auto-sync:   {}",
        if settings.auto_sync {
            "enabled"
        } else {
            "disabled"
        }
    );
    match settings.last_sync_at {
        Some(at) => {
            let _ = writeln!(out, "Last sync:   {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
        }
        None => {
            let _ = writeln!(out, "Last sync:   never");
        }
    }
    out
}

/// Probes the remote and reports reachability and the rate budget.
pub(crate) async fn render_remote<T: HttpTransport>(orchestrator: &Orchestrator<T>) -> Result<String> {
    let info = orchestrator.test_connection().await?;
    let budget = orchestrator.client().context().gate.budget().await;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Remote:      {} ({})",
        info.full_name,
        if info.private { "private" } else { "public" }
    );
    let _ = writeln!(
        out,
        "Rate limit:  {}/{} remaining, resets {}",
        budget.remaining,
        budget.limit,
        budget.reset_at().format("%H:%M:%S UTC")
    );
    Ok(out)
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
