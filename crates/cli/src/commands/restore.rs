// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use kt_core::ApplyMode;

use crate::error::Result;
use crate::sync::{HttpTransport, Orchestrator, RestoreReport};

use super::{block_on, open_workspace};

pub fn run(replace: bool) -> Result<()> {
    let mode = if replace {
        ApplyMode::Replace
    } else {
        ApplyMode::Merge
    };
    let workspace = open_workspace()?;
    let orchestrator = workspace.connect_remote()?;
    let report = block_on(run_impl(&orchestrator, mode))??;

    println!(
        "Restored {} trees and {} notes from {} ({} new, {} updated)",
        report.trees,
        report.notes,
        report.source,
        report.outcome.inserted,
        report.outcome.updated
    );
    Ok(())
}

/// Matching local ids are overwritten without confirmation.
pub(crate) async fn run_impl<T: HttpTransport>(
    orchestrator: &Orchestrator<T>,
    mode: ApplyMode,
) -> Result<RestoreReport> {
    Ok(orchestrator.restore(mode).await?)
}

#[cfg(test)]
#[path = "restore_tests.rs"]
mod tests;
