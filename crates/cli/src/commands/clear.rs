// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::{Error, Result};
use crate::sync::{ClearReport, HttpTransport, Orchestrator};

use super::{block_on, open_workspace};

pub fn run(yes: bool) -> Result<()> {
    if !yes {
        return Err(Error::ConfirmationRequired {
            action: "clear the repository",
        });
    }

    let workspace = open_workspace()?;
    let orchestrator = workspace.connect_remote()?;
    let report = block_on(run_impl(&orchestrator))??;

    println!(
        "Deleted {} objects from {}",
        report.deleted, workspace.config.sync.repository
    );
    if report.failed > 0 {
        eprintln!(
            "warning: {} objects could not be deleted; run 'kt clear --yes' again",
            report.failed
        );
    }
    Ok(())
}

pub(crate) async fn run_impl<T: HttpTransport>(orchestrator: &Orchestrator<T>) -> Result<ClearReport> {
    Ok(orchestrator.clear_repository().await?)
}

#[cfg(test)]
#[path = "clear_tests.rs"]
mod tests;
