// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::Result;
use crate::sync::{HttpTransport, Orchestrator, RepositoryInfo};

use super::{block_on, open_workspace};

pub fn run() -> Result<()> {
    let workspace = open_workspace()?;
    let orchestrator = workspace.connect_remote()?;
    let info = block_on(run_impl(&orchestrator))??;

    let visibility = if info.private { "private" } else { "public" };
    println!("Connected to {} ({})", info.full_name, visibility);
    Ok(())
}

pub(crate) async fn run_impl<T: HttpTransport>(
    orchestrator: &Orchestrator<T>,
) -> Result<RepositoryInfo> {
    Ok(orchestrator.test_connection().await?)
}

#[cfg(test)]
#[path = "connect_tests.rs"]
mod tests;
