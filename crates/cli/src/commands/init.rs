// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::{Path, PathBuf};

use kt_core::{ItemKind, Store};

use crate::config::{get_data_path, init_work_dir};
use crate::error::Result;
use crate::store::FileStore;

pub fn run(path: Option<String>) -> Result<()> {
    let target_path = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir()?,
    };

    let work_dir = run_impl(&target_path)?;

    println!("Initialized ktree at {}", work_dir.display());
    println!("Next: kt config set sync.repository <owner/name>");
    Ok(())
}

/// Creates `.ktree/` under `target_path` with an empty data file.
pub(crate) fn run_impl(target_path: &Path) -> Result<PathBuf> {
    let work_dir = init_work_dir(target_path)?;
    let store = FileStore::open(&get_data_path(&work_dir))?;
    if !store.path().exists() {
        store.replace_all(ItemKind::Tree, Vec::new())?;
    }
    Ok(work_dir)
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;
