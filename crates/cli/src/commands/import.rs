// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::fs;
use std::path::Path;

use kt_core::backup::{self, BackupFormat};
use kt_core::{apply_restore, ApplyMode, Item, ItemKind, MergeOutcome, Store};

use crate::error::Result;

use super::open_workspace;

/// What an import read and how it changed the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportReport {
    pub format: BackupFormat,
    pub trees: usize,
    pub notes: usize,
    pub outcome: MergeOutcome,
}

pub fn run(filepath: &str, replace: bool) -> Result<()> {
    let workspace = open_workspace()?;
    let mode = if replace {
        ApplyMode::Replace
    } else {
        ApplyMode::Merge
    };
    let report = run_impl(workspace.store.as_ref(), Path::new(filepath), mode)?;

    println!(
        "Imported {} trees and {} notes from {} ({} new, {} updated)",
        report.trees, report.notes, filepath, report.outcome.inserted, report.outcome.updated
    );
    Ok(())
}

/// Decodes a local document and applies it to `store`.
///
/// A single-collection export with `Replace` only replaces that collection.
pub(crate) fn run_impl(store: &dyn Store, path: &Path, mode: ApplyMode) -> Result<ImportReport> {
    let raw = fs::read_to_string(path)?;
    let decoded = backup::decode(&raw)?;
    let (trees, notes) = (decoded.trees.len(), decoded.notes.len());

    let outcome = match (decoded.format, mode) {
        (BackupFormat::CategoryExport(kind), ApplyMode::Replace) => {
            let items: Vec<Item> = match kind {
                ItemKind::Tree => decoded.trees.into_iter().map(Item::from).collect(),
                ItemKind::Note => decoded.notes.into_iter().map(Item::from).collect(),
            };
            let outcome = MergeOutcome {
                inserted: items.len(),
                updated: 0,
            };
            store.replace_all(kind, items)?;
            outcome
        }
        _ => apply_restore(store, decoded.trees, decoded.notes, mode)?,
    };

    Ok(ImportReport {
        format: decoded.format,
        trees,
        notes,
        outcome,
    })
}

#[cfg(test)]
#[path = "import_tests.rs"]
mod tests;
