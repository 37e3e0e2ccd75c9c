// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use kt_core::backup::{self, AppSettings, DeviceInfo};
use kt_core::{Dataset, ItemKind};

use crate::cli::KindArg;
use crate::error::{Error, Result};

use super::{open_workspace, CLIENT_ID};

pub fn run(filepath: &str, category: Option<KindArg>) -> Result<()> {
    if filepath.trim().is_empty() {
        return Err(Error::ExportPathEmpty);
    }

    let workspace = open_workspace()?;
    let settings = workspace.config.sync.app_settings();
    let count = run_impl(
        &workspace.store.snapshot(),
        settings,
        category.map(ItemKind::from),
        Path::new(filepath),
        Utc::now(),
    )?;

    println!("Exported {} items to {}", count, filepath);
    Ok(())
}

/// Writes a full backup document, or a single-collection export when
/// `kind` is given. Returns the number of items written.
pub(crate) fn run_impl(
    data: &Dataset,
    settings: AppSettings,
    kind: Option<ItemKind>,
    path: &Path,
    now: DateTime<Utc>,
) -> Result<usize> {
    let (json, count) = match kind {
        None => {
            let document = backup::encode(
                data.trees.clone(),
                data.notes.clone(),
                DeviceInfo::current(CLIENT_ID),
                settings,
                now,
            );
            (document.to_json()?, data.trees.len() + data.notes.len())
        }
        Some(kind) => {
            let export = backup::encode_category_export(kind, &data.trees, &data.notes, now)?;
            let count = match kind {
                ItemKind::Tree => data.trees.len(),
                ItemKind::Note => data.notes.len(),
            };
            (serde_json::to_string_pretty(&export)?, count)
        }
    };

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::debug!(path = %path.display(), count, "export written");
    Ok(count)
}

#[cfg(test)]
#[path = "export_tests.rs"]
mod tests;
