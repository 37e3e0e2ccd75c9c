// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Backup document codec.
//!
//! A backup is one self-describing JSON document holding every tree and
//! note. Three shapes are understood when decoding:
//!
//! - structured (`backup.type == "full_backup"`, version 2.x)
//! - legacy bare `{trees, notes}`
//! - single-category export `{category, trees|notes, exportedAt, version}`
//!
//! Encoding always produces the structured shape, except for
//! [`encode_category_export`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::item::{Category, ItemKind, Note, Tree};
use crate::node::{count_nodes, relink_parents, validate_forest};

/// Version written into structured backups.
pub const BACKUP_VERSION: &str = "2.0";

/// Value of `backup.type` that marks a structured backup.
pub const BACKUP_TYPE: &str = "full_backup";

/// Value of `backup.createdBy`.
pub const CREATED_BY: &str = "Knowledge Trees App";

/// Version written into single-category exports.
pub const EXPORT_VERSION: &str = "1.0";

/// Machine that produced a backup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub os: String,
    #[serde(default)]
    pub arch: String,
    /// Name and version of the writing client.
    #[serde(default)]
    pub client: String,
}

impl DeviceInfo {
    /// Describes the current machine.
    ///
    /// The hostname comes from `HOSTNAME` or `COMPUTERNAME`, or "unknown".
    pub fn current(client: impl Into<String>) -> Self {
        let hostname = std::env::var("HOSTNAME")
            .or_else(|_| std::env::var("COMPUTERNAME"))
            .ok()
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| "unknown".to_string());
        DeviceInfo {
            hostname,
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            client: client.into(),
        }
    }
}

/// Application preferences carried in a backup.
///
/// Never contains the remote credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub auto_sync: bool,
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
    #[serde(default = "default_branch")]
    pub sync_branch: String,
}

fn default_theme() -> String {
    "auto".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            theme: default_theme(),
            language: default_language(),
            auto_sync: false,
            last_sync: None,
            sync_branch: default_branch(),
        }
    }
}

/// The `backup` header of a structured document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupHeader {
    pub version: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub created: DateTime<Utc>,
    pub created_by: String,
    pub device: DeviceInfo,
    pub total_items: usize,
}

/// Distinct categories per collection, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryLists {
    pub trees: Vec<Category>,
    pub notes: Vec<Category>,
}

/// Summary counts embedded in a structured document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub trees_count: usize,
    pub notes_count: usize,
    /// Nodes at every depth across all trees.
    pub total_nodes: usize,
    pub categories: CategoryLists,
}

/// The two item collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackupData {
    #[serde(default)]
    pub trees: Vec<Tree>,
    #[serde(default)]
    pub notes: Vec<Note>,
}

/// A structured (version 2) backup document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupDocument {
    pub backup: BackupHeader,
    pub statistics: Statistics,
    pub data: BackupData,
    pub settings: AppSettings,
}

impl BackupDocument {
    /// Serializes the document as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Which shape a decoded document had.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupFormat {
    Structured,
    Legacy,
    /// A single-collection export of the given kind.
    CategoryExport(ItemKind),
}

/// Validated contents of a backup document.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBackup {
    pub format: BackupFormat,
    pub trees: Vec<Tree>,
    pub notes: Vec<Note>,
    /// Present only for structured documents with a readable settings block.
    pub settings: Option<AppSettings>,
}

impl DecodedBackup {
    pub fn total_items(&self) -> usize {
        self.trees.len() + self.notes.len()
    }
}

/// Computes the statistics block for a dataset.
pub fn statistics(trees: &[Tree], notes: &[Note]) -> Statistics {
    Statistics {
        trees_count: trees.len(),
        notes_count: notes.len(),
        total_nodes: trees.iter().map(|t| count_nodes(&t.nodes)).sum(),
        categories: CategoryLists {
            trees: distinct(trees.iter().map(|t| t.category)),
            notes: distinct(notes.iter().map(|n| n.category)),
        },
    }
}

fn distinct(categories: impl Iterator<Item = Category>) -> Vec<Category> {
    let mut seen = Vec::new();
    for category in categories {
        if !seen.contains(&category) {
            seen.push(category);
        }
    }
    seen
}

/// Builds a structured backup of the given dataset.
pub fn encode(
    trees: Vec<Tree>,
    notes: Vec<Note>,
    device: DeviceInfo,
    settings: AppSettings,
    created: DateTime<Utc>,
) -> BackupDocument {
    BackupDocument {
        backup: BackupHeader {
            version: BACKUP_VERSION.to_string(),
            kind: BACKUP_TYPE.to_string(),
            created,
            created_by: CREATED_BY.to_string(),
            device,
            total_items: trees.len() + notes.len(),
        },
        statistics: statistics(&trees, &notes),
        data: BackupData { trees, notes },
        settings,
    }
}

/// Builds a single-collection export document.
///
/// Only the collection named by `kind` is written; the other is ignored.
pub fn encode_category_export(
    kind: ItemKind,
    trees: &[Tree],
    notes: &[Note],
    exported_at: DateTime<Utc>,
) -> Result<Value> {
    let items = match kind {
        ItemKind::Tree => serde_json::to_value(trees)?,
        ItemKind::Note => serde_json::to_value(notes)?,
    };
    let mut doc = Map::new();
    doc.insert(kind.as_str().to_string(), items);
    doc.insert(
        "exportedAt".to_string(),
        serde_json::to_value(exported_at)?,
    );
    doc.insert("category".to_string(), Value::from(kind.as_str()));
    doc.insert("version".to_string(), Value::from(EXPORT_VERSION));
    Ok(Value::Object(doc))
}

/// Decodes and validates a backup document of any supported shape.
pub fn decode(raw: &str) -> Result<DecodedBackup> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| Error::Decode(format!("invalid json: {e}")))?;
    let Value::Object(mut root) = value else {
        return Err(Error::UnrecognizedFormat);
    };
    let format = detect_format(&root)?;

    let (trees, notes, settings) = match format {
        BackupFormat::Structured => {
            check_version(&root)?;
            let mut data = match root.remove("data") {
                Some(Value::Object(data)) => data,
                None | Some(Value::Null) => Map::new(),
                Some(_) => return Err(Error::Decode("'data' is not an object".to_string())),
            };
            let settings = root.remove("settings").and_then(|s| {
                serde_json::from_value::<AppSettings>(s)
                    .map_err(|e| tracing::warn!("ignoring unreadable backup settings: {e}"))
                    .ok()
            });
            (data.remove("trees"), data.remove("notes"), settings)
        }
        BackupFormat::Legacy => (root.remove("trees"), root.remove("notes"), None),
        BackupFormat::CategoryExport(ItemKind::Tree) => (root.remove("trees"), None, None),
        BackupFormat::CategoryExport(ItemKind::Note) => (None, root.remove("notes"), None),
    };

    let mut trees: Vec<Tree> = parse_collection(trees, "trees")?;
    let notes: Vec<Note> = parse_collection(notes, "notes")?;

    check_unique(trees.iter().map(|t| t.id.as_str()), "tree")?;
    check_unique(notes.iter().map(|n| n.id.as_str()), "note")?;

    for tree in &mut trees {
        let relinked = relink_parents(&mut tree.nodes);
        if relinked > 0 {
            tracing::debug!(tree = %tree.id, relinked, "repaired stale node parent references");
        }
        validate_forest(&tree.nodes)
            .map_err(|e| Error::Decode(format!("tree '{}': {e}", tree.id)))?;
    }

    let is_export = matches!(format, BackupFormat::CategoryExport(_));
    if trees.is_empty() && notes.is_empty() && !is_export {
        return Err(Error::EmptyBackup);
    }

    if format == BackupFormat::Structured {
        let declared = root
            .get("backup")
            .and_then(|b| b.get("totalItems"))
            .and_then(Value::as_u64);
        let actual = (trees.len() + notes.len()) as u64;
        if let Some(declared) = declared {
            if declared != actual {
                tracing::warn!(declared, actual, "backup totalItems disagrees with its payload");
            }
        }
    }

    Ok(DecodedBackup {
        format,
        trees,
        notes,
        settings,
    })
}

/// Returns true if two encoded documents carry the same items.
///
/// For structured backups only `data` is compared; the header timestamp,
/// device and settings are ignored. Anything else compares byte for byte.
pub fn same_payload(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    match (structured_data(a), structured_data(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn structured_data(raw: &str) -> Option<Value> {
    let mut root: Value = serde_json::from_str(raw).ok()?;
    let backup_type = root
        .get("backup")
        .and_then(|b| b.get("type"))
        .and_then(Value::as_str);
    if backup_type != Some(BACKUP_TYPE) {
        return None;
    }
    root.get_mut("data").map(Value::take)
}

fn detect_format(root: &Map<String, Value>) -> Result<BackupFormat> {
    let backup_type = root
        .get("backup")
        .and_then(|b| b.get("type"))
        .and_then(Value::as_str);
    if backup_type == Some(BACKUP_TYPE) {
        return Ok(BackupFormat::Structured);
    }

    if let Some(category) = root.get("category").and_then(Value::as_str) {
        if let Ok(kind) = category.parse::<ItemKind>() {
            if root.contains_key(kind.as_str()) {
                return Ok(BackupFormat::CategoryExport(kind));
            }
        }
    }

    if root.contains_key("trees") || root.contains_key("notes") {
        return Ok(BackupFormat::Legacy);
    }
    Err(Error::UnrecognizedFormat)
}

fn check_version(root: &Map<String, Value>) -> Result<()> {
    // A header without a version predates versioning and is read as 2.x
    let Some(version) = root.get("backup").and_then(|b| b.get("version")) else {
        return Ok(());
    };
    let text = match version {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => return Err(Error::Decode(format!("invalid backup version: {other}"))),
    };
    let major = text.split('.').next().and_then(|m| m.trim().parse::<u32>().ok());
    match major {
        Some(2) => Ok(()),
        _ => Err(Error::Decode(format!(
            "unsupported backup version '{text}' (expected 2.x)"
        ))),
    }
}

fn parse_collection<T: serde::de::DeserializeOwned>(
    value: Option<Value>,
    name: &str,
) -> Result<Vec<T>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => {
            serde_json::from_value(value).map_err(|e| Error::Decode(format!("{name}: {e}")))
        }
    }
}

fn check_unique<'a>(ids: impl Iterator<Item = &'a str>, what: &str) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(Error::Decode(format!("duplicate {what} id '{id}'")));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "backup_tests.rs"]
mod tests;
