// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! kt-core: Shared library for the ktree organizer
//!
//! This crate provides the item model, node forest rules, the wire text
//! encoding, the backup codec and the local store interface used by the
//! kt CLI and its sync layer.

pub mod backup;
pub mod encoding;
pub mod error;
pub mod item;
pub mod merge;
pub mod node;
pub mod store;

pub use backup::{AppSettings, BackupDocument, BackupFormat, DecodedBackup, DeviceInfo};
pub use error::{Error, Result};
pub use item::{Category, Item, ItemKind, Node, Note, Tree};
pub use merge::{Merge, MergeOutcome};
pub use store::{apply_restore, ApplyMode, Dataset, MemoryStore, Store};
