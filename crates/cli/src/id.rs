// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Identifiers for trees, notes and nodes created from the CLI.
//!
//! Ids look like `tree-1a2b3c4d`: a kind prefix and 8 hex chars of
//! SHA-256 over the title and the creation time in nanoseconds.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// What an id names. Determines the prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Tree,
    Note,
    Node,
}

impl IdKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            IdKind::Tree => "tree",
            IdKind::Note => "note",
            IdKind::Node => "node",
        }
    }
}

/// Derives the base id for `title` created at `created_at`.
pub fn generate_id(kind: IdKind, title: &str, created_at: &DateTime<Utc>) -> String {
    let stamp = created_at
        .timestamp_nanos_opt()
        .unwrap_or_else(|| created_at.timestamp_micros());
    let hash = Sha256::digest(format!("{title}\0{stamp}").as_bytes());
    format!("{}-{}", kind.prefix(), hex::encode(&hash[..4]))
}

/// Derives an id that `taken` reports as free.
///
/// Collisions get a `-2`, `-3`, ... suffix.
pub fn unique_id(
    kind: IdKind,
    title: &str,
    created_at: &DateTime<Utc>,
    taken: impl Fn(&str) -> bool,
) -> String {
    let base = generate_id(kind, title, created_at);
    if !taken(&base) {
        return base;
    }
    (2u32..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or(base)
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
