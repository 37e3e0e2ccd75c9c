// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for kt-core operations.

use thiserror::Error;

/// All possible errors that can occur in kt-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("unrecognized backup format\n  hint: expected a full backup or a document with 'trees' and/or 'notes'")]
    UnrecognizedFormat,

    #[error("backup contains no trees and no notes")]
    EmptyBackup,

    #[error("invalid backup: {0}")]
    Decode(String),

    #[error("invalid category: '{0}'\n  hint: valid categories are: business, technology, science, education, personal, other")]
    InvalidCategory(String),

    #[error("invalid item kind: '{0}'\n  hint: valid kinds are: trees, notes")]
    InvalidKind(String),

    #[error("invalid node level {level} for node '{node_id}'\n  hint: levels range from 0 to {max}")]
    InvalidNodeLevel {
        node_id: String,
        level: u8,
        max: u8,
    },

    #[error("node '{node_id}' has level {actual} but its parent requires {expected}")]
    LevelMismatch {
        node_id: String,
        expected: u8,
        actual: u8,
    },

    #[error("duplicate id '{0}'")]
    DuplicateId(String),

    #[error("item not found: {0}")]
    ItemNotFound(String),

    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for kt-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
