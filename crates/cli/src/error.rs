// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::{RemoteError, SyncError, TransportError};

/// All possible errors that can occur in the ktrs library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not initialized: run 'kt init' first")]
    NotInitialized,

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("invalid repository '{0}'\n  hint: use the form owner/name, e.g. alice/notes-backup")]
    InvalidRepository(String),

    #[error("{field} cannot be empty")]
    FieldEmpty { field: &'static str },

    #[error("sync is not configured: {missing} is missing\n  hint: run 'kt config set {key} <value>'")]
    NotConfigured {
        missing: &'static str,
        key: &'static str,
    },

    #[error("unknown setting '{key}'\n  hint: valid settings are: {valid}")]
    UnknownSetting { key: String, valid: &'static str },

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("tree not found: {0}")]
    TreeNotFound(String),

    #[error("export path cannot be empty")]
    ExportPathEmpty,

    #[error("auto-sync is disabled\n  hint: run 'kt config set sync.auto_sync true'")]
    AutoSyncDisabled,

    #[error("refusing to {action} without confirmation\n  hint: pass --yes to {action}")]
    ConfirmationRequired { action: &'static str },

    #[error(transparent)]
    Core(#[from] kt_core::Error),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}

/// A specialized Result type for ktrs operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
