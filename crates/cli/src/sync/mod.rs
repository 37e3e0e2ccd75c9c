// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Backup sync against a remote versioned object store.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌─────────────┐     ┌──────────┐
//! │ Orchestrator │────►│ContentsClient│────►│  Transport  │────►│  Remote  │
//! │  (AutoSync)  │◄────│              │◄────│   (trait)   │◄────│ contents │
//! └──────────────┘     └──────────────┘     └─────────────┘     └──────────┘
//!        │                    │
//!        ▼                    ▼
//! ┌──────────────┐     ┌──────────────┐
//! │ Local store  │     │ SyncContext  │  (rate gate, object cache, clock)
//! └──────────────┘     └──────────────┘
//! ```
//!
//! # Features
//!
//! - One composite backup object per repository, written with
//!   optimistic concurrency tokens
//! - Rate budget tracking from response headers, with pacing and a
//!   fail-fast or wait-for-reset gate
//! - Debounced automatic sync after local changes
//! - Restore with legacy-path fallback, and best-effort repository clear
//! - Injectable transport and clock for testing

mod autosync;
mod cache;
mod client;
mod clock;
mod context;
mod gate;
mod orchestrator;
mod response;
mod transport;

pub use autosync::{AutoSync, DEFAULT_WINDOW};
pub use cache::{spawn_sweeper, ObjectCache, SWEEP_INTERVAL};
pub use client::{
    ContentsClient, EntryKind, ObjectEntry, RemoteObject, RemoteResult, RepositoryInfo,
    UploadOutcome, VersionCheck,
};
pub use clock::{ClockSource, SystemClock};
pub use context::{RemoteTarget, SyncContext, BACKUP_PATH, LEGACY_BACKUP_PATH};
pub use gate::{GatePolicy, RateBudget, RateGate};
pub use orchestrator::{
    ClearReport, LastSyncStore, Orchestrator, Phase, RestoreReport, SyncError, SyncReport,
    SyncResult, SyncState, Trigger,
};
pub use response::RemoteError;
pub use transport::{
    HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport, TransportError,
};

#[cfg(test)]
pub(crate) mod test_helpers;

#[cfg(test)]
mod autosync_tests;



#[cfg(test)]
mod gate_tests;
