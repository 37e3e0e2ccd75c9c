// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared state of one sync session.

use std::sync::Arc;

use super::cache::ObjectCache;
use super::clock::{ClockSource, SystemClock};
use super::gate::{GatePolicy, RateGate};

/// Remote path of the composite backup.
pub const BACKUP_PATH: &str = "backup.json";

/// Path written by older clients, read as a restore fallback.
pub const LEGACY_BACKUP_PATH: &str = "knowledge-backup.json";

/// Repository and branch that sync targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    /// `owner/name`.
    pub repository: String,
    pub branch: String,
}

/// Rate budget, object cache and clock, constructed once and handed to
/// the client and the orchestrator.
pub struct SyncContext {
    pub target: RemoteTarget,
    pub gate: RateGate,
    pub cache: Arc<ObjectCache>,
    pub clock: Arc<dyn ClockSource>,
}

impl SyncContext {
    pub fn new(target: RemoteTarget, policy: GatePolicy) -> Self {
        Self::with_clock(target, policy, Arc::new(SystemClock))
    }

    pub fn with_clock(target: RemoteTarget, policy: GatePolicy, clock: Arc<dyn ClockSource>) -> Self {
        SyncContext {
            target,
            gate: RateGate::new(policy, Arc::clone(&clock)),
            cache: Arc::new(ObjectCache::new(Arc::clone(&clock))),
            clock,
        }
    }
}
