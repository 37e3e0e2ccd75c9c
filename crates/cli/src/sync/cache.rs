// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Short-lived cache of remote object versions.
//!
//! Maps a path to the last observed concurrency token and content, so an
//! upload can skip the token lookup and skip writing identical content.
//! The cache is never authoritative for reads.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::clock::ClockSource;

/// Default number of cached paths.
pub const DEFAULT_CAPACITY: usize = 256;

/// Default lifetime of an entry.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Default interval of the background sweeper.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub token: String,
    pub content: String,
    pub stored_at_ms: u64,
}

pub struct ObjectCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    capacity: usize,
    ttl: Duration,
    clock: Arc<dyn ClockSource>,
}

impl ObjectCache {
    pub fn new(clock: Arc<dyn ClockSource>) -> Self {
        Self::with_limits(clock, DEFAULT_CAPACITY, DEFAULT_TTL)
    }

    pub fn with_limits(clock: Arc<dyn ClockSource>, capacity: usize, ttl: Duration) -> Self {
        ObjectCache {
            entries: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
            ttl,
            clock,
        }
    }

    fn is_expired(&self, entry: &CacheEntry, now_ms: u64) -> bool {
        now_ms.saturating_sub(entry.stored_at_ms) >= self.ttl.as_millis() as u64
    }

    /// Returns the live entry for a path; expired entries are dropped.
    pub fn get(&self, path: &str) -> Option<CacheEntry> {
        let now_ms = self.clock.now_ms();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(path) {
            Some(entry) if self.is_expired(entry, now_ms) => {
                entries.remove(path);
                None
            }
            Some(entry) => Some(entry.clone()),
            None => None,
        }
    }

    /// Stores the version of a path, evicting the oldest entry when full.
    pub fn put(&self, path: &str, token: &str, content: &str) {
        let now_ms = self.clock.now_ms();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if !entries.contains_key(path) && entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.stored_at_ms)
                .map(|(p, _)| p.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }
        entries.insert(
            path.to_string(),
            CacheEntry {
                token: token.to_string(),
                content: content.to_string(),
                stored_at_ms: now_ms,
            },
        );
    }

    pub fn evict(&self, path: &str) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(path);
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    /// Drops expired entries. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let now_ms = self.clock.now_ms();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry, now_ms));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Spawns a task that sweeps `cache` every `interval` until cancelled.
pub fn spawn_sweeper(
    cache: Arc<ObjectCache>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(interval) => {
                    let removed = cache.sweep();
                    if removed > 0 {
                        tracing::debug!(removed, "swept expired cache entries");
                    }
                }
            }
        }
    })
}
