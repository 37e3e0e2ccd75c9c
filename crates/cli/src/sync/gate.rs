// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rate limiter and request gate.
//!
//! Every remote call is admitted by [`RateGate::admit`] and its response
//! recorded with [`RateGate::record`]. The budget is taken only from the
//! `X-RateLimit-*` headers of responses, including error responses.
//!
//! Two independent mechanisms apply:
//! - a hard gate: at or below the threshold, before the reset time, the
//!   call fails fast or waits for the reset depending on [`GatePolicy`]
//! - advisory pacing: a short sleep once the budget runs low

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::clock::ClockSource;
use super::response::RemoteError;
use super::transport::HttpResponse;

/// Remaining calls at or below which the hard gate engages.
pub const DEFAULT_THRESHOLD: u64 = 10;

/// Budget assumed before the first response arrives.
pub const INITIAL_REMAINING: u64 = 5000;

/// Longest wait for a reset under the default policy.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(60);

/// Remote rate budget as last reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateBudget {
    pub remaining: u64,
    /// Size of a full window (`X-RateLimit-Limit`).
    pub limit: u64,
    /// Window reset, in seconds since Unix epoch.
    pub reset_at_secs: u64,
}

impl Default for RateBudget {
    fn default() -> Self {
        RateBudget {
            remaining: INITIAL_REMAINING,
            limit: INITIAL_REMAINING,
            reset_at_secs: 0,
        }
    }
}

impl RateBudget {
    pub fn reset_at(&self) -> DateTime<Utc> {
        i64::try_from(self.reset_at_secs)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_default()
    }

    /// Updates the budget from response headers.
    ///
    /// Missing or unparseable headers leave their field unchanged.
    pub fn observe(&mut self, response: &HttpResponse) {
        if let Some(remaining) = header_u64(response, "x-ratelimit-remaining") {
            self.remaining = remaining;
        }
        if let Some(limit) = header_u64(response, "x-ratelimit-limit") {
            self.limit = limit;
        }
        if let Some(reset) = header_u64(response, "x-ratelimit-reset") {
            self.reset_at_secs = reset;
        }
    }
}

fn header_u64(response: &HttpResponse, name: &str) -> Option<u64> {
    response.header(name).and_then(|v| v.trim().parse().ok())
}

/// Advisory delay before a call, by remaining budget.
pub fn pacing_delay(remaining: u64) -> Duration {
    match remaining {
        0..=199 => Duration::from_millis(500),
        200..=499 => Duration::from_millis(200),
        _ => Duration::ZERO,
    }
}

/// What the gate does when the budget is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePolicy {
    /// Fail immediately with `RateLimitExceeded`.
    FailFast,
    /// Suspend the caller until the reset, unless it is further than `max_wait`.
    Wait { max_wait: Duration },
}

impl Default for GatePolicy {
    fn default() -> Self {
        GatePolicy::Wait {
            max_wait: DEFAULT_MAX_WAIT,
        }
    }
}

/// Throttles outbound calls against the remote budget.
pub struct RateGate {
    budget: Mutex<RateBudget>,
    threshold: u64,
    policy: GatePolicy,
    clock: Arc<dyn ClockSource>,
}

impl RateGate {
    pub fn new(policy: GatePolicy, clock: Arc<dyn ClockSource>) -> Self {
        RateGate {
            budget: Mutex::new(RateBudget::default()),
            threshold: DEFAULT_THRESHOLD,
            policy,
            clock,
        }
    }

    pub fn with_threshold(mut self, threshold: u64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn policy(&self) -> GatePolicy {
        self.policy
    }

    /// Returns a copy of the current budget.
    pub async fn budget(&self) -> RateBudget {
        *self.budget.lock().await
    }

    /// Waits until a call may be issued, or fails if it may not.
    pub async fn admit(&self) -> Result<(), RemoteError> {
        let observed = self.budget().await;
        let now_ms = self.clock.now_ms();
        let reset_ms = observed.reset_at_secs.saturating_mul(1000);

        if observed.remaining <= self.threshold && now_ms < reset_ms {
            let wait = Duration::from_millis(reset_ms - now_ms);
            let exceeded = RemoteError::RateLimitExceeded {
                reset_at: observed.reset_at(),
            };
            match self.policy {
                GatePolicy::FailFast => return Err(exceeded),
                GatePolicy::Wait { max_wait } if wait > max_wait => {
                    tracing::warn!(
                        wait_secs = wait.as_secs(),
                        max_wait_secs = max_wait.as_secs(),
                        "rate limit reset too far away"
                    );
                    return Err(exceeded);
                }
                GatePolicy::Wait { .. } => {
                    tracing::info!(
                        remaining = observed.remaining,
                        wait_secs = wait.as_secs(),
                        "rate limit low, waiting for reset"
                    );
                    tokio::time::sleep(wait).await;
                    let mut budget = self.budget.lock().await;
                    // A fresh window is assumed until the next response says otherwise
                    if budget.reset_at_secs == observed.reset_at_secs {
                        budget.remaining = budget.limit;
                    }
                }
            }
        }

        let delay = pacing_delay(self.budget().await.remaining);
        if !delay.is_zero() {
            tracing::debug!(delay_ms = delay.as_millis() as u64, "pacing remote call");
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    /// Records the budget headers of a response. Returns the updated budget.
    pub async fn record(&self, response: &HttpResponse) -> RateBudget {
        let mut budget = self.budget.lock().await;
        budget.observe(response);
        *budget
    }
}
