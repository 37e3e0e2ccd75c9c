// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the rate gate.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use yare::parameterized;

use super::gate::*;
use super::response::RemoteError;
use super::test_helpers::{MockClock, START_MS};
use super::transport::HttpResponse;

const START_SECS: u64 = START_MS / 1000;

fn gate(policy: GatePolicy) -> RateGate {
    RateGate::new(policy, Arc::new(MockClock::new(START_MS)))
}

fn budget_response(remaining: u64, reset_secs: u64) -> HttpResponse {
    HttpResponse::new(200, "{}")
        .with_header("X-RateLimit-Remaining", remaining.to_string())
        .with_header("X-RateLimit-Limit", "5000")
        .with_header("X-RateLimit-Reset", reset_secs.to_string())
}

#[parameterized(
    plenty = { 5000, 0 },
    at_500 = { 500, 0 },
    below_500 = { 499, 200 },
    at_200 = { 200, 200 },
    below_200 = { 199, 500 },
    empty = { 0, 500 },
)]
fn test_pacing_delay(remaining: u64, expected_ms: u64) {
    assert_eq!(pacing_delay(remaining), Duration::from_millis(expected_ms));
}

#[test]
fn test_budget_observe_ignores_missing_and_garbage_headers() {
    let mut budget = RateBudget::default();
    budget.observe(&HttpResponse::new(200, "").with_header("X-RateLimit-Remaining", "n/a"));
    assert_eq!(budget, RateBudget::default());

    budget.observe(&HttpResponse::new(200, "").with_header("X-RateLimit-Remaining", "17"));
    assert_eq!(budget.remaining, 17);
    assert_eq!(budget.limit, 5000);
}

#[test]
fn test_budget_reset_at() {
    let budget = RateBudget {
        remaining: 0,
        limit: 60,
        reset_at_secs: START_SECS,
    };
    assert_eq!(budget.reset_at().timestamp_millis() as u64, START_MS);
}

#[tokio::test]
async fn test_record_tracks_every_response() {
    let gate = gate(GatePolicy::FailFast);
    gate.record(&budget_response(4000, START_SECS + 60)).await;
    gate.record(&HttpResponse::new(404, "").with_header("X-RateLimit-Remaining", "3999"))
        .await;

    let budget = gate.budget().await;
    assert_eq!(budget.remaining, 3999);
    assert_eq!(budget.reset_at_secs, START_SECS + 60);
}

#[tokio::test(start_paused = true)]
async fn test_admit_with_plenty_of_budget_is_immediate() {
    let gate = gate(GatePolicy::FailFast);
    let start = Instant::now();
    gate.admit().await.unwrap();
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_fail_fast_below_threshold() {
    let gate = gate(GatePolicy::FailFast);
    gate.record(&budget_response(5, START_SECS + 30)).await;

    let err = gate.admit().await.unwrap_err();
    assert!(matches!(err, RemoteError::RateLimitExceeded { reset_at }
        if reset_at.timestamp() as u64 == START_SECS + 30));
}

#[tokio::test(start_paused = true)]
async fn test_wait_defers_until_reset() {
    let gate = gate(GatePolicy::Wait {
        max_wait: Duration::from_secs(60),
    });
    gate.record(&budget_response(3, START_SECS + 30)).await;

    let start = Instant::now();
    gate.admit().await.unwrap();

    assert!(start.elapsed() >= Duration::from_secs(30));
    assert_eq!(gate.budget().await.remaining, 5000);
}

#[tokio::test(start_paused = true)]
async fn test_wait_refuses_reset_beyond_max_wait() {
    let gate = gate(GatePolicy::Wait {
        max_wait: Duration::from_secs(60),
    });
    gate.record(&budget_response(0, START_SECS + 3600)).await;

    let start = Instant::now();
    let err = gate.admit().await.unwrap_err();

    assert!(matches!(err, RemoteError::RateLimitExceeded { .. }));
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_budget_with_past_reset_is_admitted() {
    let gate = gate(GatePolicy::FailFast);
    gate.record(&budget_response(0, START_SECS - 1)).await;

    // Past the reset the hard gate is open; only pacing applies
    let start = Instant::now();
    gate.admit().await.unwrap();
    assert_eq!(start.elapsed(), Duration::from_millis(500));
}

#[tokio::test(start_paused = true)]
async fn test_low_budget_paces_calls() {
    let gate = gate(GatePolicy::FailFast);
    gate.record(&budget_response(300, START_SECS + 600)).await;

    let start = Instant::now();
    gate.admit().await.unwrap();
    assert_eq!(start.elapsed(), Duration::from_millis(200));
}

#[tokio::test(start_paused = true)]
async fn test_custom_threshold() {
    let gate = gate(GatePolicy::FailFast).with_threshold(100);
    gate.record(&budget_response(50, START_SECS + 600)).await;
    assert!(gate.admit().await.is_err());
}

#[test]
fn test_default_policy_waits_a_minute() {
    assert_eq!(
        GatePolicy::default(),
        GatePolicy::Wait {
            max_wait: DEFAULT_MAX_WAIT
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_waiting_caller_does_not_block_others() {
    let gate = Arc::new(gate(GatePolicy::Wait {
        max_wait: Duration::from_secs(60),
    }));
    gate.record(&budget_response(3, START_SECS + 30)).await;

    let start = Instant::now();
    let waiter = tokio::spawn({
        let gate = Arc::clone(&gate);
        async move { gate.admit().await }
    });
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }

    let budget = gate.record(&budget_response(2, START_SECS + 30)).await;
    assert_eq!(budget.remaining, 2);
    assert_eq!(gate.budget().await.remaining, 2);
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert!(!waiter.is_finished());

    waiter.await.unwrap().unwrap();
    assert!(start.elapsed() >= Duration::from_secs(30));
    assert_eq!(gate.budget().await.remaining, 5000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_records_never_mix_responses() {
    let gate = Arc::new(gate(GatePolicy::FailFast));

    let tasks = (0..32u64).map(|i| {
        let gate = Arc::clone(&gate);
        tokio::spawn(async move {
            gate.record(&budget_response(4000 - i, START_SECS + i)).await
        })
    });
    let returned = futures_util::future::join_all(tasks).await;

    for budget in returned {
        let budget = budget.unwrap();
        assert_eq!(budget.remaining, 4000 - (budget.reset_at_secs - START_SECS));
    }
    let last = gate.budget().await;
    assert_eq!(last.remaining, 4000 - (last.reset_at_secs - START_SECS));
    assert!(last.reset_at_secs < START_SECS + 32);
}
