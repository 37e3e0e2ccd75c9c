// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Classification of raw HTTP responses into remote errors.
//!
//! Every response passes through [`classify`] before any caller looks at
//! its body, so business logic only ever sees a success or a named error.
//!
//! | status          | token sent          | no token        |
//! |-----------------|---------------------|-----------------|
//! | 2xx             | ok                  | ok              |
//! | 404             | NotFound            | NotFound        |
//! | 409, 412, 422   | ConcurrencyConflict | AlreadyExists   |
//! | 401             | AuthFailure         | AuthFailure     |
//! | 403             | RateLimitExceeded if remaining is 0, else AuthFailure |
//! | 429             | RateLimitExceeded   | RateLimitExceeded |
//! | other           | Network             | Network         |

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use super::gate::RateBudget;
use super::transport::HttpResponse;

/// Classified failure of a remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("concurrency conflict on {0}\n  hint: the remote copy changed since it was last read; sync again")]
    ConcurrencyConflict(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("authentication failed: {0}\n  hint: check the access token and its repository permissions")]
    AuthFailure(String),

    #[error("rate limit exceeded, resets at {}", .reset_at.to_rfc3339())]
    RateLimitExceeded { reset_at: DateTime<Utc> },

    #[error("network error: {0}")]
    Network(String),

    #[error("encoding error: {0}")]
    Encoding(String),
}

impl RemoteError {
    /// Returns true for failures worth retrying later without changes.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RemoteError::Network(_) | RemoteError::RateLimitExceeded { .. }
        )
    }
}

impl From<kt_core::Error> for RemoteError {
    fn from(e: kt_core::Error) -> Self {
        RemoteError::Encoding(e.to_string())
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Extracts the remote's `message` field, falling back to the raw body.
pub fn error_message(response: &HttpResponse) -> String {
    serde_json::from_str::<ErrorBody>(&response.body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| response.body.trim().chars().take(200).collect())
}

/// Maps a response to success or a named error.
///
/// `subject` names the object the call addressed; `sent_token` tells
/// whether the request carried a concurrency token; `budget` is the rate
/// budget after this response was recorded.
pub fn classify(
    response: HttpResponse,
    subject: &str,
    sent_token: bool,
    budget: RateBudget,
) -> Result<HttpResponse, RemoteError> {
    if response.is_success() {
        return Ok(response);
    }
    let err = match response.status {
        404 => RemoteError::NotFound(subject.to_string()),
        409 | 412 | 422 if sent_token => RemoteError::ConcurrencyConflict(subject.to_string()),
        409 | 412 | 422 => RemoteError::AlreadyExists(subject.to_string()),
        401 => RemoteError::AuthFailure(error_message(&response)),
        403 if reports_exhausted(&response) => RemoteError::RateLimitExceeded {
            reset_at: budget.reset_at(),
        },
        403 => RemoteError::AuthFailure(error_message(&response)),
        429 => RemoteError::RateLimitExceeded {
            reset_at: budget.reset_at(),
        },
        status => RemoteError::Network(format!("HTTP {status}: {}", error_message(&response))),
    };
    Err(err)
}

fn reports_exhausted(response: &HttpResponse) -> bool {
    response
        .header("x-ratelimit-remaining")
        .and_then(|v| v.trim().parse::<u64>().ok())
        == Some(0)
}
