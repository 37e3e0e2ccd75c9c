// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables used by the CLI are defined here
//! with typed accessor functions.

/// Environment variable names.
pub mod vars {
    /// Overrides the stored access token.
    pub const KT_TOKEN: &str = "KT_TOKEN";
    /// Log filter directives for the stderr subscriber.
    pub const KT_LOG: &str = "KT_LOG";
}

/// Returns the value of `KT_TOKEN` if set and non-blank.
pub fn token() -> Option<String> {
    std::env::var(vars::KT_TOKEN)
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Returns the value of `KT_LOG` if set.
pub fn log_filter() -> Option<String> {
    std::env::var(vars::KT_LOG).ok()
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
