// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt::Write;
use std::path::Path;

use crate::cli::ConfigCommand;
use crate::config::{find_work_dir, mask_credential, Config, SyncSettings};
use crate::env;
use crate::error::Result;

/// Execute a config subcommand.
pub fn run(cmd: ConfigCommand) -> Result<()> {
    let work_dir = find_work_dir()?;
    match cmd {
        ConfigCommand::Set { key, value } => {
            run_set(&work_dir, &key, &value)?;
            println!("Updated {}", key);
        }
        ConfigCommand::Show => {
            let config = Config::load(&work_dir)?;
            print!("{}", render(&config.sync, env::token().is_some()));
        }
    }
    Ok(())
}

/// Applies one setting and saves the config. Nothing is written on error.
pub(crate) fn run_set(work_dir: &Path, key: &str, value: &str) -> Result<()> {
    let mut config = Config::load(work_dir)?;
    config.set(key, value)?;
    config.save(work_dir)
}

/// Renders the settings one per line, credential masked.
pub(crate) fn render(settings: &SyncSettings, token_from_env: bool) -> String {
    let credential = if token_from_env {
        format!("{} (overridden by KT_TOKEN)", mask_credential(&settings.credential))
    } else {
        mask_credential(&settings.credential)
    };
    let last_sync = settings
        .last_sync_at
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| "never".to_string());
    let repository = if settings.repository.is_empty() {
        "(unset)"
    } else {
        settings.repository.as_str()
    };

    let rows = [
        ("sync.repository", repository.to_string()),
        ("sync.branch", settings.branch.clone()),
        ("sync.credential", credential),
        ("sync.auto_sync", settings.auto_sync.to_string()),
        ("sync.last_sync_at", last_sync),
        ("sync.api_base", settings.api_base.clone()),
        ("sync.debounce_secs", settings.debounce_secs.to_string()),
        (
            "sync.rate_limit_wait_secs",
            settings.rate_limit_wait_secs.to_string(),
        ),
        (
            "sync.rate_limit_policy",
            settings.rate_limit_policy.as_str().to_string(),
        ),
    ];

    let mut out = String::new();
    for (key, value) in rows {
        let _ = writeln!(out, "{:<26} {}", key, value);
    }
    out
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
