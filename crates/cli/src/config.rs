// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Project configuration management.
//!
//! Configuration is stored in `.ktree/config.toml` and holds the sync
//! settings:
//! - `credential` and `repository` (`owner/name`) of the backup target
//! - `branch`, `auto_sync` and the time of the last successful sync
//! - tunables for the API base URL, debounce window and rate limit gate
//!
//! The config file holds the credential, so `kt init` ignores it in git.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use kt_core::backup::AppSettings;

use crate::error::{Error, Result};
use crate::sync::{GatePolicy, LastSyncStore, RemoteTarget};

const WORK_DIR_NAME: &str = ".ktree";
const CONFIG_FILE_NAME: &str = "config.toml";
const DATA_FILE_NAME: &str = "data.json";
const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Default REST API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Keys accepted by [`Config::set`].
pub const SETTING_KEYS: &str = "sync.credential, sync.repository, sync.branch, sync.auto_sync, \
     sync.api_base, sync.debounce_secs, sync.rate_limit_wait_secs, sync.rate_limit_policy";

/// What the rate gate does when the budget runs out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RateLimitPolicy {
    /// Wait for the reset, up to `rate_limit_wait_secs`.
    #[default]
    Wait,
    FailFast,
}

impl RateLimitPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateLimitPolicy::Wait => "wait",
            RateLimitPolicy::FailFast => "fail-fast",
        }
    }
}

/// Sync settings stored in the `[sync]` table.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Bearer token for the remote API.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub credential: String,
    /// Backup repository as `owner/name`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub repository: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default)]
    pub auto_sync: bool,
    /// Written after every successful sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_at: Option<DateTime<Utc>>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Quiet period before an automatic sync.
    #[serde(default = "default_debounce_secs")]
    pub debounce_secs: u64,
    /// Longest wait for a rate limit reset under the `wait` policy.
    #[serde(default = "default_rate_limit_wait_secs")]
    pub rate_limit_wait_secs: u64,
    #[serde(default)]
    pub rate_limit_policy: RateLimitPolicy,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_debounce_secs() -> u64 {
    5
}

fn default_rate_limit_wait_secs() -> u64 {
    60
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            credential: String::new(),
            repository: String::new(),
            branch: default_branch(),
            auto_sync: false,
            last_sync_at: None,
            api_base: default_api_base(),
            debounce_secs: default_debounce_secs(),
            rate_limit_wait_secs: default_rate_limit_wait_secs(),
            rate_limit_policy: RateLimitPolicy::default(),
        }
    }
}

// The credential is never printed
impl fmt::Debug for SyncSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncSettings")
            .field("credential", &mask_credential(&self.credential))
            .field("repository", &self.repository)
            .field("branch", &self.branch)
            .field("auto_sync", &self.auto_sync)
            .field("last_sync_at", &self.last_sync_at)
            .field("api_base", &self.api_base)
            .field("debounce_secs", &self.debounce_secs)
            .field("rate_limit_wait_secs", &self.rate_limit_wait_secs)
            .field("rate_limit_policy", &self.rate_limit_policy)
            .finish()
    }
}

/// Renders a credential for display: `(unset)` or `****` plus its last 4 chars.
pub fn mask_credential(credential: &str) -> String {
    if credential.is_empty() {
        return "(unset)".to_string();
    }
    let chars: Vec<char> = credential.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

/// Validates an `owner/name` repository reference.
pub fn validate_repository(repository: &str) -> bool {
    let valid_part = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    };
    match repository.split_once('/') {
        Some((owner, name)) => valid_part(owner) && valid_part(name),
        None => false,
    }
}

impl SyncSettings {
    /// Replaces the stored credential with `token` when one is given.
    pub fn with_credential_override(mut self, token: Option<String>) -> Self {
        if let Some(token) = token {
            self.credential = token;
        }
        self
    }

    /// Returns true if both credential and repository are set.
    pub fn is_configured(&self) -> bool {
        !self.credential.trim().is_empty() && !self.repository.trim().is_empty()
    }

    /// Checks that the settings are complete enough to reach the remote.
    pub fn validate(&self) -> Result<()> {
        if self.repository.trim().is_empty() {
            return Err(Error::NotConfigured {
                missing: "repository",
                key: "sync.repository",
            });
        }
        if !validate_repository(&self.repository) {
            return Err(Error::InvalidRepository(self.repository.clone()));
        }
        if self.credential.trim().is_empty() {
            return Err(Error::NotConfigured {
                missing: "credential",
                key: "sync.credential",
            });
        }
        if self.branch.trim().is_empty() {
            return Err(Error::FieldEmpty { field: "branch" });
        }
        Ok(())
    }

    pub fn target(&self) -> RemoteTarget {
        RemoteTarget {
            repository: self.repository.clone(),
            branch: self.branch.clone(),
        }
    }

    pub fn gate_policy(&self) -> GatePolicy {
        match self.rate_limit_policy {
            RateLimitPolicy::FailFast => GatePolicy::FailFast,
            RateLimitPolicy::Wait => GatePolicy::Wait {
                max_wait: Duration::from_secs(self.rate_limit_wait_secs),
            },
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_secs(self.debounce_secs)
    }

    /// Preferences embedded into backups. Carries no credential.
    pub fn app_settings(&self) -> AppSettings {
        AppSettings {
            auto_sync: self.auto_sync,
            last_sync: self.last_sync_at,
            sync_branch: self.branch.clone(),
            ..AppSettings::default()
        }
    }
}

/// Project configuration stored in `.ktree/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sync: SyncSettings,
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(Error::InvalidValue {
            key: key.to_string(),
            reason: format!("expected true or false, got '{value}'"),
        }),
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64> {
    value.trim().parse().map_err(|_| Error::InvalidValue {
        key: key.to_string(),
        reason: format!("expected a whole number of seconds, got '{value}'"),
    })
}

fn non_empty(field: &'static str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::FieldEmpty { field });
    }
    Ok(value.to_string())
}

impl Config {
    /// Loads configuration from the given `.ktree/` directory.
    pub fn load(work_dir: &Path) -> Result<Self> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Saves configuration to the given `.ktree/` directory.
    pub fn save(&self, work_dir: &Path) -> Result<()> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    /// Updates one setting from its textual value.
    ///
    /// Keys may be given with or without the `sync.` prefix.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let name = key.strip_prefix("sync.").unwrap_or(key);
        let sync = &mut self.sync;
        match name {
            "credential" => sync.credential = non_empty("credential", value)?,
            "repository" => {
                let repository = non_empty("repository", value)?;
                if !validate_repository(&repository) {
                    return Err(Error::InvalidRepository(repository));
                }
                sync.repository = repository;
            }
            "branch" => sync.branch = non_empty("branch", value)?,
            "auto_sync" => sync.auto_sync = parse_bool(key, value)?,
            "api_base" => {
                let base = non_empty("api_base", value)?;
                if !base.starts_with("http://") && !base.starts_with("https://") {
                    return Err(Error::InvalidValue {
                        key: key.to_string(),
                        reason: "must start with http:// or https://".to_string(),
                    });
                }
                sync.api_base = base.trim_end_matches('/').to_string();
            }
            "debounce_secs" => sync.debounce_secs = parse_secs(key, value)?,
            "rate_limit_wait_secs" => sync.rate_limit_wait_secs = parse_secs(key, value)?,
            "rate_limit_policy" => {
                sync.rate_limit_policy = match value.trim() {
                    "wait" => RateLimitPolicy::Wait,
                    "fail-fast" => RateLimitPolicy::FailFast,
                    other => {
                        return Err(Error::InvalidValue {
                            key: key.to_string(),
                            reason: format!("expected wait or fail-fast, got '{other}'"),
                        })
                    }
                }
            }
            _ => {
                return Err(Error::UnknownSetting {
                    key: key.to_string(),
                    valid: SETTING_KEYS,
                })
            }
        }
        Ok(())
    }
}

/// Find the .ktree directory by walking up from the current directory
pub fn find_work_dir() -> Result<PathBuf> {
    find_work_dir_from(&std::env::current_dir()?)
}

/// Find the .ktree directory by walking up from `start`
pub fn find_work_dir_from(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let work_dir = current.join(WORK_DIR_NAME);
        if work_dir.is_dir() {
            return Ok(work_dir);
        }
        if !current.pop() {
            return Err(Error::NotInitialized);
        }
    }
}

/// Path of the file-backed item store.
pub fn get_data_path(work_dir: &Path) -> PathBuf {
    work_dir.join(DATA_FILE_NAME)
}

/// Initialize a new .ktree directory at the given path
pub fn init_work_dir(path: &Path) -> Result<PathBuf> {
    let work_dir = path.join(WORK_DIR_NAME);

    if work_dir.join(CONFIG_FILE_NAME).exists() {
        return Err(Error::AlreadyInitialized(work_dir.display().to_string()));
    }

    fs::create_dir_all(&work_dir)?;
    Config::default().save(&work_dir)?;
    write_gitignore(&work_dir)?;

    Ok(work_dir)
}

/// Write a .gitignore file to the work directory.
///
/// Ignores `config.toml`, which holds the credential.
pub fn write_gitignore(work_dir: &Path) -> Result<()> {
    let gitignore_path = work_dir.join(GITIGNORE_FILE_NAME);
    fs::write(
        &gitignore_path,
        "# Local configuration (contains the access token)\nconfig.toml\n",
    )?;
    Ok(())
}

/// Records successful syncs in `config.toml`.
pub struct ConfigLastSync {
    work_dir: PathBuf,
}

impl ConfigLastSync {
    pub fn new(work_dir: &Path) -> Self {
        ConfigLastSync {
            work_dir: work_dir.to_path_buf(),
        }
    }
}

impl LastSyncStore for ConfigLastSync {
    fn save_last_sync(&self, at: DateTime<Utc>) -> Result<()> {
        // Reload so edits made while a watch runs are not overwritten
        let mut config = Config::load(&self.work_dir)?;
        config.sync.last_sync_at = Some(at);
        config.save(&self.work_dir)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
