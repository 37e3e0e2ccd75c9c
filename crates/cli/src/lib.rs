// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ktrs - knowledge trees and notes with GitHub backup sync.
//!
//! This crate provides the functionality behind the `kt` CLI tool: a
//! project-local store of trees and notes in `.ktree/data.json`, backed up
//! as one versioned document to a repository through the contents API.
//!
//! # Main Components
//!
//! - [`FileStore`] - File-backed item store with change notification
//! - [`Config`] - Sync settings in `.ktree/config.toml`
//! - [`sync`] - Remote client, rate gate, sync orchestrator and auto-sync
//! - [`Error`] - Error types for all operations
//!
//! # Initialization
//!
//! Use [`init_work_dir`] to create a new `.ktree/` directory, then open the store:
//!
//! ```rust,ignore
//! use ktrs::{init_work_dir, find_work_dir, get_data_path, FileStore};
//!
//! // Initialize a new project
//! let work_dir = init_work_dir(Path::new("."))?;
//!
//! // Later, find and open an existing project
//! let work_dir = find_work_dir()?;
//! let store = FileStore::open(&get_data_path(&work_dir))?;
//! ```

mod cli;
mod commands;

pub mod config;
pub mod env;
pub mod error;
pub mod id;
pub mod store;
pub mod sync;

pub use cli::{Cli, Command, ConfigCommand, KindArg, NodeCommand};
pub use config::{find_work_dir, get_data_path, init_work_dir, Config, SyncSettings};
pub use error::{Error, Result};
pub use store::FileStore;

/// Execute a CLI command. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Init { path } => commands::init::run(path),
        Command::Config(cmd) => commands::config::run(cmd),
        Command::Add {
            kind,
            name,
            category,
            description,
            content,
        } => commands::add::run(kind, name, category, description, content),
        Command::Node(cmd) => commands::node::run(cmd),
        Command::List { kind } => commands::list::run(kind),
        Command::Status { remote } => commands::status::run(remote),
        Command::Connect => commands::connect::run(),
        Command::Sync => commands::sync::run(),
        Command::Restore { replace } => commands::restore::run(replace),
        Command::Clear { yes } => commands::clear::run(yes),
        Command::Export { filepath, category } => commands::export::run(&filepath, category),
        Command::Import { filepath, replace } => commands::import::run(&filepath, replace),
        Command::Watch => commands::watch::run(),
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
