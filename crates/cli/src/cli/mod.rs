// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Parser, Subcommand, ValueEnum};
use kt_core::{Category, ItemKind};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Item collection selector for `list` and `export`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    #[value(alias = "tree")]
    Trees,
    #[value(alias = "note")]
    Notes,
}

impl From<KindArg> for ItemKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Trees => ItemKind::Tree,
            KindArg::Notes => ItemKind::Note,
        }
    }
}

const ABOUT: &str = "Organize knowledge trees and notes, backed up to a GitHub repository";

const QUICKSTART: &str = "\
Quick start:
  kt init                                      Create .ktree/ here
  kt config set sync.repository alice/notes    Choose the backup repository
  kt config set sync.credential <token>        Store an access token (or set KT_TOKEN)
  kt connect                                   Verify the repository is reachable
  kt sync                                      Upload a backup";

#[derive(Parser)]
#[command(name = "kt")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = ABOUT)]
#[command(after_help = QUICKSTART)]
pub struct Cli {
    /// Run as if kt was started in <path>
    #[arg(short = 'C', long = "directory", global = true, value_name = "path")]
    pub directory: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a .ktree directory
    Init {
        /// Directory to initialize (defaults to the current directory)
        path: Option<String>,
    },

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Create a tree or a note
    #[command(after_help = "\
Examples:
  kt add tree \"Rust\" -c technology             Create a tree
  kt add note \"Reading list\" --content \"...\"   Create a note")]
    Add {
        /// What to create
        #[arg(value_enum)]
        kind: KindArg,

        /// Name of the new item
        #[arg(value_parser = non_empty_string)]
        name: String,

        /// Category (business, technology, science, education, personal, other)
        #[arg(long, short, default_value = "other")]
        category: Category,

        /// Tree description
        #[arg(long, short)]
        description: Option<String>,

        /// Note body
        #[arg(long)]
        content: Option<String>,
    },

    /// Manage the nodes of a tree
    #[command(subcommand)]
    Node(NodeCommand),

    /// List trees and notes
    List {
        /// Only list this collection
        #[arg(value_enum)]
        kind: Option<KindArg>,
    },

    /// Show item counts and sync status
    Status {
        /// Also check the remote and report the rate budget
        #[arg(long)]
        remote: bool,
    },

    /// Verify the credential and repository
    Connect,

    /// Upload a backup of all trees and notes
    Sync,

    /// Download the backup and apply it locally
    #[command(after_help = "\
Examples:
  kt restore              Merge by id: remote items overwrite local ones
  kt restore --replace    Discard local items and take the backup as is")]
    Restore {
        /// Replace local collections instead of merging
        #[arg(long)]
        replace: bool,
    },

    /// Delete every object in the backup repository
    Clear {
        /// Confirm the deletion
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Write a backup document to a local file
    #[command(after_help = "\
Examples:
  kt export backup.json                      Full backup document
  kt export trees.json --category trees      Trees only")]
    Export {
        /// Destination file
        filepath: String,

        /// Export a single collection
        #[arg(long, value_enum)]
        category: Option<KindArg>,
    },

    /// Read a backup or export document from a local file
    Import {
        /// Source file
        filepath: String,

        /// Replace local collections instead of merging
        #[arg(long)]
        replace: bool,
    },

    /// Sync automatically after local changes until interrupted
    Watch,
}

/// Configuration commands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Change one setting
    #[command(
        arg_required_else_help = true,
        after_help = "\
Examples:
  kt config set sync.repository alice/notes    Set the backup repository
  kt config set auto_sync true                 Enable auto-sync (prefix optional)"
    )]
    Set {
        /// Setting name, e.g. sync.repository
        key: String,

        /// New value
        value: String,
    },

    /// Print the current settings (the credential is masked)
    Show,
}

/// Node commands.
#[derive(Subcommand)]
pub enum NodeCommand {
    /// Add a node to a tree
    #[command(arg_required_else_help = true)]
    Add {
        /// Tree id
        tree_id: String,

        /// Node title
        #[arg(value_parser = non_empty_string)]
        title: String,

        /// Parent node id (omit for a root node)
        #[arg(long, short)]
        parent: Option<String>,
    },

    /// Remove a node and everything below it
    #[command(arg_required_else_help = true)]
    Remove {
        /// Tree id
        tree_id: String,

        /// Node id
        node_id: String,
    },
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
