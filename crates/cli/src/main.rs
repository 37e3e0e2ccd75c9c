// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use clap::Parser;
use ktrs::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    setup_logging(matches!(cli.command, Command::Watch));

    if let Some(dir) = &cli.directory {
        if let Err(e) = std::env::set_current_dir(dir) {
            eprintln!("error: cannot change to directory '{}': {}", dir, e);
            std::process::exit(1);
        }
    }

    if let Err(e) = ktrs::run(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

/// Logs to stderr, filtered by `KT_LOG` (default `warn`, `info` for watch).
fn setup_logging(watching: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if watching { "info" } else { "warn" };
    let filter = ktrs::env::log_filter()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
