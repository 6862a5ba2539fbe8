// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `poltergeist` - process entry point (`SPEC_FULL.md` §10): `daemon`
//! runs the supervisor in the foreground, `status` reads the State
//! Store for a human, `fresh` exposes the freshness check (spec §4.H)
//! at the process-exit-code boundary §6 defers to the CLI.

mod commands;
mod project;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "poltergeist", version, about = "A project-local build daemon")]
struct Cli {
    /// Project root (defaults to walking up from the current directory
    /// looking for `.poltergeist.json`)
    #[arg(short = 'C', long = "directory", global = true, value_name = "DIR")]
    directory: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the supervisor in the foreground
    Daemon,
    /// Show the last known build status for every target
    Status,
    /// Exit 0 if a target's built artifact is fresh, 1 otherwise (spec §4.H)
    Fresh {
        /// Target name, as declared in `.poltergeist.json`
        target: String,
        /// Override the artifact path instead of resolving `outputPath`
        /// from the configuration
        #[arg(long)]
        binary: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("poltergeist: {err}");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<std::process::ExitCode> {
    let cli = Cli::parse();
    let project_root = project::resolve_project_root(cli.directory)?;

    match cli.command {
        Commands::Daemon => commands::daemon::run(project_root).await,
        Commands::Status => commands::status::run(project_root),
        Commands::Fresh { target, binary } => commands::fresh::run(project_root, &target, binary).await,
    }
}
