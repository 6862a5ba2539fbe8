// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `poltergeist status`: reads the State Store and prints the last
//! known `BuildStatus` for every target declared in the project's
//! configuration — a plain table, not the interactive dashboard spec
//! §1 places out of scope for the core.

use anyhow::Result;
use poltergeist_core::{format_elapsed_ms, BuildState};
use poltergeist_daemon::resolve_config_path;
use poltergeist_state::{default_state_dir, StateStore, StateStoreConfig};
use std::path::PathBuf;
use std::process::ExitCode;

pub fn run(project_root: PathBuf) -> Result<ExitCode> {
    let config_path = resolve_config_path(&project_root, None);
    let validated = poltergeist_config::load_file(&config_path)?;

    let project_name = project_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());
    let mut store_config =
        StateStoreConfig::new(project_root.clone(), project_name, config_path.display().to_string());
    store_config.state_dir = default_state_dir();
    let state_store = StateStore::new(store_config);

    if validated.targets.is_empty() {
        println!("no targets configured");
        return Ok(ExitCode::SUCCESS);
    }

    println!("{:<20} {:<10} {:<10} {:<8} {}", "TARGET", "STATUS", "DURATION", "LOCKED", "TIMESTAMP");
    for target in &validated.targets {
        let locked = if state_store.is_locked(&target.name) { "yes" } else { "no" };
        match state_store.read_state_lenient(&target.name).and_then(|s| s.last_build) {
            Some(status) => {
                let state_label = match status.status {
                    BuildState::Idle => "idle",
                    BuildState::Building => "building",
                    BuildState::Success => "success",
                    BuildState::Failure => "failure",
                };
                println!(
                    "{:<20} {:<10} {:<10} {:<8} {}",
                    target.name,
                    state_label,
                    format_elapsed_ms(status.duration_ms),
                    locked,
                    status.timestamp,
                );
                if let Some(summary) = &status.error_summary {
                    println!("  {summary}");
                }
            }
            None => {
                println!("{:<20} {:<10} {:<10} {:<8} {}", target.name, "unknown", "-", locked, "-");
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
