// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `poltergeist fresh <target>`: the freshness check (spec §4.H) at
//! the process-exit-code boundary (`SPEC_FULL.md` §16) — exit 0 when
//! `isBinaryFresh` is true, 1 otherwise.

use anyhow::{anyhow, Result};
use poltergeist_daemon::resolve_config_path;
use poltergeist_queue::is_binary_fresh;
use poltergeist_state::{default_state_dir, StateStore, StateStoreConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

pub async fn run(project_root: PathBuf, target_name: &str, binary_override: Option<PathBuf>) -> Result<ExitCode> {
    let config_path = resolve_config_path(&project_root, None);
    let validated = poltergeist_config::load_file(&config_path)?;
    let target = validated
        .target(target_name)
        .ok_or_else(|| anyhow!("no target named '{target_name}' in {}", config_path.display()))?;

    let binary_path = match binary_override {
        Some(path) => path,
        None => {
            let output_path = target
                .output_path
                .as_ref()
                .ok_or_else(|| anyhow!("target '{target_name}' has no outputPath configured"))?;
            resolve_relative(&project_root, output_path)
        }
    };

    let project_name = project_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());
    let mut store_config =
        StateStoreConfig::new(project_root.clone(), project_name, config_path.display().to_string());
    store_config.state_dir = default_state_dir();
    let state_store = StateStore::new(store_config);

    let fresh = is_binary_fresh(&project_root, target_name, &binary_path, &state_store).await;
    if fresh {
        println!("{target_name}: fresh");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{target_name}: stale");
        Ok(ExitCode::FAILURE)
    }
}

fn resolve_relative(project_root: &Path, path: &str) -> PathBuf {
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        project_root.join(candidate)
    }
}
