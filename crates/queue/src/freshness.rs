// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Freshness Check (spec §4.H): `isBinaryFresh(projectRoot,
//! targetName, binaryPath)`. Read-only and safe to call concurrently
//! with an in-flight build; fails closed on any error, including a git
//! invocation that errors or is absent.

use poltergeist_core::Clock;
use poltergeist_state::{timefmt::parse_rfc3339_ms, StateStore, StateWriter};
use std::path::Path;
use std::time::UNIX_EPOCH;
use tokio::process::Command;

async fn git_output(project_root: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(project_root)
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout).ok()
}

async fn git_head(project_root: &Path) -> Option<String> {
    git_output(project_root, &["rev-parse", "HEAD"]).await.map(|s| s.trim().to_string())
}

async fn git_is_clean(project_root: &Path) -> Option<bool> {
    git_output(project_root, &["status", "--porcelain"]).await.map(|s| s.trim().is_empty())
}

/// `isBinaryFresh` (spec §4.H). `binary_path` is resolved by the
/// caller (relative to `project_root` if the target's `outputPath` is
/// relative).
pub async fn is_binary_fresh<C: Clock, W: StateWriter + Clone>(
    project_root: &Path,
    target_name: &str,
    binary_path: &Path,
    state_store: &StateStore<C, W>,
) -> bool {
    let Ok(metadata) = std::fs::metadata(binary_path) else {
        return false;
    };
    let Ok(modified) = metadata.modified() else {
        return false;
    };
    let Ok(elapsed) = modified.duration_since(UNIX_EPOCH) else {
        return false;
    };
    let mtime_ms = elapsed.as_millis() as u64;

    let Ok(Some(state)) = state_store.read_state(target_name) else {
        return false;
    };
    let Some(last_build) = state.last_build else {
        return false;
    };
    if !last_build.is_success() {
        return false;
    }
    let Some(build_ms) = parse_rfc3339_ms(&last_build.timestamp) else {
        return false;
    };
    if mtime_ms + 1 < build_ms {
        return false;
    }

    let Some(head) = git_head(project_root).await else {
        return false;
    };
    if let Some(expected) = &last_build.git_hash {
        if &head != expected {
            return false;
        }
    }

    matches!(git_is_clean(project_root).await, Some(true))
}

#[cfg(test)]
#[path = "freshness_tests.rs"]
mod tests;
