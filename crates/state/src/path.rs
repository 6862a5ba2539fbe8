// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State and log file naming (spec §4.A, §12 "State files"):
//! `{stateDir}/{projectBasename}-{hash8(projectPath)}-{targetName}.state`,
//! with a companion `.log` sharing the same stem.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// First 8 hex characters of the SHA-256 digest of the absolute project
/// path, disambiguating same-named projects in different directories.
pub fn hash8(project_path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(project_path.to_string_lossy().as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex
}

fn stem(project_path: &Path, project_basename: &str, target_name: &str) -> String {
    format!("{project_basename}-{}-{target_name}", hash8(project_path))
}

/// Path to a target's state file under `state_dir`.
pub fn state_file_path(
    state_dir: &Path,
    project_path: &Path,
    project_basename: &str,
    target_name: &str,
) -> PathBuf {
    state_dir.join(format!("{}.state", stem(project_path, project_basename, target_name)))
}

/// Path to a target's build log, optionally scoped to a named channel
/// (e.g. `stdout`/`stderr`), per §12.
pub fn log_file_path(
    state_dir: &Path,
    project_path: &Path,
    project_basename: &str,
    target_name: &str,
    channel: Option<&str>,
) -> PathBuf {
    let base = stem(project_path, project_basename, target_name);
    let name = match channel {
        Some(channel) => format!("{base}-{channel}.log"),
        None => format!("{base}.log"),
    };
    state_dir.join(name)
}

/// Default state directory: `POLTERGEIST_STATE_DIR` if set, otherwise a
/// `poltergeist` subdirectory of the OS temp directory (spec §4.A, §12).
pub fn default_state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("POLTERGEIST_STATE_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    std::env::temp_dir().join("poltergeist")
}

#[cfg(test)]
#[path = "path_tests.rs"]
mod tests;
