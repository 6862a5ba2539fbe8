// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project-root discovery: walk up from the current directory (or an
//! explicit `-C`) looking for `poltergeist_daemon::DEFAULT_CONFIG_FILE`,
//! the same "no project-local file found" boundary the supervisor
//! itself enforces at startup (`DaemonError::ConfigNotFound`).

use anyhow::{Context, Result};
use poltergeist_daemon::DEFAULT_CONFIG_FILE;
use std::path::{Path, PathBuf};

pub fn resolve_project_root(explicit: Option<PathBuf>) -> Result<PathBuf> {
    let start = match explicit {
        Some(dir) => std::fs::canonicalize(&dir)
            .with_context(|| format!("cannot change to directory '{}'", dir.display()))?,
        None => std::env::current_dir().context("cannot read current directory")?,
    };
    Ok(find_project_root_from(&start))
}

fn find_project_root_from(start: &Path) -> PathBuf {
    let mut current = start.to_path_buf();
    loop {
        if current.join(DEFAULT_CONFIG_FILE).is_file() {
            return current;
        }
        if !current.pop() {
            return start.to_path_buf();
        }
    }
}
