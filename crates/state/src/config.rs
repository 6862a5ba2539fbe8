// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `StateStoreConfig` (spec §9: "pass a `StateStoreConfig{stateDir,
//! heartbeatInterval, staleThreshold}` and own the timer on the
//! supervisor" rather than reach for process-wide statics).

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct StateStoreConfig {
    pub state_dir: PathBuf,
    pub project_path: PathBuf,
    pub project_name: String,
    pub config_path: String,
    pub heartbeat_interval: Duration,
    pub stale_threshold: Duration,
}

impl StateStoreConfig {
    pub fn new(project_path: PathBuf, project_name: impl Into<String>, config_path: impl Into<String>) -> Self {
        Self {
            state_dir: crate::path::default_state_dir(),
            project_path,
            project_name: project_name.into(),
            config_path: config_path.into(),
            heartbeat_interval: Duration::from_secs(10),
            stale_threshold: Duration::from_secs(5 * 60),
        }
    }
}
