// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The on-disk JSON schema (spec §6), deserialized tolerant of unknown keys
//! (serde's default — no `deny_unknown_fields`). This is the thin boundary
//! between whatever wrote the config file and the richly-typed `core::Target`
//! list the rest of the workspace consumes; see `validate` for that step.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAutoRun {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub restart_signal: Option<String>,
    #[serde(default)]
    pub restart_delay_ms: Option<u64>,
}

/// A target as it appears on disk, before `type` is checked against the
/// closed set and `watchPaths` is checked for well-formedness.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTarget {
    pub name: String,
    #[serde(rename = "type")]
    pub target_type: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub watch_paths: Vec<String>,
    #[serde(default)]
    pub settling_delay: Option<u64>,
    #[serde(default)]
    pub auto_run: Option<RawAutoRun>,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub environment: HashMap<String, String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPrioritization {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub focus_detection_window: Option<u64>,
    #[serde(default)]
    pub priority_decay_time: Option<u64>,
    #[serde(default)]
    pub build_timeout_multiplier: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBuildScheduling {
    #[serde(default)]
    pub parallelization: Option<usize>,
    #[serde(default)]
    pub prioritization: RawPrioritization,
}

/// The whole document (spec §6). `watchman` and `notifications` are kept as
/// opaque JSON — the core only diffs their presence/shape (§4.I
/// `watchmanChanged`/`notificationsChanged`), it never interprets them.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfig {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub project_type: Option<String>,
    #[serde(default)]
    pub targets: Vec<RawTarget>,
    #[serde(default)]
    pub build_scheduling: RawBuildScheduling,
    #[serde(default)]
    pub watchman: Option<Value>,
    #[serde(default)]
    pub notifications: Option<Value>,
}

impl RawConfig {
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
