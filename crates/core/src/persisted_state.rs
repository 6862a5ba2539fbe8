// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `PersistedState` (spec §3): the on-disk, one-file-per-target record
//! the State Store owns.

use crate::build_status::BuildStatus;
use serde::{Deserialize, Serialize};

/// Owning-process bookkeeping, refreshed every heartbeat tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInfo {
    pub pid: u32,
    pub hostname: String,
    pub is_active: bool,
    /// ISO-8601 timestamp of process start.
    pub start_time: String,
    /// ISO-8601 timestamp of the most recent heartbeat.
    pub last_heartbeat: String,
}

impl ProcessInfo {
    pub fn is_owned_by(&self, pid: u32, hostname: &str) -> bool {
        self.pid == pid && self.hostname == hostname
    }
}

/// Output-artifact metadata, updated as builders discover it (spec §4.F
/// `getOutputInfo`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
}

/// A single post-build hook record (name + whether it succeeded). The
/// shape of post-build hooks themselves is a builder concern (§4.F);
/// the core only persists what ran and how it went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostBuildRecord {
    pub name: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// One file per target, written by the State Store (spec §3, §4.A).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub version: u32,
    pub project_path: String,
    pub project_name: String,
    pub target: String,
    pub target_type: String,
    pub config_path: String,
    pub process: ProcessInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_build: Option<BuildStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_info: Option<AppInfo>,
    #[serde(default)]
    pub post_build: Vec<PostBuildRecord>,
}

/// Current schema version written by this daemon.
pub const STATE_SCHEMA_VERSION: u32 = 1;

#[cfg(test)]
#[path = "persisted_state_tests.rs"]
mod tests;
