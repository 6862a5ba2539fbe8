// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The config-level `Target` (spec §3): immutable within a lifecycle —
//! updates create a replacement rather than mutating in place.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The closed set of builder kinds a target can select (spec §3, §4.C).
/// Closed so the builder-factory lookup (spec §9, "dynamic lookup by
/// string tag → closed sum type + factory") is exhaustiveness-checked by
/// the compiler rather than discovered at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetType {
    Executable,
    AppBundle,
    Npm,
    CmakeExecutable,
    CmakeLibrary,
    CmakeCustom,
    Test,
    Custom,
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TargetType::Executable => "executable",
            TargetType::AppBundle => "app-bundle",
            TargetType::Npm => "npm",
            TargetType::CmakeExecutable => "cmake-executable",
            TargetType::CmakeLibrary => "cmake-library",
            TargetType::CmakeCustom => "cmake-custom",
            TargetType::Test => "test",
            TargetType::Custom => "custom",
        };
        write!(f, "{s}")
    }
}

/// Auto-run configuration block (spec §4.G, §6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoRunConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    /// Override command; when absent the resolved `outputPath` is exec'd.
    #[serde(default)]
    pub command: Option<String>,
    /// Signal sent to request a graceful restart. Stored as the signal
    /// name (e.g. `"SIGINT"`) so it round-trips through JSON without a
    /// platform-specific numeric encoding.
    #[serde(default = "default_restart_signal")]
    pub restart_signal: String,
    #[serde(default = "default_restart_delay_ms")]
    pub restart_delay_ms: u64,
}

fn default_restart_signal() -> String {
    "SIGINT".to_string()
}

const fn default_restart_delay_ms() -> u64 {
    250
}

impl Default for AutoRunConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            args: Vec::new(),
            env: HashMap::new(),
            command: None,
            restart_signal: default_restart_signal(),
            restart_delay_ms: default_restart_delay_ms(),
        }
    }
}

/// A named, buildable unit (spec §3). Immutable: `updateTargets` (§4.C)
/// replaces the whole value rather than mutating fields in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub name: String,
    #[serde(rename = "type")]
    pub target_type: TargetType,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub watch_paths: Vec<String>,
    #[serde(default = "default_settling_delay_ms")]
    pub settling_delay_ms: u64,
    #[serde(default)]
    pub auto_run: Option<AutoRunConfig>,
    #[serde(default)]
    pub environment: HashMap<String, String>,
    #[serde(default)]
    pub output_path: Option<String>,
}

fn default_true() -> bool {
    true
}

const fn default_settling_delay_ms() -> u64 {
    1000
}

impl Target {
    /// Structural validity a target must satisfy regardless of builder
    /// kind (spec §3: "Identity `name` (unique, non-empty)"). Uniqueness
    /// is checked across the whole config, not per-target, so it lives
    /// in the config crate's validation pass rather than here.
    pub fn is_name_valid(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Whether this target should get an Auto-Run Controller (spec
    /// §4.C): only `executable` targets with `autoRun.enabled`.
    pub fn wants_auto_run(&self) -> bool {
        self.target_type == TargetType::Executable
            && self.auto_run.as_ref().is_some_and(|a| a.enabled)
    }
}

#[cfg(test)]
#[path = "target_tests.rs"]
mod tests;
