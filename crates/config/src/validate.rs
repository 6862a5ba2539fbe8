// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The thin validation boundary spec §1 assumes exists: turns a [`RawConfig`]
//! into the richly-typed [`ValidatedConfig`] the rest of the workspace
//! consumes. Rejects the structural problems §7 calls `configuration`
//! errors: duplicate/empty names, an unrecognized `type`, an invalid glob.

use crate::error::ConfigError;
use crate::raw::{RawAutoRun, RawConfig, RawTarget};
use indexmap::IndexSet;
use poltergeist_core::{AutoRunConfig, BuildSchedulingConfig, PrioritizationConfig, Target, TargetType};
use serde_json::Value;

/// A fully validated configuration: the typed value spec §1 says the core
/// "receives already-validated" rather than parses itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig {
    pub version: Option<String>,
    pub project_type: Option<String>,
    pub targets: Vec<Target>,
    pub build_scheduling: BuildSchedulingConfig,
    /// Opaque — the core never interprets watcher tuning, only diffs it
    /// (§4.I `watchmanChanged`).
    pub watchman: Option<Value>,
    /// Opaque — the notification dispatcher is an external collaborator
    /// (§1); the core only diffs its presence (§4.I `notificationsChanged`).
    pub notifications: Option<Value>,
}

fn target_type_from_tag(tag: &str) -> Option<TargetType> {
    match tag {
        "executable" => Some(TargetType::Executable),
        "app-bundle" => Some(TargetType::AppBundle),
        "npm" => Some(TargetType::Npm),
        "cmake-executable" => Some(TargetType::CmakeExecutable),
        "cmake-library" => Some(TargetType::CmakeLibrary),
        "cmake-custom" => Some(TargetType::CmakeCustom),
        "test" => Some(TargetType::Test),
        "custom" => Some(TargetType::Custom),
        _ => None,
    }
}

fn validate_pattern(target: &str, pattern: &str) -> Result<(), ConfigError> {
    glob::Pattern::new(pattern).map_err(|e| ConfigError::InvalidPattern {
        target: target.to_string(),
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}

fn convert_auto_run(raw: RawAutoRun) -> AutoRunConfig {
    let defaults = AutoRunConfig::default();
    AutoRunConfig {
        enabled: raw.enabled,
        args: raw.args,
        env: raw.env,
        command: raw.command,
        restart_signal: raw.restart_signal.unwrap_or(defaults.restart_signal),
        restart_delay_ms: raw.restart_delay_ms.unwrap_or(defaults.restart_delay_ms),
    }
}

fn convert_target(raw: RawTarget) -> Result<Target, ConfigError> {
    if raw.name.trim().is_empty() {
        return Err(ConfigError::EmptyName);
    }
    let target_type = target_type_from_tag(&raw.target_type).ok_or_else(|| ConfigError::UnknownType {
        target: raw.name.clone(),
        type_tag: raw.target_type.clone(),
    })?;
    for pattern in &raw.watch_paths {
        validate_pattern(&raw.name, pattern)?;
    }

    Ok(Target {
        name: raw.name,
        target_type,
        enabled: raw.enabled,
        watch_paths: raw.watch_paths,
        settling_delay_ms: raw.settling_delay.unwrap_or(1000),
        auto_run: raw.auto_run.map(convert_auto_run),
        environment: raw.environment,
        output_path: raw.output_path,
    })
}

fn convert_build_scheduling(raw: crate::raw::RawBuildScheduling) -> BuildSchedulingConfig {
    let defaults = BuildSchedulingConfig::default();
    let prio_defaults = PrioritizationConfig::default();
    BuildSchedulingConfig {
        parallelization: raw
            .parallelization
            .unwrap_or(defaults.parallelization)
            .max(1),
        prioritization: PrioritizationConfig {
            enabled: raw.prioritization.enabled.unwrap_or(prio_defaults.enabled),
            focus_detection_window_ms: raw
                .prioritization
                .focus_detection_window
                .unwrap_or(prio_defaults.focus_detection_window_ms),
            priority_decay_time_ms: raw
                .prioritization
                .priority_decay_time
                .unwrap_or(prio_defaults.priority_decay_time_ms),
            build_timeout_multiplier: raw
                .prioritization
                .build_timeout_multiplier
                .unwrap_or(prio_defaults.build_timeout_multiplier),
        },
    }
}

/// Validate a parsed document into the typed value the rest of the
/// workspace consumes.
pub fn validate(raw: RawConfig) -> Result<ValidatedConfig, ConfigError> {
    let mut seen = IndexSet::new();
    let mut targets = Vec::with_capacity(raw.targets.len());
    for raw_target in raw.targets {
        if !seen.insert(raw_target.name.clone()) {
            return Err(ConfigError::DuplicateName(raw_target.name));
        }
        targets.push(convert_target(raw_target)?);
    }

    Ok(ValidatedConfig {
        version: raw.version,
        project_type: raw.project_type,
        targets,
        build_scheduling: convert_build_scheduling(raw.build_scheduling),
        watchman: raw.watchman,
        notifications: raw.notifications,
    })
}

/// Parse and validate a configuration document in one step.
pub fn load_str(json: &str) -> Result<ValidatedConfig, ConfigError> {
    let raw = RawConfig::parse(json)?;
    validate(raw)
}

/// Load and validate a configuration document from disk.
pub fn load_file(path: &std::path::Path) -> Result<ValidatedConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_str(&content)
}

impl ValidatedConfig {
    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.name == name)
    }

    pub fn enabled_targets(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter().filter(|t| t.enabled)
    }
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
