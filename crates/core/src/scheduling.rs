// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `buildScheduling` (spec §4.E, §6): the tunables that shape the
//! Intelligent Build Queue's parallelism cap and priority model. Lives in
//! `poltergeist-core` because both `poltergeist-config` (parsing it) and
//! `poltergeist-queue` (consuming it) need the same typed shape.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Priority-decay tunables (spec §4.E).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrioritizationConfig {
    pub enabled: bool,
    pub focus_detection_window_ms: u64,
    pub priority_decay_time_ms: u64,
    pub build_timeout_multiplier: f64,
}

impl Default for PrioritizationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            focus_detection_window_ms: Duration::from_secs(5 * 60).as_millis() as u64,
            priority_decay_time_ms: Duration::from_secs(30 * 60).as_millis() as u64,
            build_timeout_multiplier: 2.0,
        }
    }
}

/// `buildScheduling` (spec §4.E, §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSchedulingConfig {
    pub parallelization: usize,
    pub prioritization: PrioritizationConfig,
}

impl BuildSchedulingConfig {
    /// `min(CPUs, 4)`, floor 1 (spec §4.E).
    pub fn default_parallelization() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .min(4)
            .max(1)
    }
}

impl Default for BuildSchedulingConfig {
    fn default() -> Self {
        Self {
            parallelization: Self::default_parallelization(),
            prioritization: PrioritizationConfig::default(),
        }
    }
}
