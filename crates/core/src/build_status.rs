// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `BuildStatus` (spec §3): the observable record of a build's outcome,
//! with constructors that enforce the three stated invariants so callers
//! can't accidentally build an inconsistent value.

use serde::{Deserialize, Serialize};

/// The tag half of `BuildStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildState {
    Idle,
    Building,
    Success,
    Failure,
}

/// `errorType` classification (spec §3, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    Configuration,
    Runtime,
    Compilation,
    Unknown,
}

/// Observable build outcome.
///
/// Invariants (spec §3), enforced by construction rather than checked
/// after the fact:
/// - `status = Success` implies `error` is absent.
/// - `status = Building` implies `duration = 0` and `exit_code` absent.
/// - `duration` is set iff `status` is `Success` or `Failure`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatus {
    pub status: BuildState,
    /// ISO-8601 timestamp.
    pub timestamp: String,
    /// Milliseconds; 0 while `status == Building`.
    pub duration_ms: u64,
    pub exit_code: Option<i32>,
    pub error: Option<String>,
    pub error_summary: Option<String>,
    pub error_type: Option<ErrorType>,
    pub git_hash: Option<String>,
    pub builder: Option<String>,
}

impl BuildStatus {
    pub fn building(timestamp: impl Into<String>, builder: Option<String>) -> Self {
        Self {
            status: BuildState::Building,
            timestamp: timestamp.into(),
            duration_ms: 0,
            exit_code: None,
            error: None,
            error_summary: None,
            error_type: None,
            git_hash: None,
            builder,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn success(
        timestamp: impl Into<String>,
        duration_ms: u64,
        exit_code: Option<i32>,
        git_hash: Option<String>,
        builder: Option<String>,
    ) -> Self {
        Self {
            status: BuildState::Success,
            timestamp: timestamp.into(),
            duration_ms,
            exit_code,
            error: None,
            error_summary: None,
            error_type: None,
            git_hash,
            builder,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn failure(
        timestamp: impl Into<String>,
        duration_ms: u64,
        exit_code: Option<i32>,
        error: impl Into<String>,
        error_summary: impl Into<String>,
        error_type: ErrorType,
        builder: Option<String>,
    ) -> Self {
        Self {
            status: BuildState::Failure,
            timestamp: timestamp.into(),
            duration_ms,
            exit_code,
            error: Some(error.into()),
            error_summary: Some(error_summary.into()),
            error_type: Some(error_type),
            git_hash: None,
            builder,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == BuildState::Success
    }

    /// Structural invariant check, used by tests (spec §8) and by the
    /// state store before persisting a caller-constructed value.
    pub fn upholds_invariants(&self) -> bool {
        match self.status {
            BuildState::Success => self.error.is_none(),
            BuildState::Building => self.duration_ms == 0 && self.exit_code.is_none(),
            BuildState::Failure | BuildState::Idle => true,
        }
    }
}

#[cfg(test)]
#[path = "build_status_tests.rs"]
mod tests;
