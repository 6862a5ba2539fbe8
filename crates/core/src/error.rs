// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The error taxonomy shared across the build-dispatch core (spec §7).

use thiserror::Error;

/// Errors produced anywhere in the core, tagged with the taxonomy §7
/// defines: `configuration`, `validation`, `compilation`, `runtime`,
/// `io`, `unknown`. The tag doubles as `BuildStatus.errorType` once a
/// failure is persisted.
#[derive(Debug, Error)]
pub enum PoltergeistError {
    #[error("configuration error for target {target}: {message}")]
    Configuration { target: String, message: String },

    #[error("validation failed for target {target}: {message}")]
    Validation { target: String, message: String },

    #[error("build failed for target {target}: {message}")]
    Compilation { target: String, message: String },

    #[error("runtime error for target {target}: {message}")]
    Runtime { target: String, message: String },

    #[error("state store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl PoltergeistError {
    pub fn configuration(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            target: target.into(),
            message: message.into(),
        }
    }

    pub fn validation(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            target: target.into(),
            message: message.into(),
        }
    }

    pub fn compilation(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Compilation {
            target: target.into(),
            message: message.into(),
        }
    }

    pub fn runtime(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Runtime {
            target: target.into(),
            message: message.into(),
        }
    }

    /// The `errorType` tag this error should be persisted with, per §3/§7.
    pub fn error_type(&self) -> crate::build_status::ErrorType {
        use crate::build_status::ErrorType;
        match self {
            Self::Configuration { .. } => ErrorType::Configuration,
            Self::Validation { .. } => ErrorType::Configuration,
            Self::Compilation { .. } => ErrorType::Compilation,
            Self::Runtime { .. } => ErrorType::Runtime,
            Self::Io(_) => ErrorType::Unknown,
            Self::Unknown(_) => ErrorType::Unknown,
        }
    }
}

/// Extract a short (<=100 char, single-line) summary from a full error
/// message, per §7's heuristics: a leading `error TS\d+`, `error:`, or
/// `Error ...` marker, falling back to a truncated first line.
pub fn extract_error_summary(full: &str) -> String {
    const MAX_LEN: usize = 100;
    let first_line = full.lines().next().unwrap_or(full);

    let summary = if let Some(pos) = find_marker(first_line) {
        &first_line[pos..]
    } else {
        first_line
    };

    if summary.chars().count() > MAX_LEN {
        let truncated: String = summary.chars().take(MAX_LEN.saturating_sub(1)).collect();
        format!("{truncated}\u{2026}")
    } else {
        summary.to_string()
    }
}

/// Find the byte offset of the first recognized error marker in `line`.
fn find_marker(line: &str) -> Option<usize> {
    let markers = ["error:", "Error:", "error "];
    let mut best: Option<usize> = None;
    for marker in markers {
        if let Some(pos) = line.find(marker) {
            best = Some(best.map_or(pos, |b: usize| b.min(pos)));
        }
    }
    // `error TS1234:` heuristic (TypeScript-style diagnostic codes retained
    // from upstream tooling conventions some builders still emit).
    if let Some(pos) = find_ts_diagnostic(line) {
        best = Some(best.map_or(pos, |b| b.min(pos)));
    }
    best
}

fn find_ts_diagnostic(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let needle = b"error TS";
    let mut i = 0;
    while i + needle.len() <= bytes.len() {
        if &bytes[i..i + needle.len()] == needle {
            let mut j = i + needle.len();
            let mut saw_digit = false;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                saw_digit = true;
                j += 1;
            }
            if saw_digit {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
