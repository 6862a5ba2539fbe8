// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors from the File-Change Source (spec §4.B: "a failed subscription
//! is fatal to that target; other targets keep operating").

use poltergeist_core::PoltergeistError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("pattern '{0}' is rejected (matches .git/** or node_modules/**)")]
    RejectedPattern(String),

    #[error("pattern '{pattern}' is invalid: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("failed to subscribe target '{target}': {source}")]
    SubscribeFailed {
        target: String,
        #[source]
        source: notify::Error,
    },

    #[error("watcher is not running")]
    NotRunning,
}

impl From<WatchError> for PoltergeistError {
    fn from(err: WatchError) -> Self {
        match &err {
            WatchError::RejectedPattern(_) | WatchError::InvalidPattern { .. } => {
                PoltergeistError::configuration("<watch>", err.to_string())
            }
            WatchError::SubscribeFailed { target, .. } => {
                PoltergeistError::runtime(target.clone(), err.to_string())
            }
            WatchError::NotRunning => PoltergeistError::runtime("<watch>", err.to_string()),
        }
    }
}
