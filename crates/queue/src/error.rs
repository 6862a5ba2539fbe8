// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised by the build-dispatch core's largest component (spec
//! §4.C-§4.H), scoped to this crate's boundary.

use poltergeist_core::PoltergeistError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("target '{0}' is not registered")]
    UnknownTarget(String),

    #[error("builder validation failed for target '{target}': {message}")]
    ValidationFailed { target: String, message: String },

    #[error("build failed for target '{target}': {message}")]
    BuildFailed { target: String, message: String },

    #[error("build timed out for target '{0}'")]
    Timeout(String),

    #[error("state store error: {0}")]
    State(#[from] poltergeist_state::StateError),

    #[error("watch error: {0}")]
    Watch(#[from] poltergeist_watch::WatchError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<QueueError> for PoltergeistError {
    fn from(err: QueueError) -> Self {
        match &err {
            QueueError::UnknownTarget(name) => {
                PoltergeistError::configuration(name.clone(), err.to_string())
            }
            QueueError::ValidationFailed { target, .. } => {
                PoltergeistError::validation(target.clone(), err.to_string())
            }
            QueueError::BuildFailed { target, .. } => {
                PoltergeistError::compilation(target.clone(), err.to_string())
            }
            QueueError::Timeout(target) => PoltergeistError::runtime(target.clone(), err.to_string()),
            QueueError::State(_) | QueueError::Watch(_) | QueueError::Io(_) => {
                PoltergeistError::Unknown(err.to_string())
            }
        }
    }
}
