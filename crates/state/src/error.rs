// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised by the State Store (spec §4.A, §7's `io`/`unknown` arms
//! scoped to this crate's boundary).

use poltergeist_core::PoltergeistError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("io error reading/writing state for '{target}': {source}")]
    Io {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("state for '{target}' is corrupt: {reason}")]
    Corrupt { target: String, reason: String },

    #[error("no state exists for '{target}'")]
    NotFound { target: String },
}

impl From<StateError> for PoltergeistError {
    fn from(err: StateError) -> Self {
        match &err {
            StateError::Io { target, .. } => {
                PoltergeistError::runtime(target.clone(), err.to_string())
            }
            StateError::Corrupt { target, .. } => {
                PoltergeistError::runtime(target.clone(), err.to_string())
            }
            StateError::NotFound { target } => {
                PoltergeistError::runtime(target.clone(), err.to_string())
            }
        }
    }
}
