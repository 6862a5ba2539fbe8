// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised while loading and validating the on-disk configuration
//! (spec §7's `configuration` taxonomy, scoped to this crate's boundary).

use poltergeist_core::PoltergeistError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("target name must not be empty")]
    EmptyName,

    #[error("duplicate target name: {0}")]
    DuplicateName(String),

    #[error("target '{target}' has unrecognized type '{type_tag}'")]
    UnknownType { target: String, type_tag: String },

    #[error("target '{target}' has invalid watch pattern '{pattern}': {reason}")]
    InvalidPattern {
        target: String,
        pattern: String,
        reason: String,
    },

    #[error("io error reading configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for PoltergeistError {
    fn from(err: ConfigError) -> Self {
        match &err {
            ConfigError::Parse(_) | ConfigError::Io(_) => {
                PoltergeistError::configuration("<config>", err.to_string())
            }
            ConfigError::EmptyName => PoltergeistError::configuration("<unnamed>", err.to_string()),
            ConfigError::DuplicateName(name) => {
                PoltergeistError::configuration(name.clone(), err.to_string())
            }
            ConfigError::UnknownType { target, .. } => {
                PoltergeistError::configuration(target.clone(), err.to_string())
            }
            ConfigError::InvalidPattern { target, .. } => {
                PoltergeistError::configuration(target.clone(), err.to_string())
            }
        }
    }
}
