// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised by the supervisor itself (spec §7 "Fatal" cases: loss
//! of the state directory, initial configuration-load failure).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] poltergeist_config::ConfigError),

    #[error(transparent)]
    Queue(#[from] poltergeist_queue::QueueError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no project-local config file found (looked for {0})")]
    ConfigNotFound(String),
}
