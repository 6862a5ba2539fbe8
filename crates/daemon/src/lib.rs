// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! poltergeist-daemon: the supervisor (spec §15) — start-up ordering,
//! the run loop wiring the watcher/debouncer/config-reload orchestrator
//! together, signal handling, and graceful shutdown.

pub mod config;
pub mod error;
pub mod logging;
pub mod process_builder;
pub mod supervisor;

pub use config::{resolve_config_path, DEFAULT_CONFIG_FILE, DEFAULT_CONFIG_POLL_INTERVAL, SHUTDOWN_GRACE_PERIOD};
pub use error::DaemonError;
pub use process_builder::{ProcessBuilder, ProcessBuilderFactory};
pub use supervisor::Supervisor;
