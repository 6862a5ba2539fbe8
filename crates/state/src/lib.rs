// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! poltergeist-state: the State Store (spec §4.A) — per-target JSON
//! files in a shared directory, with heartbeats, staleness detection
//! and host-local locking.

pub mod atomic;
pub mod config;
pub mod error;
pub mod liveness;
pub mod path;
pub mod store;
pub mod timefmt;

pub use atomic::{FsStateWriter, StateWriter};
pub use config::StateStoreConfig;
pub use error::StateError;
pub use path::{default_state_dir, hash8, log_file_path, state_file_path};
pub use store::StateStore;
