// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! poltergeist-config: loads, validates and diffs the project-local
//! configuration document (spec §6, §4.I).

pub mod diff;
pub mod error;
pub mod raw;
pub mod validate;

pub use diff::{diff, ConfigDiff};
pub use error::ConfigError;
pub use raw::{RawAutoRun, RawBuildScheduling, RawConfig, RawPrioritization, RawTarget};
pub use validate::{load_file, load_str, validate, ValidatedConfig};
