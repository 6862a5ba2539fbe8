// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! poltergeist-watch: the File-Change Source (spec §4.B) — glob pattern
//! normalization, a `notify`-backed watcher, and a fake for tests.

pub mod error;
pub mod notify_source;
pub mod pattern;
pub mod source;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeFileChangeSource, WatchCall};

pub use error::WatchError;
pub use notify_source::NotifyFileChangeSource;
pub use pattern::{expand_braces, normalize};
pub use source::{ChangeEvent, FileChangeBatch, FileChangeSource, TargetPatterns};
