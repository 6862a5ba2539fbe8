// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! poltergeist-queue: the build-dispatch core's largest component —
//! Target Lifecycle (§4.C), Debouncer (§4.D), Intelligent Build Queue
//! (§4.E), Builder contract (§4.F), Auto-Run Controller (§4.G), and the
//! Freshness Check (§4.H).

pub mod autorun;
pub mod builder;
pub mod debounce;
pub mod error;
pub mod freshness;
pub mod lifecycle;
pub mod queue;

pub use autorun::AutoRunController;
pub use builder::{Builder, SharedBuilder};
pub use debounce::{Debouncer, QueueSink};
pub use error::QueueError;
pub use freshness::is_binary_fresh;
pub use lifecycle::{BuilderFactory, Lifecycle, TargetSnapshot};
pub use queue::{BuildObserver, IntelligentBuildQueue, QueueStatusEntry};

#[cfg(any(test, feature = "test-support"))]
pub use builder::fake::{BuilderCall, FakeBuilder, ScriptedOutcome};
