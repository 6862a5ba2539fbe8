// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Builder contract (spec §4.F): every builder implements
//! `validate`, `build`, `stop`, `describe_builder`, `get_output_info`.
//! Builders are opaque processes from the queue's view — this crate
//! never implements a concrete per-ecosystem builder (spec §1 excludes
//! "per-ecosystem builder plug-ins... beyond their common contract");
//! it only defines the seam and a deterministic fake for tests.

use async_trait::async_trait;
use poltergeist_core::BuildStatus;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Opaque build executor (spec §4.F). `build` must eventually resolve;
/// `stop` must cause a pending `build` to resolve (with `failure`)
/// within a short bounded time. Stdout/stderr persistence is the
/// builder's own responsibility, not this crate's.
#[async_trait]
pub trait Builder: Send + Sync {
    /// Pre-flight check. A failed validation is recorded by the caller
    /// as a `failure` `BuildStatus` with `errorType=configuration`
    /// (spec §4.C).
    async fn validate(&self) -> Result<(), String>;

    /// Run a build, using `changed_files` as a hint. Must resolve to an
    /// observable `BuildStatus` rather than raising — failures are data,
    /// not exceptions (spec §9).
    async fn build(&self, changed_files: &BTreeSet<String>) -> BuildStatus;

    /// Idempotent; must not block more than a few seconds (spec §4.C).
    async fn stop(&self);

    /// A short label identifying this builder, persisted as
    /// `BuildStatus.builder` (spec §3).
    fn describe_builder(&self) -> String;

    /// The resolved output artifact path, if this builder kind produces
    /// one and has discovered it (spec §4.F `getOutputInfo`).
    fn get_output_info(&self) -> Option<String>;
}

pub type SharedBuilder = Arc<dyn Builder>;

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    //! Deterministic fake builder for queue/lifecycle tests — the same
    //! "record calls, script the outcome" shape as the teacher's
    //! `session::fake::FakeSessionAdapter`.
    #![cfg_attr(coverage_nightly, coverage(off))]

    use super::*;
    use parking_lot::Mutex;
    use poltergeist_core::ErrorType;
    use tokio::sync::Notify;

    #[derive(Debug, Clone)]
    pub enum BuilderCall {
        Validate,
        Build(BTreeSet<String>),
        Stop,
    }

    #[derive(Clone, Debug)]
    pub enum ScriptedOutcome {
        Success { duration_ms: u64 },
        Failure { message: String },
        /// Never resolves until `stop()` or `resolve_pending()` is called.
        Hang,
    }

    struct State {
        calls: Vec<BuilderCall>,
        outcome: ScriptedOutcome,
        validate_ok: bool,
        output_path: Option<String>,
        stopped: bool,
    }

    /// A fake `Builder` whose outcome is scripted ahead of time.
    pub struct FakeBuilder {
        label: String,
        state: Mutex<State>,
        stop_notify: Notify,
    }

    impl FakeBuilder {
        pub fn new(label: impl Into<String>) -> Self {
            Self {
                label: label.into(),
                state: Mutex::new(State {
                    calls: Vec::new(),
                    outcome: ScriptedOutcome::Success { duration_ms: 10 },
                    validate_ok: true,
                    output_path: None,
                    stopped: false,
                }),
                stop_notify: Notify::new(),
            }
        }

        pub fn with_outcome(self, outcome: ScriptedOutcome) -> Self {
            self.state.lock().outcome = outcome;
            self
        }

        pub fn with_validation_failure(self) -> Self {
            self.state.lock().validate_ok = false;
            self
        }

        pub fn with_output_path(self, path: impl Into<String>) -> Self {
            self.state.lock().output_path = Some(path.into());
            self
        }

        pub fn calls(&self) -> Vec<BuilderCall> {
            self.state.lock().calls.clone()
        }

        pub fn build_count(&self) -> usize {
            self.state
                .lock()
                .calls
                .iter()
                .filter(|c| matches!(c, BuilderCall::Build(_)))
                .count()
        }

        pub fn was_stopped(&self) -> bool {
            self.state.lock().stopped
        }
    }

    #[async_trait]
    impl Builder for FakeBuilder {
        async fn validate(&self) -> Result<(), String> {
            self.state.lock().calls.push(BuilderCall::Validate);
            if self.state.lock().validate_ok {
                Ok(())
            } else {
                Err("fake validation failure".to_string())
            }
        }

        async fn build(&self, changed_files: &BTreeSet<String>) -> BuildStatus {
            self.state.lock().calls.push(BuilderCall::Build(changed_files.clone()));
            let outcome = self.state.lock().outcome.clone();
            match outcome {
                ScriptedOutcome::Success { duration_ms } => BuildStatus::success(
                    "1970-01-01T00:00:00Z",
                    duration_ms,
                    Some(0),
                    None,
                    Some(self.label.clone()),
                ),
                ScriptedOutcome::Failure { message } => BuildStatus::failure(
                    "1970-01-01T00:00:00Z",
                    10,
                    Some(1),
                    message.clone(),
                    message,
                    ErrorType::Compilation,
                    Some(self.label.clone()),
                ),
                ScriptedOutcome::Hang => {
                    self.stop_notify.notified().await;
                    BuildStatus::failure(
                        "1970-01-01T00:00:00Z",
                        0,
                        None,
                        "stopped",
                        "stopped",
                        ErrorType::Runtime,
                        Some(self.label.clone()),
                    )
                }
            }
        }

        async fn stop(&self) {
            self.state.lock().calls.push(BuilderCall::Stop);
            self.state.lock().stopped = true;
            self.stop_notify.notify_waiters();
        }

        fn describe_builder(&self) -> String {
            self.label.clone()
        }

        fn get_output_info(&self) -> Option<String> {
            self.state.lock().output_path.clone()
        }
    }
}
