// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Target Lifecycle (spec §4.C): owns the in-memory `TargetState` for
//! every configured target, wiring a new target's builder, watcher
//! subscriptions, queue registration, and (for executables with
//! `autoRun.enabled`) its Auto-Run Controller.

use crate::autorun::AutoRunController;
use crate::builder::SharedBuilder;
use crate::error::QueueError;
use crate::queue::IntelligentBuildQueue;
use poltergeist_core::{BuildStatus, Clock, ErrorType, Reason, Target};
use poltergeist_state::{FsStateWriter, StateStore, StateWriter};
use poltergeist_watch::{expand_braces, normalize, FileChangeSource, TargetPatterns};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Constructs the right `Builder` for a target's `type` (spec §4.C
/// "instantiate a builder via an injected factory keyed on `type`").
/// Kept as an injected seam rather than a match on `TargetType` inside
/// Lifecycle itself, since per-ecosystem builders are explicitly out of
/// this crate's scope (spec §1).
pub trait BuilderFactory: Send + Sync {
    fn create(&self, target: &Target) -> Result<SharedBuilder, String>;
}

struct TargetState {
    target: Target,
    builder: SharedBuilder,
    auto_run: Option<Arc<AutoRunController>>,
    watching: bool,
}

/// A row of `getTargetStates()` (spec §4.C).
#[derive(Debug, Clone)]
pub struct TargetSnapshot {
    pub name: String,
    pub target_type: String,
    pub watching: bool,
    pub auto_run: bool,
}

pub struct Lifecycle<C: Clock, W: StateWriter + Clone = FsStateWriter> {
    queue: Arc<IntelligentBuildQueue<C, W>>,
    watcher: Arc<dyn FileChangeSource>,
    state_store: Arc<StateStore<C, W>>,
    factory: Arc<dyn BuilderFactory>,
    clock: Arc<C>,
    project_root: PathBuf,
    targets: parking_lot::Mutex<HashMap<String, TargetState>>,
}

fn expand_watch_paths(paths: &[String]) -> Result<Vec<String>, QueueError> {
    let mut out = Vec::new();
    for raw in paths {
        for expanded in expand_braces(raw) {
            out.push(normalize(&expanded)?);
        }
    }
    Ok(out)
}

impl<C: Clock + 'static, W: StateWriter + Clone + 'static> Lifecycle<C, W> {
    pub fn new(
        queue: Arc<IntelligentBuildQueue<C, W>>,
        watcher: Arc<dyn FileChangeSource>,
        state_store: Arc<StateStore<C, W>>,
        factory: Arc<dyn BuilderFactory>,
        clock: Arc<C>,
        project_root: PathBuf,
    ) -> Self {
        Self {
            queue,
            watcher,
            state_store,
            factory,
            clock,
            project_root,
            targets: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    fn record_validation_failure(&self, target: &Target, message: &str) {
        let status = BuildStatus::failure(
            poltergeist_state::timefmt::to_rfc3339(self.clock.epoch_ms()),
            0,
            None,
            message.to_string(),
            message.to_string(),
            ErrorType::Configuration,
            None,
        );
        if self.state_store.read_state(&target.name).ok().flatten().is_none() {
            let _ = self.state_store.initialize_state(target);
        }
        if let Err(err) = self.state_store.update_build_status(&target.name, status) {
            tracing::warn!(target = %target.name, error = %err, "failed to persist validation failure");
        }
    }

    /// Bring up one target: expand/normalize its watch patterns,
    /// construct its builder, validate it, register with the queue and
    /// state store, and (if requested) its Auto-Run Controller.
    async fn bring_up(&self, target: Target) -> Result<TargetState, QueueError> {
        let patterns = expand_watch_paths(&target.watch_paths)?;
        let builder = self
            .factory
            .create(&target)
            .map_err(|message| QueueError::ValidationFailed {
                target: target.name.clone(),
                message,
            })?;

        if let Err(message) = builder.validate().await {
            self.record_validation_failure(&target, &message);
            return Err(QueueError::ValidationFailed {
                target: target.name.clone(),
                message,
            });
        }

        if self.state_store.read_state(&target.name).ok().flatten().is_none() {
            self.state_store.initialize_state(&target)?;
        }
        self.queue.register_target(&target.name, builder.clone());

        let mut target_map: TargetPatterns = HashMap::new();
        target_map.insert(target.name.clone(), patterns);
        self.watcher.subscribe_targets(&target_map).await?;

        let auto_run = if target.wants_auto_run() {
            let clock: Arc<dyn Clock> = Arc::clone(&self.clock);
            Some(Arc::new(AutoRunController::new(
                target.clone(),
                self.project_root.clone(),
                clock,
            )))
        } else {
            None
        };

        Ok(TargetState {
            target,
            builder,
            auto_run,
            watching: true,
        })
    }

    /// `initTargets` / `addTargets` (spec §4.C): construct and register
    /// every target, queuing an `initial-build` for each one that came
    /// up successfully. Failures for one target do not stop the rest.
    pub async fn add_targets(self: &Arc<Self>, targets: Vec<Target>) -> Vec<QueueError> {
        let mut errors = Vec::new();
        for target in targets {
            let name = target.name.clone();
            match self.bring_up(target).await {
                Ok(state) => {
                    self.targets.lock().insert(name.clone(), state);
                    self.queue.queue_target_build(&name, Reason::InitialBuild);
                }
                Err(err) => errors.push(err),
            }
        }
        errors
    }

    /// `updateTargets` (spec §4.C): preserves the previous builder,
    /// auto-run controller, and watching flag when the target's `type`
    /// did not change; otherwise tears down and rebuilds from scratch.
    pub async fn update_targets(self: &Arc<Self>, targets: Vec<Target>) -> Vec<QueueError> {
        let mut errors = Vec::new();
        for target in targets {
            let name = target.name.clone();
            let unchanged_kind = self
                .targets
                .lock()
                .get(&name)
                .map(|s| s.target.target_type == target.target_type)
                .unwrap_or(false);

            if unchanged_kind {
                let mut guard = self.targets.lock();
                if let Some(state) = guard.get_mut(&name) {
                    state.target = target;
                }
                drop(guard);
                if let Some(state) = self.targets.lock().get(&name) {
                    let mut target_map: TargetPatterns = HashMap::new();
                    if let Ok(patterns) = expand_watch_paths(&state.target.watch_paths) {
                        target_map.insert(name.clone(), patterns);
                    }
                    if let Err(err) = self.watcher.refresh_targets(&target_map).await {
                        errors.push(err.into());
                    }
                }
            } else {
                match self.bring_up(target).await {
                    Ok(state) => {
                        self.targets.lock().insert(name, state);
                    }
                    Err(err) => errors.push(err),
                }
            }
        }
        errors
    }

    /// `removeTargets` (spec §4.C): deletes the in-memory state and
    /// asks the State Store to remove the persisted state.
    pub async fn remove_targets(&self, names: &[String]) {
        for name in names {
            self.targets.lock().remove(name);
            self.queue.unregister_target(name);
            if let Err(err) = self.state_store.remove_state(name) {
                tracing::warn!(target = %name, error = %err, "failed to remove state on target removal");
            }
        }
        let remaining = self.current_patterns();
        let _ = self.watcher.refresh_targets(&remaining).await;
    }

    fn current_patterns(&self) -> TargetPatterns {
        let mut map = TargetPatterns::new();
        for (name, state) in self.targets.lock().iter() {
            if let Ok(patterns) = expand_watch_paths(&state.target.watch_paths) {
                map.insert(name.clone(), patterns);
            }
        }
        map
    }

    /// `stopTargets([name]?)` (spec §4.C): tears down the runner, stops
    /// the builder (idempotent, bounded to a few seconds by contract),
    /// and removes state. `None` stops every target.
    pub async fn stop_targets(&self, names: Option<&[String]>) {
        let targets: Vec<String> = match names {
            Some(names) => names.to_vec(),
            None => self.targets.lock().keys().cloned().collect(),
        };
        for name in &targets {
            let (builder, auto_run) = {
                let guard = self.targets.lock();
                match guard.get(name) {
                    Some(state) => (Some(state.builder.clone()), state.auto_run.clone()),
                    None => (None, None),
                }
            };
            if let Some(auto_run) = auto_run {
                auto_run.stop().await;
            }
            if let Some(builder) = builder {
                builder.stop().await;
            }
            if let Err(err) = self.state_store.remove_state(name) {
                tracing::warn!(target = %name, error = %err, "failed to remove state on stop");
            }
            self.targets.lock().remove(name);
        }
    }

    /// `getTargetStates` (spec §4.C).
    pub fn get_target_states(&self) -> Vec<TargetSnapshot> {
        self.targets
            .lock()
            .values()
            .map(|state| TargetSnapshot {
                name: state.target.name.clone(),
                target_type: state.target.target_type.to_string(),
                watching: state.watching,
                auto_run: state.auto_run.is_some(),
            })
            .collect()
    }

    pub fn auto_run_controller(&self, name: &str) -> Option<Arc<AutoRunController>> {
        self.targets.lock().get(name).and_then(|s| s.auto_run.clone())
    }
}

/// Wires the queue's completion notification (spec §4.E step 3, §4.G
/// "notified by E on successful completion") to the matching Auto-Run
/// Controller, if the target has one. Spawns a task since the queue's
/// observer callback is not itself async.
impl<C: Clock + 'static, W: StateWriter + Clone + 'static> crate::queue::BuildObserver for Lifecycle<C, W> {
    fn on_build_complete(&self, target: &str, status: &BuildStatus) {
        let Some(controller) = self.auto_run_controller(target) else {
            return;
        };
        let status = status.clone();
        tokio::spawn(async move {
            if status.is_success() {
                controller.on_build_success().await;
            } else {
                controller.on_build_failure();
            }
        });
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
