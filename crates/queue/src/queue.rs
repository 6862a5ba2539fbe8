// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Intelligent Build Queue (spec §4.E) — the core's largest
//! component. Orders, deduplicates, and dispatches builds under a
//! parallelism cap with priority decay.

use crate::builder::SharedBuilder;
use crate::debounce::QueueSink;
use parking_lot::Mutex;
use poltergeist_core::{
    dispatch_order, BuildSchedulingConfig, BuildStatus, Clock, ErrorType, QueueEntry,
    QueueEntryStatus, Reason,
};
use poltergeist_state::{FsStateWriter, StateStore, StateWriter};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// Baseline build timeout before `buildTimeoutMultiplier` is applied
/// (spec §4.E). `spec.md` §6 names no per-target override key for this,
/// so the baseline is a fixed queue-wide constant; see `DESIGN.md`.
const DEFAULT_BASELINE: Duration = Duration::from_secs(5 * 60);

/// Notified when a build completes — the seam the Auto-Run Controller
/// (spec §4.G "notified by E on successful completion") hooks into
/// without the queue needing to know it exists.
pub trait BuildObserver: Send + Sync {
    fn on_build_complete(&self, target: &str, status: &BuildStatus);
}

/// A single row of `getQueueStatus()` (spec §4.E).
#[derive(Debug, Clone)]
pub struct QueueStatusEntry {
    pub target: String,
    pub state: QueueEntryStatus,
    pub priority: f64,
    pub merged_count: u32,
    pub enqueued_at_ms: u64,
}

struct FocusState {
    last_change_at_ms: u64,
}

struct QueueState {
    builders: HashMap<String, SharedBuilder>,
    pending: HashMap<String, QueueEntry>,
    buffered: HashMap<String, QueueEntry>,
    in_flight: HashSet<String>,
    focus: HashMap<String, FocusState>,
}

pub struct IntelligentBuildQueue<C: Clock, W: StateWriter + Clone = FsStateWriter> {
    scheduling: BuildSchedulingConfig,
    clock: Arc<C>,
    state: Mutex<QueueState>,
    observers: Mutex<Vec<Arc<dyn BuildObserver>>>,
    state_store: Arc<StateStore<C, W>>,
}

impl<C: Clock + 'static, W: StateWriter + Clone + 'static> IntelligentBuildQueue<C, W> {
    pub fn new(
        scheduling: BuildSchedulingConfig,
        clock: Arc<C>,
        state_store: Arc<StateStore<C, W>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            scheduling,
            clock,
            state: Mutex::new(QueueState {
                builders: HashMap::new(),
                pending: HashMap::new(),
                buffered: HashMap::new(),
                in_flight: HashSet::new(),
                focus: HashMap::new(),
            }),
            observers: Mutex::new(Vec::new()),
            state_store,
        })
    }

    pub fn add_observer(&self, observer: Arc<dyn BuildObserver>) {
        self.observers.lock().push(observer);
    }

    /// Idempotent; updates the builder reference on re-register (spec
    /// §4.E).
    pub fn register_target(&self, target_name: &str, builder: SharedBuilder) {
        self.state.lock().builders.insert(target_name.to_string(), builder);
    }

    pub fn unregister_target(&self, target_name: &str) {
        let mut state = self.state.lock();
        state.builders.remove(target_name);
        state.pending.remove(target_name);
        state.buffered.remove(target_name);
        state.focus.remove(target_name);
    }

    fn reason_for_file_change(&self, target_name: &str) {
        let now = self.clock.epoch_ms();
        self.state
            .lock()
            .focus
            .insert(target_name.to_string(), FocusState { last_change_at_ms: now });
    }

    /// `focusScore` (spec §4.E): 1.0 immediately after a change, decaying
    /// linearly to 0 over `priorityDecayTime`. `focusDetectionWindow`
    /// governs how long repeated changes "compound" before decay begins:
    /// while elapsed time since the last change is still inside the
    /// window, the score stays pinned at 1.0 (so a burst of edits that
    /// each land within the window of the previous one never decays);
    /// once a change has gone quiet for longer than the window, decay
    /// starts counting from the end of that window rather than from the
    /// change itself — each further change inside the window keeps
    /// pushing that decay start later ("repeated 1.0 assignments extend
    /// decay start").
    fn focus_score(&self, target_name: &str, now_ms: u64) -> f64 {
        if !self.scheduling.prioritization.enabled {
            return 0.0;
        }
        let state = self.state.lock();
        let Some(focus) = state.focus.get(target_name) else {
            return 0.0;
        };
        let elapsed = now_ms.saturating_sub(focus.last_change_at_ms);
        let window = self.scheduling.prioritization.focus_detection_window_ms;
        if elapsed <= window {
            return 1.0;
        }
        let decay_elapsed = elapsed - window;
        let decay = self.scheduling.prioritization.priority_decay_time_ms.max(1);
        (1.0 - decay_elapsed as f64 / decay as f64).max(0.0)
    }

    /// `priority = focusScore + reasonBoost` (spec §4.E) — but when
    /// prioritization is disabled, every priority must be equal so
    /// `dispatch_order`'s tiebreak (`enqueuedAt`, then target name) is
    /// the sole ordering signal and the queue reduces to FIFO. The
    /// reason boost is itself a prioritization signal, so it is gated
    /// the same way `focusScore` already is.
    fn priority_for(&self, target_name: &str, reason: Reason, now_ms: u64) -> f64 {
        if !self.scheduling.prioritization.enabled {
            return 0.0;
        }
        self.focus_score(target_name, now_ms) + reason.priority_boost()
    }

    /// Merge `entry` into whichever bucket is appropriate: `buffered` if
    /// the target is in-flight (spec §4.E invariant 1), `pending`
    /// otherwise.
    fn enqueue(&self, mut entry: QueueEntry) {
        let now = self.clock.epoch_ms();
        entry.priority = self.priority_for(&entry.target_name, entry.reason, now);
        let mut state = self.state.lock();
        let target = entry.target_name.clone();
        if state.in_flight.contains(&target) {
            match state.buffered.remove(&target) {
                Some(mut existing) => {
                    existing.merge(entry);
                    state.buffered.insert(target, existing);
                }
                None => {
                    state.buffered.insert(target, entry);
                }
            }
        } else {
            match state.pending.remove(&target) {
                Some(mut existing) => {
                    existing.merge(entry);
                    state.pending.insert(target, existing);
                }
                None => {
                    state.pending.insert(target, entry);
                }
            }
        }
    }

    /// Schedule a build with no file context — `initial-build`,
    /// `manual`, `retry` (spec §4.E).
    pub fn queue_target_build(self: &Arc<Self>, target_name: &str, reason: Reason) {
        let now = self.clock.epoch_ms();
        let priority = self.priority_for(target_name, reason, now);
        self.enqueue(QueueEntry::new(target_name, reason, BTreeSet::new(), now, priority));
        self.try_dispatch();
    }

    /// Schedule a build from a debounced batch (spec §4.E). Implements
    /// `QueueSink` so the Debouncer can hand off without depending on
    /// this type directly.
    pub fn handle_file_changed(self: &Arc<Self>, target_name: &str, changed_files: BTreeSet<String>) {
        self.reason_for_file_change(target_name);
        let now = self.clock.epoch_ms();
        let priority = self.priority_for(target_name, Reason::FileChange, now);
        self.enqueue(QueueEntry::new(target_name, Reason::FileChange, changed_files, now, priority));
        self.try_dispatch();
    }

    pub fn get_queue_status(&self) -> Vec<QueueStatusEntry> {
        let now = self.clock.epoch_ms();
        let state = self.state.lock();
        let mut rows = Vec::new();
        for target in state.in_flight.iter() {
            rows.push(QueueStatusEntry {
                target: target.clone(),
                state: QueueEntryStatus::InFlight,
                priority: self.focus_score(target, now),
                merged_count: 0,
                enqueued_at_ms: now,
            });
        }
        for entry in state.pending.values() {
            rows.push(QueueStatusEntry {
                target: entry.target_name.clone(),
                state: QueueEntryStatus::Pending,
                priority: entry.priority,
                merged_count: entry.merged_count,
                enqueued_at_ms: entry.enqueued_at_ms,
            });
        }
        for entry in state.buffered.values() {
            rows.push(QueueStatusEntry {
                target: entry.target_name.clone(),
                state: QueueEntryStatus::Buffered,
                priority: entry.priority,
                merged_count: entry.merged_count,
                enqueued_at_ms: entry.enqueued_at_ms,
            });
        }
        rows
    }

    pub fn in_flight_count(&self) -> usize {
        self.state.lock().in_flight.len()
    }

    /// Stop every registered builder (spec §15 step 7: "call
    /// `builder.stop()` on anything still running past [the grace
    /// period]"). Idempotent for idle builders by the Builder contract.
    pub async fn stop_all_builders(&self) {
        let builders: Vec<SharedBuilder> = self.state.lock().builders.values().cloned().collect();
        for builder in builders {
            builder.stop().await;
        }
    }

    pub fn is_in_flight(&self, target_name: &str) -> bool {
        self.state.lock().in_flight.contains(target_name)
    }

    /// Pull every entry currently buffered or pending, for migration to
    /// a freshly-constructed queue on `buildSchedulingChanged` (spec
    /// §4.E "No build is lost").
    pub fn drain_entries(&self) -> Vec<QueueEntry> {
        let mut state = self.state.lock();
        state
            .pending
            .drain()
            .map(|(_, e)| e)
            .chain(state.buffered.drain().map(|(_, e)| e))
            .collect()
    }

    pub fn migrate_entry(self: &Arc<Self>, entry: QueueEntry) {
        self.enqueue(entry);
    }

    /// While capacity allows, pick the highest-priority ready entry and
    /// spawn a worker for it (spec §4.E dispatch loop steps 1-2).
    pub fn try_dispatch(self: &Arc<Self>) {
        loop {
            let next = {
                let mut state = self.state.lock();
                if state.in_flight.len() >= self.scheduling.parallelization.max(1) {
                    return;
                }
                let mut candidates: Vec<QueueEntry> = state.pending.values().cloned().collect();
                candidates.sort_by(dispatch_order);
                let Some(winner) = candidates.into_iter().next() else {
                    return;
                };
                state.pending.remove(&winner.target_name);
                state.in_flight.insert(winner.target_name.clone());
                winner
            };
            let queue = Arc::clone(self);
            tokio::spawn(async move {
                queue.run_build(next).await;
            });
        }
    }

    async fn run_build(self: Arc<Self>, entry: QueueEntry) {
        let target = entry.target_name.clone();
        let builder = {
            let state = self.state.lock();
            state.builders.get(&target).cloned()
        };

        let status = match builder {
            None => BuildStatus::failure(
                poltergeist_state::timefmt::to_rfc3339(self.clock.epoch_ms()),
                0,
                None,
                format!("no builder registered for target '{target}'"),
                "no builder registered",
                ErrorType::Configuration,
                None,
            ),
            Some(builder) => {
                let building = BuildStatus::building(
                    poltergeist_state::timefmt::to_rfc3339(self.clock.epoch_ms()),
                    Some(builder.describe_builder()),
                );
                if let Err(err) = self.state_store.update_build_status(&target, building) {
                    tracing::warn!(target = %target, error = %err, "failed to persist building status");
                }

                let started = self.clock.epoch_ms();
                let timeout = DEFAULT_BASELINE.mul_f64(self.scheduling.prioritization.build_timeout_multiplier);
                match tokio::time::timeout(timeout, builder.build(&entry.changed_files)).await {
                    Ok(status) => status,
                    Err(_) => {
                        builder.stop().await;
                        BuildStatus::failure(
                            poltergeist_state::timefmt::to_rfc3339(self.clock.epoch_ms()),
                            self.clock.epoch_ms().saturating_sub(started),
                            None,
                            "build timed out",
                            "build timed out",
                            ErrorType::Runtime,
                            Some(builder.describe_builder()),
                        )
                    }
                }
            }
        };

        if let Err(err) = self.state_store.update_build_status(&target, status.clone()) {
            tracing::warn!(target = %target, error = %err, "failed to persist build status");
        }

        for observer in self.observers.lock().iter() {
            observer.on_build_complete(&target, &status);
        }

        let promoted = {
            let mut state = self.state.lock();
            state.in_flight.remove(&target);
            state.buffered.remove(&target)
        };
        if let Some(entry) = promoted {
            self.enqueue(entry);
        }

        self.try_dispatch();
    }
}

impl<C: Clock + 'static, W: StateWriter + Clone + 'static> QueueSink for Arc<IntelligentBuildQueue<C, W>> {
    fn on_file_changed(&self, target_name: &str, changed_files: BTreeSet<String>) {
        self.handle_file_changed(target_name, changed_files);
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
