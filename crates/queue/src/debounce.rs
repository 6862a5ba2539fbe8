// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Debouncer / Queue Feeder (spec §4.D): collects changes per
//! target, waits for quiescence, hands the coalesced batch to the
//! queue. Modeled as a pure, clock-driven data structure — set a
//! deadline, poll for what's ready — the same shape as the queue's own
//! `focusScore` decay (spec §4.E) rather than one `tokio::time::sleep`
//! task per target, so debounce semantics (spec §8 "Debouncer
//! idempotence") are testable against a `FakeClock` without sleeping.

use parking_lot::Mutex;
use poltergeist_core::Clock;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Where the Debouncer hands a settled batch (spec §4.D step 3: "hand
/// off to the queue"). Implemented by `IntelligentBuildQueue`; kept as
/// a narrow trait so the debounce logic above is testable on its own.
pub trait QueueSink: Send + Sync {
    fn on_file_changed(&self, target_name: &str, changed_files: BTreeSet<String>);
}

struct PendingEntry {
    files: BTreeSet<String>,
    fires_at_ms: u64,
}

/// Per-target debounce state (spec §4.D). `on_batch` arms/restarts a
/// target's timer; `poll_ready` (driven by a caller's event loop)
/// drains whatever has settled.
pub struct Debouncer<C: Clock> {
    clock: Arc<C>,
    pending: Mutex<HashMap<String, PendingEntry>>,
}

impl<C: Clock> Debouncer<C> {
    pub fn new(clock: Arc<C>) -> Self {
        Self {
            clock,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Union `changed_files` into `target`'s pending set and (re)arm its
    /// settling timer for `settling_delay_ms` from now (spec §4.D steps
    /// 1-2). Events are never dropped across a restart: the union only
    /// grows.
    pub fn on_files_changed(
        &self,
        target: &str,
        changed_files: impl IntoIterator<Item = String>,
        settling_delay_ms: u64,
    ) {
        let now = self.clock.epoch_ms();
        let mut pending = self.pending.lock();
        let entry = pending.entry(target.to_string()).or_insert_with(|| PendingEntry {
            files: BTreeSet::new(),
            fires_at_ms: now + settling_delay_ms,
        });
        entry.files.extend(changed_files);
        entry.fires_at_ms = now + settling_delay_ms;
    }

    /// Epoch ms of the earliest pending deadline, if any — the caller's
    /// event loop sleeps until this point (or the next watcher batch,
    /// whichever comes first).
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.pending.lock().values().map(|e| e.fires_at_ms).min()
    }

    /// Drain every target whose settling window has elapsed as of `now`,
    /// returning `(target_name, snapshot)` pairs. Draining clears the
    /// pending set for each returned target (spec §4.D step 3).
    pub fn poll_ready(&self, now_ms: u64) -> Vec<(String, BTreeSet<String>)> {
        let mut pending = self.pending.lock();
        let ready: Vec<String> = pending
            .iter()
            .filter(|(_, e)| e.fires_at_ms <= now_ms)
            .map(|(name, _)| name.clone())
            .collect();
        ready
            .into_iter()
            .map(|name| {
                let entry = pending.remove(&name).unwrap_or(PendingEntry {
                    files: BTreeSet::new(),
                    fires_at_ms: now_ms,
                });
                (name, entry.files)
            })
            .collect()
    }

    /// Drain every target regardless of deadline — used on supervisor
    /// shutdown (spec §5: "pending files are discarded after being
    /// flushed to the queue once if already scheduled").
    pub fn flush_all(&self) -> Vec<(String, BTreeSet<String>)> {
        let mut pending = self.pending.lock();
        pending
            .drain()
            .map(|(name, entry)| (name, entry.files))
            .collect()
    }

    /// Poll and forward every settled target to `sink` (spec §4.D step
    /// 3). Convenience wrapper for the production event loop.
    pub fn dispatch_ready(&self, now_ms: u64, sink: &dyn QueueSink) {
        for (target, files) in self.poll_ready(now_ms) {
            sink.on_file_changed(&target, files);
        }
    }
}

#[cfg(test)]
#[path = "debounce_tests.rs"]
mod tests;
