// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `QueueEntry` (spec §3): the transient unit the Intelligent Build
//! Queue owns. Entries for the same target collapse (§4.E invariant 1).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Why a build was scheduled (spec §3, §4.E `reasonBoost`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Reason {
    InitialBuild,
    FileChange,
    Retry,
    Manual,
}

impl Reason {
    /// `reasonBoost` added to `focusScore` at dispatch time (spec §4.E).
    pub fn priority_boost(self) -> f64 {
        match self {
            Reason::Retry => 0.5,
            Reason::FileChange | Reason::Manual => 0.0,
            Reason::InitialBuild => -0.25,
        }
    }
}

/// Where an entry sits in the dispatch lifecycle (used by
/// `getQueueStatus`, spec §4.E).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueEntryStatus {
    /// Waiting to be dispatched.
    Pending,
    /// Dispatched; a worker is awaiting `builder.build(...)`.
    InFlight,
    /// Buffered behind an in-flight build for the same target (invariant 1).
    Buffered,
}

/// A scheduled-but-not-yet-completed build (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntry {
    pub target_name: String,
    pub reason: Reason,
    pub changed_files: BTreeSet<String>,
    /// Epoch milliseconds the entry (or its oldest merged predecessor)
    /// was first enqueued.
    pub enqueued_at_ms: u64,
    pub priority: f64,
    pub merged_count: u32,
    pub status: QueueEntryStatus,
}

impl QueueEntry {
    pub fn new(
        target_name: impl Into<String>,
        reason: Reason,
        changed_files: BTreeSet<String>,
        enqueued_at_ms: u64,
        priority: f64,
    ) -> Self {
        Self {
            target_name: target_name.into(),
            reason,
            changed_files,
            enqueued_at_ms,
            priority,
            merged_count: 0,
            status: QueueEntryStatus::Pending,
        }
    }

    /// Union-merge another entry scheduled for the same target
    /// (spec §4.E invariant 1, §8 "Merge preservation"): the earliest
    /// `enqueued_at_ms` and highest urgency reason win, and the changed
    /// file sets union.
    pub fn merge(&mut self, other: QueueEntry) {
        debug_assert_eq!(self.target_name, other.target_name);
        self.changed_files.extend(other.changed_files);
        self.enqueued_at_ms = self.enqueued_at_ms.min(other.enqueued_at_ms);
        self.merged_count += 1 + other.merged_count;
        // Retry's boost outranks a plain file-change/manual boost; keep
        // whichever reason carries the larger boost so a retry doesn't
        // silently downgrade to file-change priority when merged.
        if other.reason.priority_boost() > self.reason.priority_boost() {
            self.reason = other.reason;
        }
    }
}

/// Deterministic dispatch ordering (spec §4.E invariant 3): higher
/// priority first; ties broken by earlier `enqueued_at_ms`; remaining
/// ties broken by target name, lexicographically.
pub fn dispatch_order(a: &QueueEntry, b: &QueueEntry) -> std::cmp::Ordering {
    b.priority
        .partial_cmp(&a.priority)
        .unwrap_or(std::cmp::Ordering::Equal)
        .then(a.enqueued_at_ms.cmp(&b.enqueued_at_ms))
        .then(a.target_name.cmp(&b.target_name))
}

#[cfg(test)]
#[path = "queue_entry_tests.rs"]
mod tests;
