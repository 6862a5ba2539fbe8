// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Config-Reload Orchestrator (spec §4.I): diffs two validated
//! configurations and emits the delta the supervisor applies to Lifecycle,
//! the watcher, and the queue.

use crate::validate::ValidatedConfig;
use indexmap::IndexMap;
use poltergeist_core::Target;

/// What changed between two successive configuration loads. Target-level
/// equality is structural (deep value comparison of the validated record,
/// spec §4.I) — `Target` derives `PartialEq` so this is just `!=`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDiff {
    pub targets_added: Vec<Target>,
    pub targets_removed: Vec<String>,
    /// The new value of each target whose structural shape changed.
    pub targets_modified: Vec<Target>,
    pub watchman_changed: bool,
    pub notifications_changed: bool,
    pub build_scheduling_changed: bool,
}

impl ConfigDiff {
    pub fn is_empty(&self) -> bool {
        self.targets_added.is_empty()
            && self.targets_removed.is_empty()
            && self.targets_modified.is_empty()
            && !self.watchman_changed
            && !self.notifications_changed
            && !self.build_scheduling_changed
    }
}

/// Diff `old` against `new`. Commutative for independent changes (spec §8
/// "Config diff commutativity"): adding X and removing Y, X != Y, yields the
/// same `ConfigDiff` fields regardless of which mutation is considered first,
/// because each target name is classified independently.
pub fn diff(old: &ValidatedConfig, new: &ValidatedConfig) -> ConfigDiff {
    let old_by_name: IndexMap<&str, &Target> =
        old.targets.iter().map(|t| (t.name.as_str(), t)).collect();
    let new_by_name: IndexMap<&str, &Target> =
        new.targets.iter().map(|t| (t.name.as_str(), t)).collect();

    let mut targets_added = Vec::new();
    let mut targets_modified = Vec::new();
    for (name, new_target) in &new_by_name {
        match old_by_name.get(name) {
            None => targets_added.push((*new_target).clone()),
            Some(old_target) => {
                if old_target != new_target {
                    targets_modified.push((*new_target).clone());
                }
            }
        }
    }

    let targets_removed: Vec<String> = old_by_name
        .keys()
        .filter(|name| !new_by_name.contains_key(*name))
        .map(|name| name.to_string())
        .collect();

    ConfigDiff {
        targets_added,
        targets_removed,
        targets_modified,
        watchman_changed: old.watchman != new.watchman,
        notifications_changed: old.notifications != new.notifications,
        build_scheduling_changed: old.build_scheduling != new.build_scheduling,
    }
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod tests;
