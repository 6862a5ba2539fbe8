// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The State Store (spec §4.A): per-target JSON files in a shared
//! directory, with heartbeats, staleness detection and host-local
//! locking. Grounded on the teacher's `storage::checkpoint` module for
//! the atomic-write shape and on `storage::state`/`storage::wal` for the
//! "own everything behind a typed store, inject the clock/writer" split.

use crate::atomic::{atomic_write, FsStateWriter, StateWriter};
use crate::config::StateStoreConfig;
use crate::error::StateError;
use crate::liveness::{current_hostname, current_pid, pid_is_alive};
use crate::path::state_file_path;
use crate::timefmt::{parse_rfc3339_ms, to_rfc3339};
use parking_lot::Mutex;
use poltergeist_core::{
    AppInfo, BuildStatus, Clock, PersistedState, ProcessInfo, SystemClock, Target,
    STATE_SCHEMA_VERSION,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Per-target serialization: two callers updating the same target's
/// state never interleave their read-modify-write.
type TargetLocks = Mutex<HashMap<String, Arc<Mutex<()>>>>;

pub struct StateStore<C: Clock = SystemClock, W: StateWriter = FsStateWriter> {
    config: StateStoreConfig,
    clock: Arc<C>,
    writer: W,
    locks: TargetLocks,
    owned: Mutex<HashSet<String>>,
    heartbeat_stop: Arc<tokio::sync::Notify>,
    heartbeat_task: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl StateStore<SystemClock, FsStateWriter> {
    pub fn new(config: StateStoreConfig) -> Arc<Self> {
        Self::with_clock_and_writer(config, Arc::new(SystemClock), FsStateWriter)
    }
}

impl<C: Clock + 'static, W: StateWriter + Clone> StateStore<C, W> {
    pub fn with_clock_and_writer(config: StateStoreConfig, clock: Arc<C>, writer: W) -> Arc<Self> {
        Arc::new(Self {
            config,
            clock,
            writer,
            locks: Mutex::new(HashMap::new()),
            owned: Mutex::new(HashSet::new()),
            heartbeat_stop: Arc::new(tokio::sync::Notify::new()),
            heartbeat_task: Mutex::new(None),
        })
    }

    fn lock_for(&self, target: &str) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .entry(target.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn path_for(&self, target: &str) -> std::path::PathBuf {
        state_file_path(
            &self.config.state_dir,
            &self.config.project_path,
            &self.config.project_name,
            target,
        )
    }

    fn project_basename(&self) -> String {
        self.config
            .project_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.config.project_name.clone())
    }

    fn write_state(&self, target: &str, state: &PersistedState) -> Result<(), StateError> {
        let lock = self.lock_for(target);
        let _guard = lock.lock();
        let path = self.path_for(target);
        let data = serde_json::to_vec_pretty(state).map_err(|e| StateError::Corrupt {
            target: target.to_string(),
            reason: e.to_string(),
        })?;
        atomic_write(&self.writer, &path, &data).map_err(|e| StateError::Io {
            target: target.to_string(),
            source: e,
        })
    }

    /// Create and persist the initial `PersistedState` for `target`.
    pub fn initialize_state(&self, target: &Target) -> Result<PersistedState, StateError> {
        let now = self.clock.epoch_ms();
        let state = PersistedState {
            version: STATE_SCHEMA_VERSION,
            project_path: self.config.project_path.to_string_lossy().into_owned(),
            project_name: self.project_basename(),
            target: target.name.clone(),
            target_type: target.target_type.to_string(),
            config_path: self.config.config_path.clone(),
            process: ProcessInfo {
                pid: current_pid(),
                hostname: current_hostname(),
                is_active: true,
                start_time: to_rfc3339(now),
                last_heartbeat: to_rfc3339(now),
            },
            last_build: None,
            app_info: None,
            post_build: Vec::new(),
        };
        self.write_state(&target.name, &state)?;
        self.owned.lock().insert(target.name.clone());
        Ok(state)
    }

    /// Strict read: a missing file is `Ok(None)`, but a corrupt file is
    /// `Err` so callers can tell "no state" from "state I can't trust".
    pub fn read_state(&self, target: &str) -> Result<Option<PersistedState>, StateError> {
        let lock = self.lock_for(target);
        let _guard = lock.lock();
        let path = self.path_for(target);
        if !self.writer.exists(&path) {
            return Ok(None);
        }
        let bytes = self.writer.read(&path).map_err(|e| StateError::Io {
            target: target.to_string(),
            source: e,
        })?;
        let state = serde_json::from_slice(&bytes).map_err(|e| StateError::Corrupt {
            target: target.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(state))
    }

    /// Lenient read: any error (missing, corrupt, io) collapses to
    /// `None` and is logged, never propagated to the caller.
    pub fn read_state_lenient(&self, target: &str) -> Option<PersistedState> {
        match self.read_state(target) {
            Ok(state) => state,
            Err(err) => {
                tracing::warn!(target = target, error = %err, "lenient state read failed");
                None
            }
        }
    }

    pub fn update_build_status(&self, target: &str, status: BuildStatus) -> Result<(), StateError> {
        let mut state = self
            .read_state(target)?
            .ok_or_else(|| StateError::NotFound { target: target.to_string() })?;
        state.last_build = Some(status);
        self.write_state(target, &state)
    }

    /// Merge `partial` into the existing `appInfo`: a `Some` field in
    /// `partial` overwrites, a `None` field leaves the prior value alone.
    pub fn update_app_info(&self, target: &str, partial: AppInfo) -> Result<(), StateError> {
        let mut state = self
            .read_state(target)?
            .ok_or_else(|| StateError::NotFound { target: target.to_string() })?;
        let mut merged = state.app_info.unwrap_or_default();
        if partial.output_path.is_some() {
            merged.output_path = partial.output_path;
        }
        if partial.icon_path.is_some() {
            merged.icon_path = partial.icon_path;
        }
        if partial.bundle_id.is_some() {
            merged.bundle_id = partial.bundle_id;
        }
        state.app_info = Some(merged);
        self.write_state(target, &state)
    }

    fn is_stale(&self, state: &PersistedState) -> bool {
        if !pid_is_alive(state.process.pid) {
            return true;
        }
        let Some(last_heartbeat_ms) = parse_rfc3339_ms(&state.process.last_heartbeat) else {
            return true;
        };
        let now = self.clock.epoch_ms();
        now.saturating_sub(last_heartbeat_ms) > self.config.stale_threshold.as_millis() as u64
    }

    /// False if there's no state, the state is owned by this process, or
    /// the state is stale; true otherwise (spec §4.A).
    pub fn is_locked(&self, target: &str) -> bool {
        let Some(state) = self.read_state_lenient(target) else {
            return false;
        };
        if state.process.is_owned_by(current_pid(), &current_hostname()) {
            return false;
        }
        if self.is_stale(&state) {
            return false;
        }
        true
    }

    /// Clear a lock left behind by a dead (or unreachable) owner without
    /// waiting for the stale threshold, preserving build history.
    pub fn force_unlock(&self, target: &str) -> Result<(), StateError> {
        let Some(mut state) = self.read_state(target)? else {
            return Ok(());
        };
        state.process.pid = 0;
        state.process.is_active = false;
        state.process.last_heartbeat = to_rfc3339(0);
        self.write_state(target, &state)
    }

    pub fn remove_state(&self, target: &str) -> Result<(), StateError> {
        let lock = self.lock_for(target);
        let _guard = lock.lock();
        let path = self.path_for(target);
        self.writer.remove(&path).map_err(|e| StateError::Io {
            target: target.to_string(),
            source: e,
        })?;
        self.owned.lock().remove(target);
        Ok(())
    }

    /// Scan `state_dir` for every state file belonging to `project_root`
    /// (same basename-hash8 prefix), tolerating corrupt entries by
    /// skipping them rather than failing the whole discovery pass.
    pub fn discover_states(&self, project_root: &std::path::Path) -> HashMap<String, PersistedState> {
        let prefix = format!(
            "{}-{}-",
            self.project_basename(),
            crate::path::hash8(project_root)
        );
        let mut found = HashMap::new();
        let Ok(entries) = std::fs::read_dir(&self.config.state_dir) else {
            return found;
        };
        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else { continue };
            let Some(rest) = name.strip_prefix(&prefix) else { continue };
            let Some(target_name) = rest.strip_suffix(".state") else { continue };
            if let Ok(bytes) = std::fs::read(entry.path()) {
                if let Ok(state) = serde_json::from_slice::<PersistedState>(&bytes) {
                    found.insert(target_name.to_string(), state);
                }
            }
        }
        found
    }

    /// Remove on-disk states under this project whose owner is stale —
    /// garbage collection distinct from `remove_state`, which is driven
    /// by explicit target teardown.
    pub fn cleanup(&self) {
        for (target, state) in self.discover_states(&self.config.project_path.clone()) {
            if self.is_stale(&state) {
                if let Err(err) = self.remove_state(&target) {
                    tracing::warn!(target = %target, error = %err, "failed to remove stale state");
                }
            }
        }
    }

    /// Start the process-wide heartbeat: every `heartbeat_interval`,
    /// rewrite `lastHeartbeat` for each target this store owns.
    pub fn start_heartbeat(self: &Arc<Self>) {
        if self.heartbeat_task.lock().is_some() {
            return;
        }
        let store = Arc::clone(self);
        let stop = Arc::clone(&self.heartbeat_stop);
        let interval = self.config.heartbeat_interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => store.tick_heartbeat(),
                    _ = stop.notified() => break,
                }
            }
        });
        *self.heartbeat_task.lock() = Some(handle);
    }

    fn tick_heartbeat(&self) {
        let now = self.clock.epoch_ms();
        let owned: Vec<String> = self.owned.lock().iter().cloned().collect();
        for target in owned {
            if let Ok(Some(mut state)) = self.read_state(&target) {
                state.process.last_heartbeat = to_rfc3339(now);
                if let Err(err) = self.write_state(&target, &state) {
                    tracing::warn!(target = %target, error = %err, "heartbeat write failed, retrying next tick");
                }
            }
        }
    }

    /// Stop the heartbeat, flushing one final `process.isActive=false`
    /// update for every owned target.
    pub fn stop_heartbeat(&self) {
        self.heartbeat_stop.notify_one();
        if let Some(handle) = self.heartbeat_task.lock().take() {
            handle.abort();
        }
        let now = self.clock.epoch_ms();
        let owned: Vec<String> = self.owned.lock().iter().cloned().collect();
        for target in owned {
            if let Ok(Some(mut state)) = self.read_state(&target) {
                state.process.is_active = false;
                state.process.last_heartbeat = to_rfc3339(now);
                let _ = self.write_state(&target, &state);
            }
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
