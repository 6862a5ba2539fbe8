// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Auto-Run Controller (spec §4.G): one per executable target with
//! `autoRun.enabled`, tracking `idle -> launching -> running ->
//! restart-pending -> terminating -> idle` and managing the spawned
//! child's lifetime. Signal delivery is grounded on the pack's
//! `nix::sys::signal` usage (`alfredjeanlab-otters/crates/cli`) since
//! neither the teacher nor `tokio::process` exposes anything short of
//! SIGKILL on its own.

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use poltergeist_core::{Clock, Target};
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Idle,
    Launching,
    Running,
    RestartPending,
    Terminating,
}

struct Inner {
    state: RunState,
    child: Option<Child>,
    /// Coalesces further `onBuildSuccess` calls that arrive while a
    /// restart is already pending (spec §4.G "only one restart may be
    /// pending").
    restart_coalesced: bool,
    /// Bumped by every `stop()` call. A `schedule_restart` task stashes
    /// the epoch it was scheduled under and checks it again once its
    /// sleep/signal/wait sequence completes; a mismatch means `stop()`
    /// ran in the meantime, so the pending restart aborts instead of
    /// relaunching a child after shutdown.
    epoch: u64,
}

pub struct AutoRunController {
    target: Target,
    project_root: PathBuf,
    clock: std::sync::Arc<dyn Clock>,
    inner: Mutex<Inner>,
}

fn resolve_invocation(target: &Target) -> Result<(String, Vec<String>), String> {
    let auto_run = target
        .auto_run
        .as_ref()
        .ok_or_else(|| "autoRun not configured".to_string())?;
    if let Some(command) = &auto_run.command {
        return Ok((command.clone(), auto_run.args.clone()));
    }
    let output_path = target
        .output_path
        .as_ref()
        .ok_or_else(|| "outputPath missing".to_string())?;

    let ext = std::path::Path::new(output_path).extension().and_then(|e| e.to_str());
    let (program, mut args) = match ext {
        Some("js") | Some("mjs") => ("node".to_string(), vec![output_path.clone()]),
        Some("py") => ("python".to_string(), vec![output_path.clone()]),
        Some("sh") => ("sh".to_string(), vec![output_path.clone()]),
        _ => (output_path.clone(), Vec::new()),
    };
    args.extend(auto_run.args.iter().cloned());
    Ok((program, args))
}

fn parse_signal(name: &str) -> Signal {
    match name {
        "SIGTERM" => Signal::SIGTERM,
        "SIGKILL" => Signal::SIGKILL,
        "SIGHUP" => Signal::SIGHUP,
        "SIGINT" => Signal::SIGINT,
        _ => Signal::SIGINT,
    }
}

impl AutoRunController {
    pub fn new(target: Target, project_root: PathBuf, clock: std::sync::Arc<dyn Clock>) -> Self {
        Self {
            target,
            project_root,
            clock,
            inner: Mutex::new(Inner {
                state: RunState::Idle,
                child: None,
                restart_coalesced: false,
                epoch: 0,
            }),
        }
    }

    fn spawn_command(&self) -> Result<Command, String> {
        let (program, args) = resolve_invocation(&self.target)?;
        let mut cmd = Command::new(&program);
        cmd.args(&args).current_dir(&self.project_root);
        if let Some(auto_run) = &self.target.auto_run {
            cmd.envs(auto_run.env.iter());
        }
        Ok(cmd)
    }

    /// `onBuildSuccess` (spec §4.G): first success launches, a later
    /// success while running schedules a coalesced restart.
    pub async fn on_build_success(&self) {
        let mut guard = self.inner.lock().await;
        match guard.state {
            RunState::Idle => {
                guard.state = RunState::Launching;
                let mut cmd = match self.spawn_command() {
                    Ok(cmd) => cmd,
                    Err(message) => {
                        tracing::warn!(target = %self.target.name, error = %message, "auto-run launch failed");
                        guard.state = RunState::Idle;
                        return;
                    }
                };
                match cmd.spawn() {
                    Ok(child) => {
                        guard.child = Some(child);
                        guard.state = RunState::Running;
                    }
                    Err(err) => {
                        tracing::warn!(target = %self.target.name, error = %err, "auto-run spawn failed");
                        guard.state = RunState::Idle;
                    }
                }
            }
            RunState::Running | RunState::RestartPending => {
                if guard.restart_coalesced {
                    return;
                }
                guard.restart_coalesced = true;
                guard.state = RunState::RestartPending;
                drop(guard);
                self.schedule_restart().await;
            }
            RunState::Launching | RunState::Terminating => {
                // A success landing mid-transition is coalesced into the
                // next stable state's handling rather than acted on here.
            }
        }
    }

    async fn schedule_restart(&self) {
        let delay_ms = self
            .target
            .auto_run
            .as_ref()
            .map(|a| a.restart_delay_ms)
            .unwrap_or(250);
        let signal_name = self
            .target
            .auto_run
            .as_ref()
            .map(|a| a.restart_signal.clone())
            .unwrap_or_else(|| "SIGINT".to_string());

        let epoch = self.inner.lock().await.epoch;

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;

        // `stop()` may have run during the sleep above; a pending restart
        // must not relaunch a child after shutdown (spec §4.G "cancel any
        // pending restart timer").
        if self.inner.lock().await.epoch != epoch {
            return;
        }

        let pid = {
            let guard = self.inner.lock().await;
            guard.child.as_ref().and_then(|c| c.id())
        };
        if let Some(pid) = pid {
            let _ = kill(Pid::from_raw(pid as i32), parse_signal(&signal_name));
        }

        let exited = {
            let mut guard = self.inner.lock().await;
            match guard.child.as_mut() {
                Some(child) => child.wait().await.is_ok(),
                None => true,
            }
        };
        if !exited {
            return;
        }

        let mut guard = self.inner.lock().await;
        if guard.epoch != epoch {
            return;
        }
        guard.child = None;
        guard.restart_coalesced = false;
        guard.state = RunState::Idle;
        drop(guard);
        self.on_build_success().await;
    }

    /// `onBuildFailure` (spec §4.G): no state change, the previous
    /// child (if any) keeps running.
    pub fn on_build_failure(&self) {
        tracing::debug!(target = %self.target.name, "build failed, leaving auto-run process untouched");
    }

    /// `stop()` (spec §4.G): SIGTERM, escalate to SIGKILL after 5s.
    pub async fn stop(&self) {
        let mut guard = self.inner.lock().await;
        guard.state = RunState::Terminating;
        guard.epoch = guard.epoch.wrapping_add(1);
        let Some(mut child) = guard.child.take() else {
            guard.state = RunState::Idle;
            return;
        };
        drop(guard);

        if let Some(pid) = child.id() {
            let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
        }
        let exited = tokio::time::timeout(Duration::from_secs(5), child.wait()).await;
        if exited.is_err() {
            if let Some(pid) = child.id() {
                let _ = kill(Pid::from_raw(pid as i32), Signal::SIGKILL);
            }
            let _ = child.wait().await;
        }

        let mut guard = self.inner.lock().await;
        guard.state = RunState::Idle;
        guard.restart_coalesced = false;
    }

    pub async fn is_running(&self) -> bool {
        matches!(
            self.inner.lock().await.state,
            RunState::Running | RunState::RestartPending
        )
    }

    pub fn clock(&self) -> &std::sync::Arc<dyn Clock> {
        &self.clock
    }
}

#[cfg(test)]
#[path = "autorun_tests.rs"]
mod tests;
