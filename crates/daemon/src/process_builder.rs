// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The common-contract `Builder` (spec §4.F, §1 "per-ecosystem builder
//! plug-ins... beyond their common contract" is out of scope): every
//! target is built by invoking a shell command through `sh -c`. The
//! command itself is supplied by the target's own `environment` map
//! under `POLTERGEIST_BUILD_COMMAND` — config authors write their
//! per-ecosystem invocation (`cargo build --release`, `npm run build`,
//! `cmake --build build`, ...) once, and this crate never needs to know
//! which ecosystem it is.

use async_trait::async_trait;
use poltergeist_core::{extract_error_summary, BuildStatus, ErrorType, Target};
use poltergeist_queue::{Builder, BuilderFactory, SharedBuilder};
use poltergeist_state::timefmt::to_rfc3339;
use std::collections::BTreeSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::sync::Notify;

const BUILD_COMMAND_KEY: &str = "POLTERGEIST_BUILD_COMMAND";

async fn git_head(project_root: &Path) -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(project_root)
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8(output.stdout).ok()?.trim().to_string())
}

/// Spawns `target.environment["POLTERGEIST_BUILD_COMMAND"]` via `sh -c`,
/// with the project root as the working directory and stdout/stderr
/// appended to a companion log file (spec §4.A "per-target ... log").
pub struct ProcessBuilder {
    target: Target,
    project_root: PathBuf,
    log_path: PathBuf,
    command: Option<String>,
    child: tokio::sync::Mutex<Option<Child>>,
    stop_notify: Notify,
}

impl ProcessBuilder {
    pub fn new(target: Target, project_root: PathBuf, log_path: PathBuf) -> Self {
        let command = target.environment.get(BUILD_COMMAND_KEY).cloned();
        Self {
            target,
            project_root,
            log_path,
            command,
            child: tokio::sync::Mutex::new(None),
            stop_notify: Notify::new(),
        }
    }

    /// Appends captured stdout/stderr to the per-target log file (spec
    /// §4.A "per-target ... log"); builders own persisting their own
    /// output (§4.F), this is that persistence step.
    fn append_log(&self, stdout: &[u8], stderr: &[u8]) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(&self.log_path)?;
        file.write_all(stdout)?;
        file.write_all(stderr)?;
        Ok(())
    }
}

#[async_trait]
impl Builder for ProcessBuilder {
    async fn validate(&self) -> Result<(), String> {
        if self.command.is_none() {
            return Err(format!(
                "target {:?} has no {BUILD_COMMAND_KEY} in its environment",
                self.target.name
            ));
        }
        Ok(())
    }

    async fn build(&self, changed_files: &BTreeSet<String>) -> BuildStatus {
        let started = std::time::Instant::now();
        let started_at = to_rfc3339(
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64,
        );

        let Some(command) = &self.command else {
            return BuildStatus::failure(
                started_at,
                0,
                None,
                format!("no {BUILD_COMMAND_KEY} configured"),
                "missing build command",
                ErrorType::Configuration,
                Some(self.describe_builder()),
            );
        };

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .current_dir(&self.project_root)
            .envs(&self.target.environment)
            .env("POLTERGEIST_CHANGED_FILES", changed_files.iter().cloned().collect::<Vec<_>>().join("\n"))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                return BuildStatus::failure(
                    started_at,
                    0,
                    None,
                    err.to_string(),
                    "failed to spawn build command",
                    ErrorType::Runtime,
                    Some(self.describe_builder()),
                );
            }
        };
        let mut child_stdout = child.stdout.take();
        let mut child_stderr = child.stderr.take();
        *self.child.lock().await = Some(child);

        let outcome = tokio::select! {
            status = async {
                let mut guard = self.child.lock().await;
                match guard.as_mut() {
                    Some(child) => child.wait().await,
                    None => Err(std::io::Error::other("build process handle missing")),
                }
            } => Some(status),
            () = self.stop_notify.notified() => None,
        };
        *self.child.lock().await = None;

        let mut stdout_buf = Vec::new();
        let mut stderr_buf = Vec::new();
        if let Some(pipe) = child_stdout.as_mut() {
            let _ = pipe.read_to_end(&mut stdout_buf).await;
        }
        if let Some(pipe) = child_stderr.as_mut() {
            let _ = pipe.read_to_end(&mut stderr_buf).await;
        }
        if let Err(err) = self.append_log(&stdout_buf, &stderr_buf) {
            tracing::warn!(target: "poltergeist_daemon", target_name = %self.target.name, error = %err, "failed to persist build log");
        }

        let duration_ms = started.elapsed().as_millis() as u64;
        let combined_output = || {
            let mut combined = String::from_utf8_lossy(&stderr_buf).into_owned();
            if combined.trim().is_empty() {
                combined = String::from_utf8_lossy(&stdout_buf).into_owned();
            }
            combined
        };

        match outcome {
            None => BuildStatus::failure(
                started_at,
                duration_ms,
                None,
                "build stopped",
                "build stopped",
                ErrorType::Runtime,
                Some(self.describe_builder()),
            ),
            Some(Err(err)) => BuildStatus::failure(
                started_at,
                duration_ms,
                None,
                err.to_string(),
                "failed to wait on build command",
                ErrorType::Runtime,
                Some(self.describe_builder()),
            ),
            Some(Ok(status)) if status.success() => {
                let git_hash = git_head(&self.project_root).await;
                BuildStatus::success(started_at, duration_ms, status.code(), git_hash, Some(self.describe_builder()))
            }
            Some(Ok(status)) => {
                let output = combined_output();
                let message = if output.trim().is_empty() {
                    format!("build command exited with status {status}")
                } else {
                    output
                };
                let summary = extract_error_summary(&message);
                BuildStatus::failure(
                    started_at,
                    duration_ms,
                    status.code(),
                    message,
                    summary,
                    ErrorType::Compilation,
                    Some(self.describe_builder()),
                )
            }
        }
    }

    async fn stop(&self) {
        self.stop_notify.notify_waiters();
        if let Some(child) = self.child.lock().await.as_mut() {
            let _ = child.start_kill();
        }
    }

    fn describe_builder(&self) -> String {
        format!("process:{}", self.target.name)
    }

    fn get_output_info(&self) -> Option<String> {
        self.target.output_path.clone()
    }
}

/// `BuilderFactory` (spec §4.C): constructs a `ProcessBuilder` for every
/// target kind. Per-ecosystem builders that inspect `target.type` are
/// explicitly out of scope; this factory treats `type` as a label only.
pub struct ProcessBuilderFactory {
    project_root: PathBuf,
    state_dir: PathBuf,
    project_basename: String,
}

impl ProcessBuilderFactory {
    pub fn new(project_root: PathBuf, state_dir: PathBuf, project_basename: String) -> Self {
        Self {
            project_root,
            state_dir,
            project_basename,
        }
    }
}

impl BuilderFactory for ProcessBuilderFactory {
    fn create(&self, target: &Target) -> Result<SharedBuilder, String> {
        let log_path = poltergeist_state::log_file_path(
            &self.state_dir,
            &self.project_root,
            &self.project_basename,
            &target.name,
            None,
        );
        Ok(Arc::new(ProcessBuilder::new(target.clone(), self.project_root.clone(), log_path)))
    }
}

#[cfg(test)]
#[path = "process_builder_tests.rs"]
mod tests;
