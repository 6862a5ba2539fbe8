// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `poltergeist daemon`: runs the supervisor in the foreground against
//! the resolved project root (`SPEC_FULL.md` §16 — clean shutdown exits
//! 0, a startup failure is the "Fatal" case of spec §7).

use anyhow::Result;
use poltergeist_core::SystemClock;
use poltergeist_daemon::{ProcessBuilderFactory, Supervisor};
use poltergeist_state::{default_state_dir, FsStateWriter};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

pub async fn run(project_root: PathBuf) -> Result<ExitCode> {
    let state_dir = default_state_dir();
    let _log_guard = poltergeist_daemon::logging::init(&state_dir)?;

    let project_basename = project_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());
    let factory = Arc::new(ProcessBuilderFactory::new(project_root.clone(), state_dir.clone(), project_basename));

    let supervisor = Supervisor::start(
        project_root,
        None,
        state_dir,
        Arc::new(SystemClock),
        FsStateWriter,
        factory,
    )
    .await?;

    tracing::info!("poltergeist daemon started");
    supervisor.run().await?;
    Ok(ExitCode::SUCCESS)
}
