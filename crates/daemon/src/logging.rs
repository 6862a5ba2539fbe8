// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logging setup (`SPEC_FULL.md` §11): every I/O-performing or
//! scheduling-deciding crate logs through `tracing`. The daemon binary
//! installs an `EnvFilter` layer (`POLTERGEIST_LOG`, default `info`)
//! plus a non-blocking file writer rooted at the state directory —
//! the same combinator the teacher's own `ojd::main::setup_logging`
//! wires up.

use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the global tracing subscriber and returns the worker guard
/// that must be kept alive for the process lifetime so buffered log
/// lines are flushed before exit.
pub fn init(state_dir: &Path) -> std::io::Result<tracing_appender::non_blocking::WorkerGuard> {
    std::fs::create_dir_all(state_dir)?;

    let file_appender = tracing_appender::rolling::never(state_dir, "poltergeist.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = std::env::var("POLTERGEIST_LOG")
        .ok()
        .and_then(|v| EnvFilter::try_new(v).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .try_init();

    Ok(guard)
}
