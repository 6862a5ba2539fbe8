// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor-owned configuration: where the project-local config file
//! lives, and the tunables spec §9 says must be injected rather than
//! reached for as process-wide statics.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default on-disk config file name, matched against the upstream
/// project's own convention (spec §6 names the schema, not the
/// filename).
pub const DEFAULT_CONFIG_FILE: &str = ".poltergeist.json";

/// How often the supervisor's run loop re-checks the config file for
/// changes (spec §4.I: "on each observed change of the configuration
/// file"). The core has no file-watcher of its own for the config file
/// — polling its mtime is simpler than adding a second watch subsystem
/// for one file.
pub const DEFAULT_CONFIG_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Grace period in-flight builds get on shutdown before `builder.stop()`
/// is forced (spec §5, §15 step 7).
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Resolve the config file path for a project root: `<root>/.poltergeist.json`
/// unless an explicit override is given.
pub fn resolve_config_path(project_root: &Path, explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| project_root.join(DEFAULT_CONFIG_FILE))
}
