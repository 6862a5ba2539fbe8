// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Whether a PID is still alive, for the staleness check in spec §3:
//! "a state is stale iff its PID is not alive OR now − lastHeartbeat >
//! stale-threshold".

use sysinfo::{Pid, System};

/// Whether `pid` names a running process, checked through `sysinfo`'s
/// process table rather than an unsafe `kill(pid, 0)` probe — the
/// workspace forbids `unsafe_code`.
pub fn pid_is_alive(pid: u32) -> bool {
    let mut system = System::new();
    system.refresh_processes(sysinfo::ProcessesToUpdate::Some(&[Pid::from_u32(pid)]), true);
    system.process(Pid::from_u32(pid)).is_some()
}

pub fn current_pid() -> u32 {
    std::process::id()
}

pub fn current_hostname() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_process_is_alive() {
        assert!(pid_is_alive(current_pid()));
    }

    #[test]
    fn hostname_is_nonempty() {
        assert!(!current_hostname().is_empty());
    }
}
