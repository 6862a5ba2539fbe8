// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use poltergeist_core::{BuildState, FakeClock, TargetType};
use std::time::Duration;
use tempfile::tempdir;

fn target(name: &str) -> Target {
    Target {
        name: name.to_string(),
        target_type: TargetType::Executable,
        enabled: true,
        watch_paths: vec!["src/**/*.rs".to_string()],
        settling_delay_ms: 1000,
        auto_run: None,
        environment: Default::default(),
        output_path: None,
    }
}

fn store(state_dir: std::path::PathBuf, clock: Arc<FakeClock>) -> Arc<StateStore<FakeClock, FsStateWriter>> {
    let mut config = StateStoreConfig::new(std::path::PathBuf::from("/home/user/app"), "app", "/home/user/app/poltergeist.json");
    config.state_dir = state_dir;
    StateStore::with_clock_and_writer(config, clock, FsStateWriter)
}

#[test]
fn initialize_then_read_round_trips() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(FakeClock::new(1_000_000));
    let store = store(dir.path().to_path_buf(), clock);
    let t = target("web");
    let initial = store.initialize_state(&t).unwrap();
    assert_eq!(initial.target, "web");
    assert!(initial.process.is_active);

    let read_back = store.read_state("web").unwrap().unwrap();
    assert_eq!(read_back, initial);
}

#[test]
fn read_state_missing_is_none() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(FakeClock::new(0));
    let store = store(dir.path().to_path_buf(), clock);
    assert!(store.read_state("nope").unwrap().is_none());
}

#[test]
fn read_state_lenient_swallows_corruption() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(FakeClock::new(0));
    let store = store(dir.path().to_path_buf(), clock.clone());
    let t = target("web");
    store.initialize_state(&t).unwrap();
    let path = store.path_for("web");
    std::fs::write(&path, b"not json").unwrap();

    assert!(store.read_state("web").is_err());
    assert!(store.read_state_lenient("web").is_none());
}

#[test]
fn update_build_status_persists() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(FakeClock::new(0));
    let store = store(dir.path().to_path_buf(), clock);
    let t = target("web");
    store.initialize_state(&t).unwrap();

    let status = BuildStatus::success("2026-01-01T00:00:00Z", 1200, Some(0), None, Some("cmake".into()));
    store.update_build_status("web", status.clone()).unwrap();

    let state = store.read_state("web").unwrap().unwrap();
    assert_eq!(state.last_build.unwrap().status, BuildState::Success);
}

#[test]
fn update_app_info_merges_rather_than_replaces() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(FakeClock::new(0));
    let store = store(dir.path().to_path_buf(), clock);
    let t = target("web");
    store.initialize_state(&t).unwrap();

    store
        .update_app_info(
            "web",
            AppInfo {
                output_path: Some("/out/web".into()),
                icon_path: None,
                bundle_id: None,
            },
        )
        .unwrap();
    store
        .update_app_info(
            "web",
            AppInfo {
                output_path: None,
                icon_path: Some("/out/icon.png".into()),
                bundle_id: None,
            },
        )
        .unwrap();

    let info = store.read_state("web").unwrap().unwrap().app_info.unwrap();
    assert_eq!(info.output_path.as_deref(), Some("/out/web"));
    assert_eq!(info.icon_path.as_deref(), Some("/out/icon.png"));
}

#[test]
fn is_locked_false_for_own_process() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(FakeClock::new(0));
    let store = store(dir.path().to_path_buf(), clock);
    let t = target("web");
    store.initialize_state(&t).unwrap();
    assert!(!store.is_locked("web"));
}

#[test]
fn is_locked_false_when_no_state() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(FakeClock::new(0));
    let store = store(dir.path().to_path_buf(), clock);
    assert!(!store.is_locked("ghost"));
}

#[test]
fn is_locked_false_when_heartbeat_stale() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(FakeClock::new(0));
    let store = store(dir.path().to_path_buf(), clock.clone());
    let t = target("web");
    let mut state = store.initialize_state(&t).unwrap();

    // simulate a foreign owner so is_locked doesn't short-circuit on self-ownership
    state.process.pid = current_pid().wrapping_add(999_999);
    state.process.hostname = "some-other-host".to_string();
    store.write_state("web", &state).unwrap();

    clock.advance(Duration::from_secs(10 * 60));
    assert!(!store.is_locked("web"));
}

#[test]
fn force_unlock_clears_a_stuck_lock() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(FakeClock::new(0));
    let store = store(dir.path().to_path_buf(), clock);
    let t = target("web");
    let mut state = store.initialize_state(&t).unwrap();
    state.process.pid = current_pid().wrapping_add(999_999);
    state.process.hostname = "some-other-host".to_string();
    store.write_state("web", &state).unwrap();

    store.force_unlock("web").unwrap();
    let after = store.read_state("web").unwrap().unwrap();
    assert_eq!(after.process.pid, 0);
    assert!(!after.process.is_active);
}

#[test]
fn remove_state_deletes_the_file() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(FakeClock::new(0));
    let store = store(dir.path().to_path_buf(), clock);
    let t = target("web");
    store.initialize_state(&t).unwrap();
    store.remove_state("web").unwrap();
    assert!(store.read_state("web").unwrap().is_none());
}

#[test]
fn discover_states_finds_all_targets_for_project() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(FakeClock::new(0));
    let store = store(dir.path().to_path_buf(), clock);
    store.initialize_state(&target("web")).unwrap();
    store.initialize_state(&target("cli")).unwrap();

    let found = store.discover_states(&store.config.project_path.clone());
    assert_eq!(found.len(), 2);
    assert!(found.contains_key("web"));
    assert!(found.contains_key("cli"));
}

#[test]
fn cleanup_removes_only_stale_states() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(FakeClock::new(0));
    let store = store(dir.path().to_path_buf(), clock.clone());
    store.initialize_state(&target("fresh")).unwrap();

    let mut stale = store.initialize_state(&target("stale")).unwrap();
    stale.process.pid = current_pid().wrapping_add(999_999);
    store.write_state("stale", &stale).unwrap();
    clock.advance(Duration::from_secs(10 * 60));

    store.cleanup();
    assert!(store.read_state("fresh").unwrap().is_some());
    assert!(store.read_state("stale").unwrap().is_none());
}

#[tokio::test]
async fn heartbeat_updates_last_heartbeat_for_owned_targets() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(FakeClock::new(0));
    let store = store(dir.path().to_path_buf(), clock.clone());
    let initial = store.initialize_state(&target("web")).unwrap();

    clock.advance(Duration::from_secs(30));
    store.tick_heartbeat();

    let after = store.read_state("web").unwrap().unwrap();
    assert_ne!(after.process.last_heartbeat, initial.process.last_heartbeat);
}

#[tokio::test]
async fn stop_heartbeat_flushes_inactive_marker() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(FakeClock::new(0));
    let store = store(dir.path().to_path_buf(), clock);
    store.initialize_state(&target("web")).unwrap();

    store.stop_heartbeat();

    let after = store.read_state("web").unwrap().unwrap();
    assert!(!after.process.is_active);
}
