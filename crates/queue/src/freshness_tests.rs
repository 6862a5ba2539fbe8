// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use poltergeist_core::{Clock, ErrorType, SystemClock, Target, TargetType};
use poltergeist_state::{StateStore, StateStoreConfig};
use std::process::Command;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tempfile::TempDir;

fn init_git_repo(dir: &std::path::Path) {
    let run = |args: &[&str]| {
        Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .expect("git invocation");
    };
    run(&["init", "-q"]);
    run(&["config", "user.email", "test@example.com"]);
    run(&["config", "user.name", "test"]);
    std::fs::write(dir.join("README.md"), "hello").unwrap();
    run(&["add", "."]);
    run(&["commit", "-q", "-m", "initial"]);
}

fn current_head(dir: &std::path::Path) -> String {
    let output = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(dir)
        .output()
        .unwrap();
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

fn target(name: &str) -> Target {
    Target {
        name: name.to_string(),
        target_type: TargetType::Executable,
        enabled: true,
        watch_paths: vec!["src/**".to_string()],
        settling_delay_ms: 1000,
        auto_run: None,
        environment: Default::default(),
        output_path: Some("dist/bin".to_string()),
    }
}

fn store_for(dir: &std::path::Path) -> std::sync::Arc<StateStore> {
    let config = StateStoreConfig::new(dir.to_path_buf(), "proj", "poltergeist.config.json");
    StateStore::new(config)
}

#[tokio::test]
async fn missing_binary_is_never_fresh() {
    let project = TempDir::new().unwrap();
    init_git_repo(project.path());
    let store = store_for(project.path());
    let t = target("app");
    store.initialize_state(&t).unwrap();

    let fresh = is_binary_fresh(
        project.path(),
        "app",
        &project.path().join("dist/bin"),
        &store,
    )
    .await;
    assert!(!fresh);
}

#[tokio::test]
async fn missing_state_is_never_fresh() {
    let project = TempDir::new().unwrap();
    init_git_repo(project.path());
    let store = store_for(project.path());
    let binary = project.path().join("dist/bin");
    std::fs::create_dir_all(binary.parent().unwrap()).unwrap();
    std::fs::write(&binary, b"binary").unwrap();

    let fresh = is_binary_fresh(project.path(), "app", &binary, &store).await;
    assert!(!fresh);
}

#[tokio::test]
async fn fresh_clean_tree_matching_hash_is_fresh() {
    let project = TempDir::new().unwrap();
    init_git_repo(project.path());
    let store = store_for(project.path());
    let t = target("app");
    store.initialize_state(&t).unwrap();

    let binary = project.path().join("dist/bin");
    std::fs::create_dir_all(binary.parent().unwrap()).unwrap();
    std::fs::write(&binary, b"binary").unwrap();

    let head = current_head(project.path());
    let build_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .saturating_sub(Duration::from_secs(60))
        .as_millis() as u64;
    let status = poltergeist_core::BuildStatus::success(
        poltergeist_state::timefmt::to_rfc3339(build_ms),
        1200,
        Some(0),
        Some(head),
        Some("fake".to_string()),
    );
    store.update_build_status("app", status).unwrap();

    let fresh = is_binary_fresh(project.path(), "app", &binary, &store).await;
    assert!(fresh);
}

#[tokio::test]
async fn dirty_working_tree_is_never_fresh() {
    let project = TempDir::new().unwrap();
    init_git_repo(project.path());
    let store = store_for(project.path());
    let t = target("app");
    store.initialize_state(&t).unwrap();

    let binary = project.path().join("dist/bin");
    std::fs::create_dir_all(binary.parent().unwrap()).unwrap();
    std::fs::write(&binary, b"binary").unwrap();

    // Dirty the tree after the binary is written.
    std::fs::write(project.path().join("dirty.txt"), b"uncommitted").unwrap();

    let head = current_head(project.path());
    let build_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .saturating_sub(Duration::from_secs(60))
        .as_millis() as u64;
    let status = poltergeist_core::BuildStatus::success(
        poltergeist_state::timefmt::to_rfc3339(build_ms),
        1200,
        Some(0),
        Some(head),
        None,
    );
    store.update_build_status("app", status).unwrap();

    let fresh = is_binary_fresh(project.path(), "app", &binary, &store).await;
    assert!(!fresh);
}

#[tokio::test]
async fn mismatched_git_hash_is_never_fresh() {
    let project = TempDir::new().unwrap();
    init_git_repo(project.path());
    let store = store_for(project.path());
    let t = target("app");
    store.initialize_state(&t).unwrap();

    let binary = project.path().join("dist/bin");
    std::fs::create_dir_all(binary.parent().unwrap()).unwrap();
    std::fs::write(&binary, b"binary").unwrap();

    let build_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .saturating_sub(Duration::from_secs(60))
        .as_millis() as u64;
    let status = poltergeist_core::BuildStatus::success(
        poltergeist_state::timefmt::to_rfc3339(build_ms),
        1200,
        Some(0),
        Some("0000000000000000000000000000000000000000".to_string()),
        None,
    );
    store.update_build_status("app", status).unwrap();

    let fresh = is_binary_fresh(project.path(), "app", &binary, &store).await;
    assert!(!fresh);
}

#[tokio::test]
async fn binary_older_than_recorded_build_is_never_fresh() {
    let project = TempDir::new().unwrap();
    init_git_repo(project.path());
    let store = store_for(project.path());
    let t = target("app");
    store.initialize_state(&t).unwrap();

    let binary = project.path().join("dist/bin");
    std::fs::create_dir_all(binary.parent().unwrap()).unwrap();
    std::fs::write(&binary, b"binary").unwrap();

    let head = current_head(project.path());
    // Record a build timestamp in the future relative to the binary's mtime.
    let build_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
        + Duration::from_secs(600).as_millis() as u64;
    let status = poltergeist_core::BuildStatus::success(
        poltergeist_state::timefmt::to_rfc3339(build_ms),
        1200,
        Some(0),
        Some(head),
        None,
    );
    store.update_build_status("app", status).unwrap();

    let fresh = is_binary_fresh(project.path(), "app", &binary, &store).await;
    assert!(!fresh);
}

#[tokio::test]
async fn failed_last_build_is_never_fresh() {
    let project = TempDir::new().unwrap();
    init_git_repo(project.path());
    let store = store_for(project.path());
    let t = target("app");
    store.initialize_state(&t).unwrap();

    let binary = project.path().join("dist/bin");
    std::fs::create_dir_all(binary.parent().unwrap()).unwrap();
    std::fs::write(&binary, b"binary").unwrap();

    let now = SystemClock.epoch_ms();
    let status = poltergeist_core::BuildStatus::failure(
        poltergeist_state::timefmt::to_rfc3339(now),
        100,
        Some(1),
        "failed",
        "failed",
        ErrorType::Compilation,
        None,
    );
    store.update_build_status("app", status).unwrap();

    let fresh = is_binary_fresh(project.path(), "app", &binary, &store).await;
    assert!(!fresh);
}
