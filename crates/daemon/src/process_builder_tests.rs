// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use poltergeist_core::BuildState;
use std::collections::BTreeSet;
use tempfile::TempDir;

fn target_with_command(command: Option<&str>) -> Target {
    Target {
        name: "app".to_string(),
        target_type: poltergeist_core::TargetType::Executable,
        enabled: true,
        watch_paths: vec![],
        settling_delay_ms: 1000,
        auto_run: None,
        environment: command
            .map(|c| [(BUILD_COMMAND_KEY.to_string(), c.to_string())].into_iter().collect())
            .unwrap_or_default(),
        output_path: None,
    }
}

#[tokio::test]
async fn validate_fails_without_build_command() {
    let dir = TempDir::new().unwrap();
    let builder = ProcessBuilder::new(target_with_command(None), dir.path().to_path_buf(), dir.path().join("app.log"));
    assert!(builder.validate().await.is_err());
}

#[tokio::test]
async fn validate_succeeds_with_build_command() {
    let dir = TempDir::new().unwrap();
    let builder = ProcessBuilder::new(
        target_with_command(Some("true")),
        dir.path().to_path_buf(),
        dir.path().join("app.log"),
    );
    assert!(builder.validate().await.is_ok());
}

#[tokio::test]
async fn successful_build_reports_success_and_persists_log() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("app.log");
    let builder = ProcessBuilder::new(
        target_with_command(Some("echo building")),
        dir.path().to_path_buf(),
        log_path.clone(),
    );

    let status = builder.build(&BTreeSet::new()).await;
    assert_eq!(status.status, BuildState::Success);
    assert!(status.error.is_none());

    let logged = std::fs::read_to_string(&log_path).unwrap();
    assert!(logged.contains("building"));
}

#[tokio::test]
async fn failed_build_extracts_error_summary_from_output() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("app.log");
    let builder = ProcessBuilder::new(
        target_with_command(Some("echo 'error: something broke' 1>&2; exit 1")),
        dir.path().to_path_buf(),
        log_path,
    );

    let status = builder.build(&BTreeSet::new()).await;
    assert_eq!(status.status, BuildState::Failure);
    assert_eq!(status.exit_code, Some(1));
    assert_eq!(status.error_summary.as_deref(), Some("error: something broke"));
    assert!(status.error.as_deref().unwrap().contains("something broke"));
}

#[tokio::test]
async fn failed_build_with_no_output_falls_back_to_status_message() {
    let dir = TempDir::new().unwrap();
    let builder = ProcessBuilder::new(
        target_with_command(Some("exit 7")),
        dir.path().to_path_buf(),
        dir.path().join("app.log"),
    );

    let status = builder.build(&BTreeSet::new()).await;
    assert_eq!(status.status, BuildState::Failure);
    assert_eq!(status.exit_code, Some(7));
    assert!(status.error_summary.as_deref().unwrap().contains("exited with status"));
}

#[tokio::test]
async fn stop_causes_pending_build_to_resolve_as_failure() {
    let dir = TempDir::new().unwrap();
    let builder = Arc::new(ProcessBuilder::new(
        target_with_command(Some("sleep 30")),
        dir.path().to_path_buf(),
        dir.path().join("app.log"),
    ));

    let build_handle = {
        let builder = builder.clone();
        tokio::spawn(async move { builder.build(&BTreeSet::new()).await })
    };

    // Give the child a moment to actually spawn before stopping it.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    builder.stop().await;

    let status = tokio::time::timeout(std::time::Duration::from_secs(5), build_handle)
        .await
        .expect("build should resolve promptly after stop")
        .unwrap();
    assert_eq!(status.status, BuildState::Failure);
}

#[test]
fn get_output_info_reflects_target_output_path() {
    let dir = TempDir::new().unwrap();
    let mut target = target_with_command(Some("true"));
    target.output_path = Some("dist/app".to_string());
    let builder = ProcessBuilder::new(target, dir.path().to_path_buf(), dir.path().join("app.log"));
    assert_eq!(builder.get_output_info(), Some("dist/app".to_string()));
}

#[test]
fn describe_builder_includes_target_name() {
    let dir = TempDir::new().unwrap();
    let builder = ProcessBuilder::new(
        target_with_command(Some("true")),
        dir.path().to_path_buf(),
        dir.path().join("app.log"),
    );
    assert_eq!(builder.describe_builder(), "process:app");
}
