// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn base_target() -> Target {
    Target {
        name: "app".to_string(),
        target_type: TargetType::Executable,
        enabled: true,
        watch_paths: vec!["src/**/*.rs".to_string()],
        settling_delay_ms: 1000,
        auto_run: None,
        environment: HashMap::new(),
        output_path: Some("./dist/app".to_string()),
    }
}

#[test]
fn empty_name_is_invalid() {
    let mut t = base_target();
    t.name = "   ".to_string();
    assert!(!t.is_name_valid());
}

#[test]
fn non_empty_name_is_valid() {
    assert!(base_target().is_name_valid());
}

#[test]
fn only_executable_with_autorun_enabled_wants_autorun() {
    let mut t = base_target();
    assert!(!t.wants_auto_run());

    t.auto_run = Some(AutoRunConfig {
        enabled: true,
        ..Default::default()
    });
    assert!(t.wants_auto_run());

    t.target_type = TargetType::Npm;
    assert!(!t.wants_auto_run());
}

#[test]
fn defaults_match_spec() {
    let ar = AutoRunConfig::default();
    assert_eq!(ar.restart_signal, "SIGINT");
    assert_eq!(ar.restart_delay_ms, 250);
}

#[test]
fn deserializes_minimal_json() {
    let json = serde_json::json!({
        "name": "app",
        "type": "executable",
        "watchPaths": ["src/**/*.rs"],
    });
    let target: Target = serde_json::from_value(json).expect("valid target json");
    assert_eq!(target.name, "app");
    assert!(target.enabled);
    assert_eq!(target.settling_delay_ms, 1000);
}

#[test]
fn display_matches_wire_tag() {
    assert_eq!(TargetType::AppBundle.to_string(), "app-bundle");
    assert_eq!(TargetType::CmakeExecutable.to_string(), "cmake-executable");
}
