// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn building_has_zero_duration_and_no_exit_code() {
    let s = BuildStatus::building("2026-07-28T00:00:00Z", Some("cmake".into()));
    assert_eq!(s.duration_ms, 0);
    assert!(s.exit_code.is_none());
    assert!(s.upholds_invariants());
}

#[test]
fn success_never_carries_an_error() {
    let s = BuildStatus::success("2026-07-28T00:00:00Z", 1200, Some(0), None, None);
    assert!(s.error.is_none());
    assert!(s.upholds_invariants());
}

#[test]
fn failure_carries_message_and_taxonomy() {
    let s = BuildStatus::failure(
        "2026-07-28T00:00:00Z",
        500,
        Some(1),
        "error: build timed out",
        "build timed out",
        ErrorType::Runtime,
        Some("executable".into()),
    );
    assert_eq!(s.error_type, Some(ErrorType::Runtime));
    assert_eq!(s.error_summary.as_deref(), Some("build timed out"));
    assert!(s.upholds_invariants());
}

#[test]
fn is_success_only_true_for_success_state() {
    assert!(BuildStatus::success("t", 1, None, None, None).is_success());
    assert!(!BuildStatus::building("t", None).is_success());
}

#[test]
fn round_trips_through_json() {
    let s = BuildStatus::success("2026-07-28T00:00:00Z", 42, Some(0), Some("abc123".into()), None);
    let json = serde_json::to_string(&s).expect("serialize");
    let back: BuildStatus = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(s, back);
}
