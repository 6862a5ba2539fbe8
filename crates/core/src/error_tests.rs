// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    plain_error = {"error: cannot find module 'foo'", "error: cannot find module 'foo'"},
    ts_diagnostic = {"src/main.ts(12,5): error TS2304: Cannot find name 'x'.", "error TS2304: Cannot find name 'x'."},
    capitalized = {"Error: build failed", "Error: build failed"},
    no_marker_falls_back_to_first_line = {"thread panicked at src/lib.rs:10", "thread panicked at src/lib.rs:10"},
)]
fn extracts_expected_summary(input: &str, expected: &str) {
    assert_eq!(extract_error_summary(input), expected);
}

#[test]
fn truncates_long_summaries_to_100_chars() {
    let long = format!("error: {}", "x".repeat(200));
    let summary = extract_error_summary(&long);
    assert!(summary.chars().count() <= 100);
    assert!(summary.ends_with('\u{2026}'));
}

#[test]
fn only_considers_the_first_line() {
    let multi = "error: first problem\nerror: second problem";
    assert_eq!(extract_error_summary(multi), "error: first problem");
}

#[test]
fn error_type_mapping_matches_taxonomy() {
    use crate::build_status::ErrorType;

    assert_eq!(
        PoltergeistError::configuration("t", "bad").error_type(),
        ErrorType::Configuration
    );
    assert_eq!(
        PoltergeistError::validation("t", "bad").error_type(),
        ErrorType::Configuration
    );
    assert_eq!(
        PoltergeistError::compilation("t", "bad").error_type(),
        ErrorType::Compilation
    );
    assert_eq!(
        PoltergeistError::runtime("t", "bad").error_type(),
        ErrorType::Runtime
    );
}
