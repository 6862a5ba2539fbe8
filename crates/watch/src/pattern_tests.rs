// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    trailing_slash = { "src/", "src/**" },
    dotted_prefix = { "./src/**/*.rs", "src/**/*.rs" },
    bare_extension = { "*.ts", "**/*.ts" },
    dir_with_extension = { "build/*.o", "build/**/*.o" },
    already_recursive = { "**/*.rs", "**/*.rs" },
    specific_file = { "Cargo.toml", "Cargo.toml" },
    nested_specific_file = { "src/main.rs", "src/main.rs" },
)]
fn normalizes_as_expected(input: &str, expected: &str) {
    assert_eq!(normalize(input).unwrap(), expected);
}

#[parameterized(
    git_dir = { ".git/**" },
    node_modules = { "node_modules/**" },
    dotted_git_dir = { "./.git/**" },
)]
fn rejects_excluded_patterns(input: &str) {
    assert!(matches!(normalize(input), Err(WatchError::RejectedPattern(_))));
}

#[test]
fn rejects_malformed_glob() {
    assert!(matches!(
        normalize("src/[unterminated"),
        Err(WatchError::InvalidPattern { .. })
    ));
}

#[test]
fn expand_braces_splits_alternatives() {
    assert_eq!(
        expand_braces("src/{a,b}/**"),
        vec!["src/a/**".to_string(), "src/b/**".to_string()]
    );
}

#[test]
fn expand_braces_is_noop_without_braces() {
    assert_eq!(expand_braces("src/**/*.rs"), vec!["src/**/*.rs".to_string()]);
}

#[test]
fn expand_then_normalize_pipeline() {
    let expanded = expand_braces("{src,lib}/*.ts");
    let normalized: Vec<String> = expanded.iter().map(|p| normalize(p).unwrap()).collect();
    assert_eq!(normalized, vec!["src/**/*.ts".to_string(), "lib/**/*.ts".to_string()]);
}
