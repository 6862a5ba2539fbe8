// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Glob pattern normalization (spec §4.B): deterministic rewrites so a
//! user's loosely-written `watchPaths` entry becomes one `glob` can
//! match recursively, plus the reject list for patterns that would
//! watch the whole tree by accident.

use crate::error::WatchError;

/// Directories whose contents should never be watched even if a target
/// asks for them explicitly (spec §4.B).
const REJECTED_PREFIXES: &[&str] = &[".git/", "node_modules/"];

/// Normalize a single `watchPaths` entry per spec §4.B's rewrite rules.
///
/// - `X/` -> `X/**`
/// - leading `./` stripped
/// - bare `*.ext` -> `**/*.ext`
/// - `dir/*.ext` -> `dir/**/*.ext`
/// - `**/…` and specific files are left unchanged
pub fn normalize(pattern: &str) -> Result<String, WatchError> {
    let mut p = pattern.trim();
    if let Some(stripped) = p.strip_prefix("./") {
        p = stripped;
    }

    if is_rejected(p) {
        return Err(WatchError::RejectedPattern(pattern.to_string()));
    }

    let normalized = if p.contains("**") {
        p.to_string()
    } else if let Some(dir) = p.strip_suffix('/') {
        format!("{dir}/**")
    } else if let Some(ext) = p.strip_prefix('*') {
        format!("**/*{ext}")
    } else if let Some((dir, file)) = p.rsplit_once('/') {
        if let Some(ext) = file.strip_prefix('*') {
            format!("{dir}/**/*{ext}")
        } else {
            p.to_string()
        }
    } else {
        p.to_string()
    };

    glob::Pattern::new(&normalized).map_err(|e| WatchError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    Ok(normalized)
}

fn is_rejected(pattern: &str) -> bool {
    REJECTED_PREFIXES.iter().any(|prefix| pattern.starts_with(prefix))
}

/// Expand one level of shell-style brace alternation — `src/{a,b}/**` ->
/// `["src/a/**", "src/b/**"]` — ahead of `normalize` (spec §4.C: "expand
/// glob patterns (brace expansion first, then normalization)"). Patterns
/// without braces expand to a single-element vector unchanged. Nested
/// braces are not supported; only the first `{...}` group is expanded.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };
    let Some(close) = pattern[open..].find('}').map(|i| i + open) else {
        return vec![pattern.to_string()];
    };
    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];
    pattern[open + 1..close]
        .split(',')
        .map(|alt| format!("{prefix}{alt}{suffix}"))
        .collect()
}

#[cfg(test)]
#[path = "pattern_tests.rs"]
mod tests;
