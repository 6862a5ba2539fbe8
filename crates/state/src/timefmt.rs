// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! RFC 3339 timestamps for `PersistedState.process.{startTime,lastHeartbeat}`
//! (spec §3). `poltergeist-core::time_fmt` formats elapsed *durations*; this
//! formats absolute points in time, so it lives alongside the store that
//! actually writes them.

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Render milliseconds since the Unix epoch as an RFC 3339 string.
pub fn to_rfc3339(epoch_ms: u64) -> String {
    let nanos = i128::from(epoch_ms) * 1_000_000;
    match OffsetDateTime::from_unix_timestamp_nanos(nanos) {
        Ok(dt) => dt.format(&Rfc3339).unwrap_or_else(|_| epoch_ms.to_string()),
        Err(_) => epoch_ms.to_string(),
    }
}

/// Parse an RFC 3339 string back into milliseconds since the Unix epoch.
/// Returns `None` on malformed input rather than failing the caller — a
/// corrupt timestamp should make a state look stale, not crash the store.
pub fn parse_rfc3339_ms(s: &str) -> Option<u64> {
    let dt = OffsetDateTime::parse(s, &Rfc3339).ok()?;
    u64::try_from(dt.unix_timestamp_nanos() / 1_000_000).ok()
}

#[cfg(test)]
#[path = "timefmt_tests.rs"]
mod tests;
