// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn round_trips_through_rfc3339() {
    let ms = 1_732_000_000_123;
    let s = to_rfc3339(ms);
    assert_eq!(parse_rfc3339_ms(&s), Some(ms));
}

#[test]
fn malformed_input_returns_none() {
    assert_eq!(parse_rfc3339_ms("not a timestamp"), None);
}

#[test]
fn epoch_zero_round_trips() {
    let s = to_rfc3339(0);
    assert_eq!(parse_rfc3339_ms(&s), Some(0));
}
