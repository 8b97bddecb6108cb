// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! RFC 3339 timestamp parsing and canonical formatting.
//!
//! Invariant 5 (§3): timestamps are always RFC 3339 with an explicit UTC
//! offset. A naive or offset-less timestamp is rejected rather than assumed
//! to mean UTC.

use crate::error::CoreError;
use chrono::{DateTime, SecondsFormat, Utc};

/// Parse an RFC 3339 string, requiring an explicit offset.
///
/// `chrono::DateTime::parse_from_rfc3339` already rejects naive strings (it
/// has no "assume UTC" fallback), so this is mostly a friendlier error
/// message plus normalization to UTC.
pub fn parse_rfc3339(s: &str) -> Result<DateTime<Utc>, CoreError> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CoreError::contract_violation("INVALID_TIMESTAMP", format!("not a valid RFC 3339 UTC timestamp: {s} ({e})")))
}

/// Canonical RFC 3339 rendering: UTC, `Z` suffix, millisecond precision.
pub fn format_rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
