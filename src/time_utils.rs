// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time parsing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Current time as a Unix timestamp (seconds).
pub fn now_unix() -> i64 {
    Utc::now().timestamp()
}

/// Parse an ISO 8601 date or timestamp.
///
/// Accepts RFC 3339 (`2024-01-01T10:00:00Z`, any offset), a naive timestamp
/// (treated as UTC), or a bare date (`2024-01-01`, UTC midnight).
pub fn parse_iso_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
