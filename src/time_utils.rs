// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time parsing and formatting.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 with milliseconds and a `Z` suffix,
/// the same shape browsers produce from `Date.toISOString()`.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a client-supplied date: either a full RFC3339 timestamp or a bare
/// `YYYY-MM-DD` date, which is taken as midnight UTC.
pub fn parse_date_input(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `validator` hook for date fields.
pub fn validate_date_input(raw: &str) -> Result<(), validator::ValidationError> {
    match parse_date_input(raw) {
        Some(_) => Ok(()),
        None => {
            let mut err = validator::ValidationError::new("date");
            err.message = Some("must be an ISO 8601 date".into());
            Err(err)
        }
    }
}
