// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and backend timestamps.

use chrono::{DateTime, SecondsFormat, Utc};

/// Backend timestamp: nanoseconds since the Unix epoch.
pub type Time = i64;

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Convert a backend timestamp to a UTC datetime.
pub fn from_backend_time(time: Time) -> DateTime<Utc> {
    DateTime::from_timestamp_nanos(time)
}

/// Convert a UTC datetime to a backend timestamp (saturating outside ~1677..2262).
pub fn to_backend_time(date: DateTime<Utc>) -> Time {
    date.timestamp_nanos_opt().unwrap_or(if date.timestamp() < 0 {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Backend timestamp for midnight (UTC) of the day containing `date`.
pub fn start_of_day(date: DateTime<Utc>) -> Time {
    let midnight = date
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or(date);
    to_backend_time(midnight)
}
