//! Clock helpers.
//!
//! Bookmarks carry an RFC 3339 `savedAt` stamp and drafts default to a
//! millisecond Unix time id, matching what the host's JavaScript produces
//! with `new Date().toISOString()` and `Date.now()`.

use chrono::{SecondsFormat, Utc};

/// Returns the current Unix timestamp in milliseconds.
pub fn now_timestamp_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Returns the current UTC time as an RFC 3339 string with millisecond
/// precision and a `Z` suffix (e.g. `2026-10-19T08:15:02.417Z`).
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
