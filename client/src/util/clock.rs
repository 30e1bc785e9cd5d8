//! Wall-clock helpers.
//!
//! Freshness windows use tokio's monotonic clock; these are only for values
//! that leave the process (token expiry on disk, `last_updated` stamps).

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Current unix time in seconds.
#[must_use]
pub fn now_unix() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// Current UTC time as RFC 3339, e.g. `2026-10-18T09:30:00.123Z`.
#[must_use]
pub fn now_rfc3339() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&Rfc3339).unwrap_or_else(|_| now.unix_timestamp().to_string())
}

#[cfg(test)]
#[path = "clock_test.rs"]
mod tests;
