//! Date helpers for subscription records.
//!
//! Subscription dates reach us from more than one source (database rows,
//! JSON from an external endpoint) so parsing is lenient: anything that
//! cannot be understood yields `None` instead of an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Milliseconds in one calendar day.
pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Parses a date in any of the formats seen in subscription records.
///
/// Accepted, in order:
/// - RFC 3339 (`2024-03-01T10:00:00Z`, `2024-03-01T10:00:00.000+02:00`)
/// - naive date-time, treated as UTC (`2024-03-01T10:00:00`, `2024-03-01 10:00:00`)
/// - plain date, treated as midnight UTC (`2024-03-01`)
pub fn parse_flexible_date(raw: &str) -> Option<DateTime<Utc>> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Whole days from `now` until `target`, rounded up.
///
/// Equivalent to `ceil((target - now) / 1 day)` on millisecond precision.
/// A target a few hours away counts as one day; a target that passed a
/// few hours ago counts as zero; a target two and a half days ago is -2.
pub fn days_until(target: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let diff_ms = (target - now).num_milliseconds();
    -(-diff_ms).div_euclid(MILLIS_PER_DAY)
}
