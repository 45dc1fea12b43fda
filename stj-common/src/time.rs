//! Timestamp utilities

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a rate-limit reset header value
///
/// Services disagree on the format, so the following are accepted in order:
/// RFC 3339, RFC 2822 / HTTP-date, an ISO timestamp without offset (taken
/// as UTC), and integer Unix epoch seconds.
pub fn parse_reset_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }

    if let Ok(ts) = DateTime::parse_from_rfc2822(value) {
        return Some(ts.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }

    value
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}
