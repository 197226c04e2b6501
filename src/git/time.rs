use chrono::{DateTime, FixedOffset, TimeZone, Utc};

/// `--date=iso` output, e.g. `2024-01-02 10:00:00 +0100`
const ISO_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// git's default date format, e.g. `Tue Jan 2 10:00:00 2024 +0100`
const DEFAULT_FORMAT: &str = "%a %b %e %H:%M:%S %Y %z";

/// Milliseconds since 1970-01-01 00:00:00 UTC
pub fn to_timestamp<Tz: TimeZone>(time: &DateTime<Tz>) -> i64 {
    time.timestamp_millis()
}

/// Inverse of [`to_timestamp`]. Out-of-range values map to the epoch.
pub fn from_timestamp(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis).single().unwrap_or_default()
}

pub fn now_timestamp() -> i64 {
    to_timestamp(&Utc::now())
}

/// The Unix epoch, used as the time of records whose date did not parse
pub fn epoch() -> DateTime<FixedOffset> {
    DateTime::<Utc>::default().fixed_offset()
}

/// Parse a date the way git prints it: `--date=iso`, strict ISO 8601, or the
/// default human format. Returns `None` rather than failing.
pub fn parse_git_date(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    DateTime::parse_from_str(text, ISO_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(text))
        .or_else(|_| DateTime::parse_from_str(text, DEFAULT_FORMAT))
        .ok()
}

/// Format a time for `--before=` / `--after=` arguments
pub fn format_git_date<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format(ISO_FORMAT).to_string()
}
