//! RFC3339 / XML Schema `dateTime` handling for credential temporal fields.

use chrono::{DateTime, SecondsFormat, Utc};

/// Parse an RFC3339 date-time (time zone designator required) into UTC.
pub fn parse_date(date_time: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(date_time).map(|date_time| date_time.with_timezone(&Utc))
}

pub fn is_valid_date(date_time: &str) -> bool {
    // chrono also accepts a space separator, which dateTime does not.
    !date_time.contains(' ') && parse_date(date_time).is_ok()
}

/// Format a date-time the way issuance stamps `issuanceDate`: whole seconds, `Z` suffix.
pub fn date_to_seconds_string(date_time: &DateTime<Utc>) -> String {
    date_time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// ISO-8601 form with millisecond precision, used in diagnostics.
pub fn date_to_iso_string(date_time: &DateTime<Utc>) -> String {
    date_time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Millisecond timestamp; temporal comparisons happen at this resolution.
pub fn timestamp_ms(date_time: &DateTime<Utc>) -> i64 {
    date_time.timestamp_millis()
}
