//! Wall-clock helpers. Every time the console reads or writes uses the
//! `HH:MM:SS` form: 24-hour, zero-padded, no zone, no fractions.

use chrono::{Local, NaiveTime, Timelike};

use crate::error::SetlistError;

const TIME_FORMAT: &str = "%H:%M:%S";
/// Shown wherever a time is not set.
pub const UNSET: &str = "N/A";

/// Parse a strict `HH:MM:SS` string.
///
/// chrono alone accepts `7:05:00` for `%H`, so the shape is checked first to
/// keep the wire format exact.
pub fn parse_time(text: &str) -> Result<NaiveTime, SetlistError> {
    let bytes = text.as_bytes();
    let shaped = bytes.len() == 8
        && bytes[2] == b':'
        && bytes[5] == b':'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 2 || i == 5 || b.is_ascii_digit());
    if !shaped {
        return Err(SetlistError::Format(text.to_string()));
    }
    NaiveTime::parse_from_str(text, TIME_FORMAT).map_err(|_| SetlistError::Format(text.to_string()))
}

/// Parse text from an edit field where blank or `N/A` means "not set".
pub fn parse_optional_time(text: &str) -> Result<Option<NaiveTime>, SetlistError> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(UNSET) {
        Ok(None)
    } else {
        parse_time(trimmed).map(Some)
    }
}

/// `HH:MM:SS`, dropping any fractional seconds.
pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Like `format_time`, with `N/A` for an unset time.
pub fn format_optional(time: Option<NaiveTime>) -> String {
    time.map(format_time).unwrap_or_else(|| UNSET.to_string())
}

/// Same-day difference in whole seconds. Negative when `end` is earlier than
/// `start`; there is no wrap past midnight.
pub fn seconds_between(start: NaiveTime, end: NaiveTime) -> i64 {
    i64::from(end.num_seconds_from_midnight()) - i64::from(start.num_seconds_from_midnight())
}

/// The current local time, truncated to whole seconds.
pub fn now() -> NaiveTime {
    let current = Local::now().time();
    current.with_nanosecond(0).unwrap_or(current)
}

/// `now()` as `HH:MM:SS`, the default track time.
pub fn now_text() -> String {
    format_time(now())
}
