//! Date, time and datetime layouts
//!
//! One canonical layout per tag is used for caller input, for storage and
//! for display. Reads additionally accept the legacy layout written by older
//! tooling, `2023-10-05 00:00:00 +0000 UTC`, keeping the wall-clock value in
//! whatever offset it was written with.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

pub const DATE_LAYOUT: &str = "%Y-%m-%d";
pub const TIME_LAYOUT: &str = "%H:%M:%S";
pub const DATETIME_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

const LEGACY_LAYOUT: &str = "%Y-%m-%d %H:%M:%S%.f %z";

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_LAYOUT).ok()
}

pub fn parse_time(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text, TIME_LAYOUT).ok()
}

pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, DATETIME_LAYOUT).ok()
}

pub fn format_date(value: &NaiveDate) -> String {
    value.format(DATE_LAYOUT).to_string()
}

pub fn format_time(value: &NaiveTime) -> String {
    value.format(TIME_LAYOUT).to_string()
}

pub fn format_datetime(value: &NaiveDateTime) -> String {
    value.format(DATETIME_LAYOUT).to_string()
}

/// Parse `YYYY-MM-DD HH:MM:SS[.f] +hhmm ZONE`
///
/// The zone name is ignored. The result is the wall-clock reading in the
/// written offset, not converted to UTC.
fn parse_legacy(text: &str) -> Option<NaiveDateTime> {
    let (head, zone) = text.rsplit_once(' ')?;
    if zone.is_empty() || zone.starts_with(['+', '-']) {
        return None;
    }
    DateTime::parse_from_str(head, LEGACY_LAYOUT)
        .ok()
        .map(|dt| dt.naive_local())
}

pub fn read_date(text: &str) -> Option<NaiveDate> {
    parse_date(text).or_else(|| parse_legacy(text).map(|dt| dt.date()))
}

/// Legacy time-only rows carry a placeholder date (year 0); only the time
/// of day is kept.
pub fn read_time(text: &str) -> Option<NaiveTime> {
    parse_time(text).or_else(|| parse_legacy(text).map(|dt| dt.time()))
}

pub fn read_datetime(text: &str) -> Option<NaiveDateTime> {
    parse_datetime(text).or_else(|| parse_legacy(text))
}
