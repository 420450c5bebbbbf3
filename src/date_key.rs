//! Canonical calendar-day identity
//!
//! A date key is the `YYYY-MM-DD` string for the calendar day an instant falls
//! on in its own time zone. Keys are what the habit store emits and what every
//! other stage of the engine compares against.

use crate::error::ComputeError;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// A calendar day with no time-of-day or zone attached.
pub type CalendarDay = NaiveDate;

/// Format used for every date key.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Hour used to anchor a calendar day when a display instant is needed.
pub const DISPLAY_ANCHOR_HOUR: u32 = 12;

/// Date key for the calendar day `instant` falls on in its own time zone.
///
/// Pass a `DateTime<Local>` to get the host's local day; a `DateTime<Utc>`
/// yields the UTC day.
pub fn date_key<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    format_date_key(instant.date_naive())
}

/// Date key for an already-resolved calendar day.
pub fn format_date_key(day: CalendarDay) -> String {
    day.format(DATE_KEY_FORMAT).to_string()
}

/// Parse a canonical date key.
///
/// Only the exact zero-padded form is accepted (`2024-3-5` is rejected), so a
/// key that parses always round-trips to the same string.
pub fn parse_date_key(key: &str) -> Result<CalendarDay, ComputeError> {
    let bytes = key.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());

    if !shape_ok {
        return Err(ComputeError::InvalidDateKey(key.to_string()));
    }

    NaiveDate::parse_from_str(key, DATE_KEY_FORMAT)
        .map_err(|_| ComputeError::InvalidDateKey(key.to_string()))
}

/// The day anchored at noon, for rendering.
///
/// Noon is never skipped or repeated by a daylight-saving transition, so
/// converting the result into any local zone stays on the same day.
pub fn display_anchor(day: CalendarDay) -> NaiveDateTime {
    let noon = NaiveTime::from_hms_opt(DISPLAY_ANCHOR_HOUR, 0, 0).unwrap_or_default();
    day.and_time(noon)
}

/// Today's calendar day in the host time zone.
///
/// Engine functions never call this; it exists for callers that need to pick
/// the evaluation day once.
pub fn local_today() -> CalendarDay {
    Local::now().date_naive()
}

/// Serde adapter that (de)serializes a [`CalendarDay`] as a strict date key.
pub mod serde_key {
    use super::{format_date_key, parse_date_key, CalendarDay};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(day: &CalendarDay, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_date_key(*day))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<CalendarDay, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_date_key(&raw).map_err(de::Error::custom)
    }
}
