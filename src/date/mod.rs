//! Date rendering for the `date` and `momentDate` operators
//!
//! - `custom`: token formatter (`DD.MM.YYYY hh:mm`, German and Cyrillic
//!   aliases, duration mode)
//! - `calendar`: moment-style `Calendar` with localized names and a `Clock`
//!
//! Numeric inputs are classified by magnitude:
//! ```text
//! integral  < 946681200          duration in seconds
//! integral  < 946681200000       epoch seconds
//! otherwise                      epoch milliseconds
//! ```

mod calendar;
mod custom;

use chrono::{
    DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc,
};

use crate::error::{BindError, Result};
use crate::value::{parse_number, Value};

pub use calendar::{Calendar, CalendarLocale, Clock, FixedClock, MomentCalendar, SystemClock};
pub use custom::DateFormatter;

/// Pattern used when a date operator has no argument
pub const DEFAULT_DATE_FORMAT: &str = "DD.MM.YYYY";

/// Integral values below this are durations (seconds)
pub const DURATION_THRESHOLD: f64 = 946_681_200.0;

/// Integral values below this (and above the duration range) are epoch seconds
pub const SECONDS_THRESHOLD: f64 = 946_681_200_000.0;

/// Zone dates are rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateZone {
    /// Host local time
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl DateZone {
    pub fn utc() -> Self {
        DateZone::Fixed(Utc.fix())
    }

    /// Fixed offset east of UTC, in minutes
    pub fn from_offset_minutes(minutes: i32) -> Result<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(DateZone::Fixed)
            .ok_or(BindError::InvalidOffset { minutes })
    }

    /// Offset in effect at `instant`
    pub fn offset_at(&self, instant: DateTime<Utc>) -> FixedOffset {
        match self {
            DateZone::Local => Local.offset_from_utc_datetime(&instant.naive_utc()).fix(),
            DateZone::Fixed(offset) => *offset,
        }
    }

    pub fn localize(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.offset_at(instant))
    }

    /// Interpret a wall-clock time in this zone
    fn from_local(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            DateZone::Local => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            DateZone::Fixed(offset) => offset
                .from_local_datetime(&naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

/// Epoch milliseconds → instant
pub(crate) fn from_millis(ms: f64) -> Option<DateTime<Utc>> {
    if !ms.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(ms.floor() as i64)
}

/// Number or numeric text
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => Some(*n),
        Value::String(s) if !s.trim().is_empty() => {
            let n = parse_number(s);
            (!n.is_nan()).then_some(n)
        }
        _ => None,
    }
}

/// Date text in one of the accepted layouts, interpreted in `zone` when it
/// carries no offset of its own
pub(crate) fn parse_date_text(text: &str, zone: DateZone) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for layout in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, layout) {
            return zone.from_local(naive);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|naive| zone.from_local(naive))
}

/// What a `date` input denotes
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum DateInput {
    Instant(DateTime<Utc>),
    /// Elapsed seconds
    Duration(f64),
}

/// Classify a `date` input; `None` renders as an empty string
///
/// `force_duration` comes from a `duration` argument; `is_seconds` bindings
/// (`.ts`/`.lc`) never enter duration mode on their own.
pub(crate) fn classify(
    value: &Value,
    zone: DateZone,
    force_duration: bool,
    is_seconds: bool,
) -> Option<DateInput> {
    if !value.is_truthy() || matches!(value, Value::Bool(_)) {
        return None;
    }

    let Some(n) = numeric(value) else {
        return match value {
            Value::String(s) => parse_date_text(s, zone).map(DateInput::Instant),
            _ => None,
        };
    };

    if !n.is_finite() {
        return None;
    }
    let integral = n.fract() == 0.0;
    if force_duration || (integral && n < DURATION_THRESHOLD && !is_seconds) {
        return Some(DateInput::Duration(n));
    }
    let ms = if integral && n < SECONDS_THRESHOLD {
        n * 1000.0
    } else {
        n
    };
    from_millis(ms).map(DateInput::Instant)
}
