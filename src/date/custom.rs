//! Token date formatter for the `date` operator
//!
//! | field   | tokens                  |
//! |---------|-------------------------|
//! | year    | YYYY YY JJJJ JJ ГГГГ ГГ |
//! | month   | MM M ММ М               |
//! | day     | DD D TT T ДД Д          |
//! | hour    | hh h SS S чч ч          |
//! | minute  | mm m мм м               |
//! | second  | ss s сс с               |
//! | millis  | sss ссс                 |

use chrono::{DateTime, Datelike, Duration, FixedOffset, Timelike, Utc};

use super::{classify, from_millis, DateInput, DateZone};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl Field {
    fn of(ch: char) -> Option<Self> {
        let field = match ch {
            'Y' | 'J' | 'Г' => Field::Year,
            'M' | 'М' => Field::Month,
            'D' | 'T' | 'Д' => Field::Day,
            'h' | 'S' | 'ч' => Field::Hour,
            'm' | 'м' => Field::Minute,
            's' | 'с' => Field::Second,
            _ => return None,
        };
        Some(field)
    }

    /// Render a run of `len` identical token letters
    fn render(self, len: usize, dt: &DateTime<FixedOffset>) -> String {
        let number = match self {
            Field::Year => {
                return match len {
                    4 => format!("{:04}", dt.year()),
                    2 => format!("{:02}", dt.year().rem_euclid(100)),
                    _ => String::new(),
                }
            }
            Field::Second if len == 3 => return format!("{:03}", dt.timestamp_subsec_millis() % 1000),
            Field::Month => dt.month(),
            Field::Day => dt.day(),
            Field::Hour => dt.hour(),
            Field::Minute => dt.minute(),
            Field::Second => dt.second(),
        };
        match len {
            1 => number.to_string(),
            2 => format!("{:02}", number),
            _ => String::new(),
        }
    }
}

/// Formatter behind `{ref;date(pattern)}`
#[derive(Debug, Clone, Copy, Default)]
pub struct DateFormatter {
    zone: DateZone,
}

impl DateFormatter {
    pub fn new(zone: DateZone) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> DateZone {
        self.zone
    }

    /// Render a state value for `date(arg)`
    ///
    /// `arg` is a pattern, `duration`, or `duration,pattern`; an empty
    /// pattern falls back to `default_pattern`.
    pub fn format_value(
        &self,
        value: &Value,
        arg: &str,
        is_seconds: bool,
        default_pattern: &str,
    ) -> String {
        let (force_duration, pattern) = split_argument(arg);
        let pattern = if pattern.is_empty() {
            default_pattern
        } else {
            pattern
        };

        match classify(value, self.zone, force_duration, is_seconds) {
            Some(DateInput::Instant(instant)) => self.format(instant, pattern),
            Some(DateInput::Duration(seconds)) => self
                .duration_fields(seconds)
                .map(|fields| render(pattern, &fields))
                .unwrap_or_default(),
            None => String::new(),
        }
    }

    /// Render an instant in the formatter's zone
    pub fn format(&self, instant: DateTime<Utc>, pattern: &str) -> String {
        render(pattern, &self.zone.localize(instant))
    }

    /// Elapsed seconds as calendar fields (`3661` → 01:01:01)
    ///
    /// The instant is shifted back by its zone offset exactly once, so the
    /// localized fields read as the elapsed time.
    fn duration_fields(&self, seconds: f64) -> Option<DateTime<FixedOffset>> {
        let instant = from_millis(seconds * 1000.0)?;
        let offset = self.zone.offset_at(instant);
        let shifted = instant - Duration::seconds(i64::from(offset.local_minus_utc()));
        Some(shifted.with_timezone(&offset))
    }
}

fn split_argument(arg: &str) -> (bool, &str) {
    let arg = arg.trim();
    if arg == "duration" {
        return (true, "");
    }
    match arg.split_once(',') {
        Some((head, pattern)) if head.trim() == "duration" => (true, pattern.trim()),
        _ => (false, arg),
    }
}

fn render(pattern: &str, dt: &DateTime<FixedOffset>) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        match Field::of(ch) {
            Some(field) => {
                let run = chars[i..].iter().take_while(|c| **c == ch).count();
                out.push_str(&field.render(run, dt));
                i += run;
            }
            None => {
                out.push(ch);
                i += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn utc() -> DateFormatter {
        DateFormatter::new(DateZone::utc())
    }

    fn sample() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap() + Duration::milliseconds(45)
    }

    #[test]
    fn latin_tokens() {
        assert_eq!(utc().format(sample(), "DD.MM.YYYY hh:mm:ss.sss"), "05.03.2024 07:08:09.045");
        assert_eq!(utc().format(sample(), "D.M.YY h:m:s"), "5.3.24 7:8:9");
    }

    #[test]
    fn german_and_cyrillic_aliases() {
        assert_eq!(utc().format(sample(), "TT.MM.JJJJ SS:mm"), "05.03.2024 07:08");
        assert_eq!(utc().format(sample(), "ДД.ММ.ГГГГ чч:мм:сс"), "05.03.2024 07:08:09");
    }

    #[test]
    fn unknown_run_lengths_render_nothing() {
        assert_eq!(utc().format(sample(), "YYY|DDD|x"), "||x");
    }

    #[test]
    fn epoch_seconds_in_utc() {
        let out = utc().format_value(&Value::from(946_684_800.0), "YYYY-MM-DD", false, "DD.MM.YYYY");
        assert_eq!(out, "2000-01-01");
    }

    #[test]
    fn default_pattern_when_argument_is_empty() {
        let out = utc().format_value(&Value::from("2024-03-05T07:08:09Z"), "", false, "DD.MM.YYYY");
        assert_eq!(out, "05.03.2024");
    }

    #[test]
    fn duration_mode_ignores_zone_offset() {
        let zone = DateZone::from_offset_minutes(120).unwrap();
        let formatter = DateFormatter::new(zone);
        assert_eq!(formatter.format_value(&Value::from(3661.0), "hh:mm:ss", false, ""), "01:01:01");
        assert_eq!(formatter.format_value(&Value::from(100.0), "hh:mm:ss", false, ""), "00:01:40");
    }

    #[test]
    fn explicit_duration_argument() {
        let out = utc().format_value(&Value::from(5400.5), "duration,hh:mm", false, "");
        assert_eq!(out, "01:30");
        let out = utc().format_value(&Value::from(60.0), "duration", false, "mm:ss");
        assert_eq!(out, "01:00");
    }

    #[test]
    fn falsy_values_are_empty() {
        assert_eq!(utc().format_value(&Value::from(0.0), "hh:mm", false, ""), "");
        assert_eq!(utc().format_value(&Value::Null, "hh:mm", false, ""), "");
        assert_eq!(utc().format_value(&Value::from("garbage"), "hh:mm", false, ""), "");
    }

    #[test]
    fn argument_forms() {
        assert_eq!(split_argument("duration"), (true, ""));
        assert_eq!(split_argument("duration, hh:mm"), (true, "hh:mm"));
        assert_eq!(split_argument("DD.MM, hh:mm"), (false, "DD.MM, hh:mm"));
    }
}
