//! Moment-style calendar formatting for the `momentDate` operator

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};

use super::DateZone;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a given instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Calendar-backed date rendering
pub trait Calendar: Send + Sync {
    /// Render `instant` with a moment-style pattern (`[text]` is literal)
    fn format(&self, instant: DateTime<Utc>, pattern: &str) -> String;

    /// Whole calendar days from `instant` to today (0 = today, 1 = yesterday)
    fn days_before_today(&self, instant: DateTime<Utc>) -> i64;
}

/// Name tables for month and weekday tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarLocale {
    #[default]
    En,
    De,
    Ru,
}

impl CalendarLocale {
    /// `"de"`, `"de-AT"` → German, `"ru"` → Russian, anything else English
    pub fn from_language(language: &str) -> Self {
        let lang = language.to_ascii_lowercase();
        if lang.starts_with("de") {
            CalendarLocale::De
        } else if lang.starts_with("ru") {
            CalendarLocale::Ru
        } else {
            CalendarLocale::En
        }
    }

    fn months(self) -> &'static [&'static str; 12] {
        match self {
            CalendarLocale::En => &[
                "January", "February", "March", "April", "May", "June", "July", "August",
                "September", "October", "November", "December",
            ],
            CalendarLocale::De => &[
                "Januar", "Februar", "März", "April", "Mai", "Juni", "Juli", "August",
                "September", "Oktober", "November", "Dezember",
            ],
            CalendarLocale::Ru => &[
                "январь", "февраль", "март", "апрель", "май", "июнь", "июль", "август",
                "сентябрь", "октябрь", "ноябрь", "декабрь",
            ],
        }
    }

    fn months_short(self) -> &'static [&'static str; 12] {
        match self {
            CalendarLocale::En => &[
                "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
            ],
            CalendarLocale::De => &[
                "Jan.", "Feb.", "März", "Apr.", "Mai", "Juni", "Juli", "Aug.", "Sep.", "Okt.",
                "Nov.", "Dez.",
            ],
            CalendarLocale::Ru => &[
                "янв.", "февр.", "март", "апр.", "май", "июнь", "июль", "авг.", "сент.", "окт.",
                "нояб.", "дек.",
            ],
        }
    }

    /// Sunday first
    fn weekdays(self) -> &'static [&'static str; 7] {
        match self {
            CalendarLocale::En => &[
                "Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday",
            ],
            CalendarLocale::De => &[
                "Sonntag", "Montag", "Dienstag", "Mittwoch", "Donnerstag", "Freitag", "Samstag",
            ],
            CalendarLocale::Ru => &[
                "воскресенье", "понедельник", "вторник", "среда", "четверг", "пятница", "суббота",
            ],
        }
    }

    fn weekdays_short(self) -> &'static [&'static str; 7] {
        match self {
            CalendarLocale::En => &["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
            CalendarLocale::De => &["So.", "Mo.", "Di.", "Mi.", "Do.", "Fr.", "Sa."],
            CalendarLocale::Ru => &["вс", "пн", "вт", "ср", "чт", "пт", "сб"],
        }
    }

    fn weekdays_min(self) -> &'static [&'static str; 7] {
        match self {
            CalendarLocale::En => &["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"],
            CalendarLocale::De => &["So", "Mo", "Di", "Mi", "Do", "Fr", "Sa"],
            CalendarLocale::Ru => &["вс", "пн", "вт", "ср", "чт", "пт", "сб"],
        }
    }

    /// Pattern behind a localized format token (`LT`, `LTS`, `L` .. `LLLL`)
    fn long_format(self, token: &str) -> &'static str {
        match (self, token) {
            (CalendarLocale::En, "LT") => "h:mm A",
            (CalendarLocale::En, "LTS") => "h:mm:ss A",
            (CalendarLocale::En, "L") => "MM/DD/YYYY",
            (CalendarLocale::En, "LL") => "MMMM D, YYYY",
            (CalendarLocale::En, "LLL") => "MMMM D, YYYY h:mm A",
            (CalendarLocale::En, _) => "dddd, MMMM D, YYYY h:mm A",
            (CalendarLocale::De, "LT") => "HH:mm",
            (CalendarLocale::De, "LTS") => "HH:mm:ss",
            (CalendarLocale::De, "L") => "DD.MM.YYYY",
            (CalendarLocale::De, "LL") => "D. MMMM YYYY",
            (CalendarLocale::De, "LLL") => "D. MMMM YYYY HH:mm",
            (CalendarLocale::De, _) => "dddd, D. MMMM YYYY HH:mm",
            (CalendarLocale::Ru, "LT") => "H:mm",
            (CalendarLocale::Ru, "LTS") => "H:mm:ss",
            (CalendarLocale::Ru, "L") => "DD.MM.YYYY",
            (CalendarLocale::Ru, "LL") => "D MMMM YYYY [г.]",
            (CalendarLocale::Ru, "LLL") => "D MMMM YYYY [г.], H:mm",
            (CalendarLocale::Ru, _) => "dddd, D MMMM YYYY [г.], H:mm",
        }
    }

    fn ordinal(self, n: u32) -> String {
        match self {
            CalendarLocale::En => {
                let suffix = match (n % 10, n % 100) {
                    (_, 11..=13) => "th",
                    (1, _) => "st",
                    (2, _) => "nd",
                    (3, _) => "rd",
                    _ => "th",
                };
                format!("{}{}", n, suffix)
            }
            CalendarLocale::De => format!("{}.", n),
            CalendarLocale::Ru => format!("{}-го", n),
        }
    }
}

/// Localized formats, longest first
const LOCALIZED: &[&str] = &["LTS", "LT", "LLLL", "LLL", "LL", "L"];

/// Tokens, longest first within each letter
const TOKENS: &[&str] = &[
    "YYYY", "YY", "Q", "MMMM", "MMM", "MM", "M", "DDDD", "DDD", "DD", "Do", "D", "dddd", "ddd",
    "dd", "d", "HH", "H", "hh", "h", "kk", "k", "mm", "m", "ss", "s", "SSS", "SS", "S", "A", "a",
    "ZZ", "Z", "X", "x", "WW", "W",
];

/// Moment-compatible calendar with English, German and Russian names
#[derive(Clone)]
pub struct MomentCalendar {
    locale: CalendarLocale,
    zone: DateZone,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for MomentCalendar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MomentCalendar")
            .field("locale", &self.locale)
            .field("zone", &self.zone)
            .finish_non_exhaustive()
    }
}

impl MomentCalendar {
    pub fn new(locale: CalendarLocale, zone: DateZone) -> Self {
        Self {
            locale,
            zone,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn locale(&self) -> CalendarLocale {
        self.locale
    }

    /// Replace localized format tokens outside `[...]` with the locale's pattern
    fn expand_localized(&self, pattern: &str) -> String {
        let mut out = String::with_capacity(pattern.len() + 16);
        let mut rest = pattern;

        while let Some(ch) = rest.chars().next() {
            if ch == '[' {
                if let Some(close) = rest.find(']') {
                    out.push_str(&rest[..=close]);
                    rest = &rest[close + 1..];
                    continue;
                }
            }
            match LOCALIZED.iter().find(|t| rest.starts_with(**t)) {
                Some(token) => {
                    out.push_str(self.locale.long_format(token));
                    rest = &rest[token.len()..];
                }
                None => {
                    out.push(ch);
                    rest = &rest[ch.len_utf8()..];
                }
            }
        }
        out
    }

    fn token(&self, token: &str, dt: &DateTime<FixedOffset>, out: &mut String) {
        let locale = self.locale;
        let weekday = dt.weekday().num_days_from_sunday() as usize;
        let month = dt.month0() as usize;
        let hour12 = match dt.hour() % 12 {
            0 => 12,
            h => h,
        };
        // String writes cannot fail
        let _ = match token {
            "YYYY" => write!(out, "{:04}", dt.year()),
            "YY" => write!(out, "{:02}", dt.year().rem_euclid(100)),
            "Q" => write!(out, "{}", dt.month0() / 3 + 1),
            "MMMM" => write!(out, "{}", locale.months()[month]),
            "MMM" => write!(out, "{}", locale.months_short()[month]),
            "MM" => write!(out, "{:02}", dt.month()),
            "M" => write!(out, "{}", dt.month()),
            "DDDD" => write!(out, "{:03}", dt.ordinal()),
            "DDD" => write!(out, "{}", dt.ordinal()),
            "DD" => write!(out, "{:02}", dt.day()),
            "Do" => write!(out, "{}", locale.ordinal(dt.day())),
            "D" => write!(out, "{}", dt.day()),
            "dddd" => write!(out, "{}", locale.weekdays()[weekday]),
            "ddd" => write!(out, "{}", locale.weekdays_short()[weekday]),
            "dd" => write!(out, "{}", locale.weekdays_min()[weekday]),
            "d" => write!(out, "{}", weekday),
            "HH" => write!(out, "{:02}", dt.hour()),
            "H" => write!(out, "{}", dt.hour()),
            "hh" => write!(out, "{:02}", hour12),
            "h" => write!(out, "{}", hour12),
            "kk" => write!(out, "{:02}", if dt.hour() == 0 { 24 } else { dt.hour() }),
            "k" => write!(out, "{}", if dt.hour() == 0 { 24 } else { dt.hour() }),
            "mm" => write!(out, "{:02}", dt.minute()),
            "m" => write!(out, "{}", dt.minute()),
            "ss" => write!(out, "{:02}", dt.second()),
            "s" => write!(out, "{}", dt.second()),
            "SSS" => write!(out, "{:03}", dt.timestamp_subsec_millis() % 1000),
            "SS" => write!(out, "{:02}", dt.timestamp_subsec_millis() % 1000 / 10),
            "S" => write!(out, "{}", dt.timestamp_subsec_millis() % 1000 / 100),
            "A" => out.write_str(if dt.hour() < 12 { "AM" } else { "PM" }),
            "a" => out.write_str(if dt.hour() < 12 { "am" } else { "pm" }),
            "Z" | "ZZ" => {
                let secs = dt.offset().local_minus_utc();
                let sign = if secs < 0 { '-' } else { '+' };
                let (h, m) = (secs.abs() / 3600, secs.abs() % 3600 / 60);
                if token == "Z" {
                    write!(out, "{}{:02}:{:02}", sign, h, m)
                } else {
                    write!(out, "{}{:02}{:02}", sign, h, m)
                }
            }
            "X" => write!(out, "{}", dt.timestamp()),
            "x" => write!(out, "{}", dt.timestamp_millis()),
            "WW" => write!(out, "{:02}", dt.iso_week().week()),
            "W" => write!(out, "{}", dt.iso_week().week()),
            other => out.write_str(other),
        };
    }
}

impl Calendar for MomentCalendar {
    fn format(&self, instant: DateTime<Utc>, pattern: &str) -> String {
        let dt = self.zone.localize(instant);
        let pattern = self.expand_localized(pattern);
        let mut out = String::with_capacity(pattern.len() + 16);
        let mut rest = pattern.as_str();

        while let Some(ch) = rest.chars().next() {
            if ch == '[' {
                if let Some(close) = rest.find(']') {
                    out.push_str(&rest[1..close]);
                    rest = &rest[close + 1..];
                    continue;
                }
            }
            match TOKENS.iter().find(|t| rest.starts_with(**t)) {
                Some(token) => {
                    self.token(token, &dt, &mut out);
                    rest = &rest[token.len()..];
                }
                None => {
                    out.push(ch);
                    rest = &rest[ch.len_utf8()..];
                }
            }
        }
        out
    }

    fn days_before_today(&self, instant: DateTime<Utc>) -> i64 {
        let today = self.zone.localize(self.clock.now()).date_naive();
        let day = self.zone.localize(instant).date_naive();
        (today - day).num_days()
    }
}
