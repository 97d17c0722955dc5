//! Fixed-decimal number formatting with thousands grouping (`value` operator)

use crate::value::{to_fixed, Value, MAX_FRACTION_DIGITS};

/// Default separator pair: decimal point `.`, group separator `,`
///
/// Always used when no pair is given, whatever the active language.
pub const DEFAULT_SEPARATORS: &str = ".,";

/// Decimal and group characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Separators {
    pub decimal: char,
    pub group: char,
}

impl Default for Separators {
    fn default() -> Self {
        Self {
            decimal: '.',
            group: ',',
        }
    }
}

impl Separators {
    /// Build from a 2-character pair such as `".,"` or `",."`
    pub fn from_pair(pair: &str) -> Option<Self> {
        let mut chars = pair.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(decimal), Some(group), None) => Some(Self { decimal, group }),
            _ => None,
        }
    }
}

/// Parsed `value(...)` argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValueFormat {
    pub decimals: usize,
    pub separators: Separators,
}

impl ValueFormat {
    pub fn new(decimals: usize) -> Self {
        Self {
            decimals,
            separators: Separators::default(),
        }
    }

    pub fn with_separators(mut self, separators: Separators) -> Self {
        self.separators = separators;
        self
    }

    /// Parse an operator argument: `"2"`, `"2,."` or just `",."`
    ///
    /// Leading digits are the decimal count (0 when absent, at most
    /// `MAX_FRACTION_DIGITS`); a trailing
    /// 2-character pair overrides the separators. A bare pair is the legacy
    /// form where the pair takes the count's position.
    pub fn parse(arg: &str) -> Self {
        let arg = arg.trim();
        let count_len = arg.bytes().take_while(u8::is_ascii_digit).count();
        let (count, rest) = arg.split_at(count_len);

        Self {
            decimals: count
                .parse()
                .map_or(0, |n: usize| n.min(MAX_FRACTION_DIGITS)),
            separators: Separators::from_pair(rest.trim()).unwrap_or_default(),
        }
    }
}

/// Format with `decimals` places and the default separators
pub fn format_value(value: &Value, decimals: usize) -> String {
    format_value_with(value, &ValueFormat::new(decimals))
}

/// Format a value as fixed-decimal text with grouped integer digits
///
/// Returns an empty string when the value is not numeric.
pub fn format_value_with(value: &Value, format: &ValueFormat) -> String {
    let n = value.to_number();
    if n.is_nan() {
        return String::new();
    }

    let fixed = to_fixed(n, format.decimals);
    // exponent form (|n| >= 1e21) is not grouped
    if !n.is_finite() || fixed.contains('e') {
        return fixed;
    }

    let (sign, body) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = match body.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (body, None),
    };

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    out.push_str(sign);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(format.separators.group);
        }
        out.push(ch);
    }
    if let Some(frac) = frac_part {
        out.push(format.separators.decimal);
        out.push_str(frac);
    }
    out
}
