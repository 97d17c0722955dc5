//! Dynamic values flowing through the binding pipeline
//!
//! State values arrive loosely typed (numbers stored as strings, JSON
//! documents stored as text, ...). `Value` keeps them as they are and
//! provides the coercions the operators rely on:
//! - `to_number`: lenient prefix parsing (`"12.5 kW"` → 12.5)
//! - `to_strict_number`: whole-string conversion used by formulas
//! - `Display`: the text substituted into templates

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value as Json;

/// A value resolved from live state or produced by an operator
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Missing state (renders as `undefined`)
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Lenient numeric coercion: parses the longest numeric prefix
    ///
    /// Non-numeric input yields NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::String(s) => parse_float(s),
            Value::Array(_) => parse_float(&self.to_string()),
            _ => f64::NAN,
        }
    }

    /// Strict numeric coercion: the whole string must be numeric
    ///
    /// `true` → 1, `null` → 0, `""` → 0, `"12px"` → NaN.
    pub fn to_strict_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::String(s) => parse_number(s),
            Value::Array(_) => parse_number(&self.to_string()),
            Value::Object(_) => f64::NAN,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to JSON (undefined and non-finite numbers become null)
    pub fn to_json(&self) -> Json {
        match self {
            Value::Undefined | Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(|num| {
                    if n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
                        Json::from(*n as i64)
                    } else {
                        Json::Number(num)
                    }
                })
                .unwrap_or(Json::Null),
            Value::String(s) => Json::String(s.clone()),
            Value::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Compact JSON text
    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) => f.write_str(s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    if !item.is_nullish() {
                        write!(f, "{}", item)?;
                    }
                }
                Ok(())
            }
            Value::Object(_) => f.write_str(&self.to_json_string()),
        }
    }
}

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&Json> for Value {
    fn from(json: &Json) -> Self {
        Value::from(json.clone())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Undefined, Into::into)
    }
}

/// Render a number the way display templates expect
///
/// Integral values print without a fraction, very large/small magnitudes
/// use exponent notation (`1e+21`, `1e-7`).
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let abs = n.abs();
    if !(1e-6..1e21).contains(&abs) {
        let repr = format!("{:e}", n);
        return match repr.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => repr,
        };
    }

    format!("{}", n)
}

/// Parse the longest numeric prefix of `text` (leading whitespace allowed)
///
/// Returns NaN when no digits are found.
pub fn parse_float(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let len = bytes.len();
    let mut end = 0;

    if end < len && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_start = end;
    while end < len && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;

    if end < len && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        while frac_end < len && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        mantissa_digits += frac_end - end - 1;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }

    if mantissa_digits == 0 {
        return f64::NAN;
    }

    if end < len && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < len && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < len && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().unwrap_or(f64::NAN)
}

/// Parse a whole string as a number (surrounding whitespace allowed)
///
/// Empty input is 0, `0x` prefixes are hexadecimal, anything else that is
/// not entirely numeric is NaN.
pub fn parse_number(text: &str) -> f64 {
    let s = text.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).map_or(f64::NAN, |n| n as f64);
    }
    let numeric = s
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !numeric {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// Round half up to the nearest integer (`-2.5` → `-2`)
pub fn round_half_up(n: f64) -> f64 {
    // n - floor(n) is exact, unlike n + 0.5
    let floor = n.floor();
    if n - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// Upper bound on the fraction digits `to_fixed` renders
pub const MAX_FRACTION_DIGITS: usize = 100;

/// Fixed-decimal rendering rounded half away from zero
///
/// Rounds on the shortest decimal representation of `n`, so `2.55` with one
/// digit gives `"2.6"` even though the nearest double sits just below 2.55.
pub fn to_fixed(n: f64, digits: usize) -> String {
    let digits = digits.min(MAX_FRACTION_DIGITS);
    if !n.is_finite() || n.abs() >= 1e21 {
        return format_number(n);
    }

    let repr = format!("{}", n.abs());
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));
    let frac = frac_part.as_bytes();

    let mut kept: Vec<u8> = int_part.bytes().collect();
    kept.extend((0..digits).map(|i| frac.get(i).copied().unwrap_or(b'0')));

    if frac.get(digits).is_some_and(|d| *d >= b'5') {
        let mut i = kept.len();
        loop {
            if i == 0 {
                kept.insert(0, b'1');
                break;
            }
            i -= 1;
            if kept[i] == b'9' {
                kept[i] = b'0';
            } else {
                kept[i] += 1;
                break;
            }
        }
    }

    let split = kept.len() - digits;
    let mut out = String::with_capacity(kept.len() + 2);
    if n < 0.0 && kept.iter().any(|d| *d != b'0') {
        out.push('-');
    }
    out.extend(kept[..split].iter().map(|b| char::from(*b)));
    if digits > 0 {
        out.push('.');
        out.extend(kept[split..].iter().map(|b| char::from(*b)));
    }
    out
}

/// Truncate to a signed 32-bit integer (NaN and infinities become 0)
pub fn to_int32(n: f64) -> i32 {
    if !n.is_finite() {
        return 0;
    }
    (n.trunc() as i64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_float_reads_numeric_prefix() {
        assert_eq!(parse_float("12.5 kW"), 12.5);
        assert_eq!(parse_float("  -3"), -3.0);
        assert_eq!(parse_float(".5"), 0.5);
        assert_eq!(parse_float("1e3x"), 1000.0);
        assert_eq!(parse_float("7e"), 7.0);
        assert!(parse_float("abc").is_nan());
        assert!(parse_float("").is_nan());
        assert_eq!(parse_float("-Infinity"), f64::NEG_INFINITY);
    }

    #[test]
    fn parse_number_requires_whole_string() {
        assert_eq!(parse_number(" 42 "), 42.0);
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("0xff"), 255.0);
        assert!(parse_number("12px").is_nan());
        assert!(parse_number("inf").is_nan());
    }

    #[test]
    fn format_number_matches_display_conventions() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn to_fixed_rounds_on_shortest_representation() {
        assert_eq!(to_fixed(2.55, 1), "2.6");
        assert_eq!(to_fixed(1234.5, 2), "1234.50");
        assert_eq!(to_fixed(9.995, 2), "10.00");
        assert_eq!(to_fixed(-1.5, 0), "-2");
        assert_eq!(to_fixed(-0.001, 2), "0.00");
        assert_eq!(to_fixed(0.5, 0), "1");
    }

    #[test]
    fn to_fixed_caps_fraction_digits() {
        assert_eq!(to_fixed(1.0, usize::MAX).len(), 2 + MAX_FRACTION_DIGITS);
    }

    #[test]
    fn round_half_up_goes_towards_positive_infinity() {
        assert_eq!(round_half_up(2.6), 3.0);
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(0.49999999999999994), 0.0);
        assert_eq!(round_half_up(4503599627370497.0), 4503599627370497.0);
        assert_eq!(round_half_up(-0.5), 0.0);
    }

    #[test]
    fn display_of_composite_values() {
        let arr = Value::Array(vec![Value::from(1.0), Value::Null, Value::from("x")]);
        assert_eq!(arr.to_string(), "1,,x");

        let obj = Value::from(json!({"a": 1, "b": [true]}));
        assert_eq!(obj.to_string(), r#"{"a":1,"b":[true]}"#);
        assert_eq!(Value::Undefined.to_string(), "undefined");
    }

    #[test]
    fn truthiness() {
        assert!(!Value::from(0.0).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(Value::from("0").is_truthy());
        assert!(Value::Array(vec![]).is_truthy());
    }

    #[test]
    fn json_conversion_keeps_integers_integral() {
        assert_eq!(Value::from(5.0).to_json(), json!(5));
        assert_eq!(Value::from(0.25).to_json(), json!(0.25));
        assert_eq!(Value::Number(f64::NAN).to_json(), json!(null));
    }
}
