//! Operator pipeline: applies a binding's operations left to right

use std::fmt::Write as _;

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use serde_json::{json, Map, Value as Json};
use tracing::{error, warn};

use crate::binding::{Binding, FormulaArg, Operation};
use crate::context::FormatRequest;
use crate::date::{from_millis, parse_date_text, Calendar};
use crate::engine::FormattingEngine;
use crate::formula::{self, Scope};
use crate::jsonpath;
use crate::value::{format_number, parse_number, round_half_up, to_fixed, to_int32, Value};
use crate::value_format::{format_value_with, ValueFormat};

/// First weekday run of a moment pattern (`dd`, `ddd`, `dddd`)
static WEEKDAY_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"d{2,}").unwrap());

/// Prefix of formula arguments addressed relative to the widget's `oid`
const WIDGET_OID: &str = "widgetOid.";

pub(crate) struct Pipeline<'a> {
    engine: &'a FormattingEngine,
    request: &'a FormatRequest<'a>,
    binding: &'a Binding,
}

impl<'a> Pipeline<'a> {
    pub(crate) fn new(
        engine: &'a FormattingEngine,
        request: &'a FormatRequest<'a>,
        binding: &'a Binding,
    ) -> Self {
        Self {
            engine,
            request,
            binding,
        }
    }

    pub(crate) fn run(&self, value: Value) -> Value {
        self.binding
            .operations
            .iter()
            .fold(value, |value, op| self.apply(op, value))
    }

    fn apply(&self, op: &Operation, value: Value) -> Value {
        match op {
            Operation::Eval { args, formula } => self.eval(args, formula.as_deref(), value),
            Operation::Multiply(arg) => arithmetic(value, *arg, |v, a| v * a),
            Operation::Divide(arg) => arithmetic(value, *arg, |v, a| v / a),
            Operation::Add(arg) => arithmetic(value, *arg, |v, a| v + a),
            Operation::Subtract(arg) => arithmetic(value, *arg, |v, a| v - a),
            Operation::Remainder(arg) => arithmetic(value, *arg, |v, a| v % a),
            Operation::Round(None) => Value::Number(round_half_up(value.to_number())),
            Operation::Round(Some(digits)) => {
                Value::String(to_fixed(value.to_number(), decimal_places(*digits)))
            }
            Operation::Pow(exponent) => {
                let n = value.to_number();
                Value::Number(match exponent {
                    Some(e) => n.powf(*e),
                    None => n * n,
                })
            }
            Operation::Sqrt => Value::Number(value.to_number().sqrt()),
            Operation::Hex => hex(&value, false, false),
            Operation::HexUpper => hex(&value, true, false),
            Operation::Hex2 => hex(&value, false, true),
            Operation::Hex2Upper => hex(&value, true, true),
            Operation::Value(arg) => Value::String(format_value_with(&value, &ValueFormat::parse(arg))),
            Operation::Array(items) => usize::try_from(to_int32(value.to_strict_number()))
                .ok()
                .and_then(|i| items.get(i))
                .map_or(Value::Undefined, |item| Value::from(item.as_str())),
            Operation::Date(arg) => Value::String(self.engine.dates.format_value(
                &value,
                arg,
                self.binding.is_seconds,
                &self.engine.context.date_format,
            )),
            Operation::MomentDate(arg) => self.moment_date(arg, value),
            Operation::Min(Some(floor)) => {
                let n = value.to_number();
                Value::Number(if n < *floor { *floor } else { n })
            }
            Operation::Max(Some(ceiling)) => {
                let n = value.to_number();
                Value::Number(if n > *ceiling { *ceiling } else { n })
            }
            Operation::Min(None) | Operation::Max(None) => value,
            Operation::Random(scale) => Value::Number(rand::random::<f64>() * scale.unwrap_or(1.0)),
            Operation::Floor => Value::Number(value.to_number().floor()),
            Operation::Ceil => Value::Number(value.to_number().ceil()),
            Operation::Json(path) => self.json(path, value),
            Operation::Unknown(name) => {
                warn!(template = %self.binding.format, operator = %name, "unknown binding operator");
                value
            }
        }
    }

    fn eval(&self, args: &[FormulaArg], formula: Option<&str>, value: Value) -> Value {
        let Some(formula) = formula else {
            return Value::Undefined;
        };

        let mut scope = Scope::new();
        for arg in args {
            scope.insert(arg.name.clone(), structured(self.formula_arg(arg)));
        }
        if formula.contains("widget.") {
            scope.insert("widget".to_string(), self.widget_snapshot());
        }

        match formula::evaluate(formula, &scope, &self.engine.limits) {
            Ok(result @ (Value::Array(_) | Value::Object(_))) => {
                Value::String(result.to_json_string())
            }
            Ok(result) => result,
            Err(err) => {
                error!(
                    template = %self.binding.format,
                    value = %value,
                    script = %script_text(&scope, formula),
                    error = %err,
                    "formula evaluation failed"
                );
                Value::Number(0.0)
            }
        }
    }

    fn formula_arg(&self, arg: &FormulaArg) -> Value {
        match arg.state_ref.strip_prefix(WIDGET_OID) {
            Some(channel) => self
                .request
                .data()
                .and_then(|data| data.get("oid"))
                .and_then(Json::as_str)
                .map_or(Value::Undefined, |oid| {
                    self.engine
                        .lookup(&format!("{}.{}", oid, channel), self.request)
                }),
            None => self.engine.lookup(&arg.state_ref, self.request),
        }
    }

    /// `widget` as seen by formulas, with the active widget data
    fn widget_snapshot(&self) -> Value {
        let widget = self.request.widget;
        Value::from(json!({
            "wid": self.request.widget_id,
            "tpl": widget.map(|w| w.tpl.as_str()).unwrap_or_default(),
            "data": self.request.data().cloned().unwrap_or_default(),
            "style": widget.map(|w| w.style.clone()).unwrap_or_else(Map::new),
        }))
    }

    /// `momentDate(pattern[,useTodayOrYesterday])`
    fn moment_date(&self, arg: &str, value: Value) -> Value {
        let parts: Vec<&str> = if arg.is_empty() {
            Vec::new()
        } else {
            arg.split(',').collect()
        };
        let (pattern, today_or_yesterday) = match parts.as_slice() {
            [] => ("", false),
            [pattern] => (*pattern, false),
            [pattern, flag] => (*pattern, flag.trim() == "true"),
            _ => return Value::from("error"),
        };

        let calendar: Option<&dyn Calendar> = match self.request.calendar {
            Some(calendar) => Some(calendar),
            None => self.engine.calendar.as_deref(),
        };
        let Some(calendar) = calendar else {
            warn!(template = %self.binding.format, "momentDate without a calendar, value left unchanged");
            return value;
        };

        let Some(instant) = self.moment_instant(&value) else {
            return Value::from("Invalid date");
        };

        let pattern = pattern.trim();
        let mut pattern = if pattern.is_empty() {
            self.engine.context.date_format.clone()
        } else {
            pattern.to_string()
        };
        if today_or_yesterday {
            let label = match calendar.days_before_today(instant) {
                0 => Some("Today"),
                1 => Some("Yesterday"),
                _ => None,
            };
            if let Some(label) = label {
                let literal = format!("[{}]", self.engine.context.translate(label));
                pattern = WEEKDAY_TOKEN.replace(&pattern, NoExpand(&literal)).into_owned();
            }
        }

        Value::String(calendar.format(instant, &pattern))
    }

    /// Numbers are epoch milliseconds, text is a date or a number
    fn moment_instant(&self, value: &Value) -> Option<chrono::DateTime<chrono::Utc>> {
        match value {
            Value::Number(ms) => from_millis(*ms),
            Value::String(text) => {
                let n = parse_number(text);
                if !text.trim().is_empty() && !n.is_nan() {
                    from_millis(n)
                } else {
                    parse_date_text(text, self.engine.dates.zone())
                }
            }
            _ => None,
        }
    }

    fn json(&self, path: &str, value: Value) -> Value {
        let document = match value.as_str().map(serde_json::from_str::<Json>) {
            Some(Ok(parsed)) => Value::from(parsed),
            Some(Err(err)) => {
                warn!(template = %self.binding.format, error = %err, "json operator: value is not valid JSON");
                return value;
            }
            None => value,
        };

        match document {
            Value::Array(_) | Value::Object(_) => match jsonpath::resolve(&document, path) {
                Ok(found) => found.unwrap_or_default(),
                Err(err) => {
                    warn!(template = %self.binding.format, error = %err, "json operator: bad path");
                    Value::Undefined
                }
            },
            other => other,
        }
    }
}

fn arithmetic(value: Value, arg: Option<f64>, op: fn(f64, f64) -> f64) -> Value {
    match arg {
        Some(a) => Value::Number(op(value.to_number(), a)),
        None => value,
    }
}

fn decimal_places(digits: f64) -> usize {
    if digits.is_finite() && digits > 0.0 {
        digits.min(100.0) as usize
    } else {
        0
    }
}

fn hex(value: &Value, upper: bool, pad: bool) -> Value {
    let n = round_half_up(value.to_number());
    let mut text = if !n.is_finite() {
        format_number(n)
    } else if n < 0.0 {
        format!("-{:x}", n.abs() as u128)
    } else {
        format!("{:x}", n as u128)
    };
    if pad && text.len() < 2 {
        text.insert(0, '0');
    }
    if upper {
        text = text.to_uppercase();
    }
    Value::String(text)
}

/// JSON object/array text is handed to formulas as structure
fn structured(value: Value) -> Value {
    let parsed = match &value {
        Value::String(text) if text.trim_start().starts_with(['{', '[']) => {
            serde_json::from_str::<Json>(text).ok()
        }
        _ => None,
    };
    parsed.map_or(value, Value::from)
}

/// Script equivalent of a formula evaluation, for error logs
fn script_text(scope: &Scope, formula: &str) -> String {
    let mut script = String::new();
    for (name, value) in scope {
        let _ = writeln!(script, "let {} = {};", name, value.to_json_string());
    }
    let _ = write!(script, "return {};", formula);
    script
}
