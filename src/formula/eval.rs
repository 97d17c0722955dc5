//! Step-budgeted tree evaluator and the built-in helper library

use std::cmp::Ordering;

use super::parser::{BinaryOp, Expr, LogicalOp, UnaryOp};
use super::{FormulaError, FormulaLimits, Scope};
use crate::value::{format_number, parse_float, round_half_up, to_fixed, to_int32, Value};

/// Longest string a helper may build (padStart/padEnd/repeat-like growth)
const MAX_BUILT_STRING: usize = 1 << 16;

/// Fraction digits rendered by `Number.prototype.toString(radix)`
const MAX_RADIX_FRACTION_DIGITS: usize = 52;

pub(crate) struct Evaluator<'s> {
    scope: &'s Scope,
    limits: FormulaLimits,
    steps: usize,
}

impl<'s> Evaluator<'s> {
    pub(crate) fn new(scope: &'s Scope, limits: FormulaLimits) -> Self {
        Self {
            scope,
            limits,
            steps: 0,
        }
    }

    fn tick(&mut self, cost: usize) -> Result<(), FormulaError> {
        self.steps = self.steps.saturating_add(cost);
        if self.steps > self.limits.max_steps {
            return Err(FormulaError::StepBudget {
                limit: self.limits.max_steps,
            });
        }
        Ok(())
    }

    pub(crate) fn eval(&mut self, expr: &Expr, depth: usize) -> Result<Value, FormulaError> {
        self.tick(1)?;
        if depth > self.limits.max_depth.saturating_mul(2) {
            return Err(FormulaError::TooDeep {
                limit: self.limits.max_depth,
            });
        }
        let next = depth + 1;

        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Ident(name) => {
                self.scope
                    .get(name)
                    .cloned()
                    .ok_or_else(|| FormulaError::UnknownIdentifier { name: name.clone() })
            }
            Expr::List(items) => items
                .iter()
                .map(|item| self.eval(item, next))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Expr::Unary { op, operand } => {
                let value = self.eval(operand, next)?;
                Ok(match op {
                    UnaryOp::Neg => Value::Number(-value.to_strict_number()),
                    UnaryOp::Plus => Value::Number(value.to_strict_number()),
                    UnaryOp::Not => Value::Bool(!value.is_truthy()),
                })
            }
            Expr::Binary { op, left, right } => {
                let left = self.eval(left, next)?;
                let right = self.eval(right, next)?;
                Ok(binary(*op, &left, &right))
            }
            Expr::Logical { op, left, right } => {
                let left = self.eval(left, next)?;
                let short_circuit = match op {
                    LogicalOp::And => !left.is_truthy(),
                    LogicalOp::Or => left.is_truthy(),
                    LogicalOp::Coalesce => !left.is_nullish(),
                };
                if short_circuit {
                    Ok(left)
                } else {
                    self.eval(right, next)
                }
            }
            Expr::Conditional {
                test,
                then,
                otherwise,
            } => {
                if self.eval(test, next)?.is_truthy() {
                    self.eval(then, next)
                } else {
                    self.eval(otherwise, next)
                }
            }
            Expr::Member { object, property } => {
                if let Some(constant) = self.namespace(object).and_then(|ns| constant(ns, property)) {
                    return Ok(constant);
                }
                let target = self.eval(object, next)?;
                get_property(&target, property)
            }
            Expr::Index { object, index } => {
                let target = self.eval(object, next)?;
                let key = match self.eval(index, next)? {
                    Value::Number(n) => format_number(n),
                    other => other.to_string(),
                };
                get_property(&target, &key)
            }
            Expr::Call { callee, args } => {
                let argv = args
                    .iter()
                    .map(|arg| self.eval(arg, next))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call(callee, &argv, next)
            }
        }
    }

    /// `Math` / `JSON` when used as a bare namespace (not shadowed by an argument)
    fn namespace<'e>(&self, object: &'e Expr) -> Option<&'e str> {
        match object {
            Expr::Ident(name)
                if (name == "Math" || name == "JSON") && !self.scope.contains_key(name) =>
            {
                Some(name.as_str())
            }
            _ => None,
        }
    }

    fn call(&mut self, callee: &Expr, args: &[Value], depth: usize) -> Result<Value, FormulaError> {
        match callee {
            Expr::Ident(name) if !self.scope.contains_key(name) => global(name, args),
            Expr::Ident(name) => Err(FormulaError::NotCallable { name: name.clone() }),
            Expr::Member { object, property } => match self.namespace(object) {
                Some("Math") => math(property, args),
                Some(_) => json(property, args),
                None => {
                    let target = self.eval(object, depth)?;
                    self.method(&target, property, args)
                }
            },
            _ => Err(FormulaError::NotCallable {
                name: "expression".to_string(),
            }),
        }
    }

    fn method(&mut self, target: &Value, name: &str, args: &[Value]) -> Result<Value, FormulaError> {
        let arg_num = |i: usize| args.get(i).map(Value::to_strict_number);
        let arg_str = |i: usize| args.get(i).map(Value::to_string);

        match (target, name) {
            (Value::Number(n), "toFixed") => {
                let digits = arg_num(0).map_or(0, to_int32).clamp(0, 100);
                Ok(Value::String(to_fixed(*n, digits as usize)))
            }
            (Value::Number(n), "toString") => {
                let radix = arg_num(0).map_or(10, to_int32);
                if !(2..=36).contains(&radix) {
                    return Err(FormulaError::Argument {
                        function: "toString".to_string(),
                        reason: format!("radix {} out of range 2..36", radix),
                    });
                }
                Ok(Value::String(to_radix(*n, radix as u32)))
            }
            (Value::Bool(_), "toString") | (Value::String(_), "toString") => {
                Ok(Value::String(target.to_string()))
            }
            (Value::String(s), _) => self.string_method(s, name, args),
            (Value::Array(items), "join") => {
                let sep = arg_str(0).unwrap_or_else(|| ",".to_string());
                self.tick(items.len())?;
                let parts: Vec<String> = items
                    .iter()
                    .map(|v| if v.is_nullish() { String::new() } else { v.to_string() })
                    .collect();
                Ok(Value::String(parts.join(&sep)))
            }
            (Value::Array(items), "includes") => {
                let needle = args.first().cloned().unwrap_or_default();
                self.tick(items.len())?;
                Ok(Value::Bool(items.contains(&needle)))
            }
            (Value::Array(items), "indexOf") => {
                let needle = args.first().cloned().unwrap_or_default();
                self.tick(items.len())?;
                let idx = items.iter().position(|v| *v == needle);
                Ok(Value::Number(idx.map_or(-1.0, |i| i as f64)))
            }
            (Value::Array(items), "slice") => {
                let (start, end) = slice_bounds(items.len(), arg_num(0), arg_num(1));
                Ok(Value::Array(items[start..end.max(start)].to_vec()))
            }
            (Value::Undefined | Value::Null, _) => Err(FormulaError::InvalidAccess {
                property: name.to_string(),
                target: target.type_name(),
            }),
            _ => Err(FormulaError::NotCallable {
                name: name.to_string(),
            }),
        }
    }

    fn string_method(&mut self, s: &str, name: &str, args: &[Value]) -> Result<Value, FormulaError> {
        let arg_str = |i: usize| args.get(i).map(Value::to_string).unwrap_or_default();
        let arg_num = |i: usize| args.get(i).map(Value::to_strict_number);
        let chars: Vec<char> = s.chars().collect();
        self.tick(chars.len() / 64 + 1)?;

        let value = match name {
            "toUpperCase" => Value::String(s.to_uppercase()),
            "toLowerCase" => Value::String(s.to_lowercase()),
            "trim" => Value::String(s.trim().to_string()),
            "includes" => Value::Bool(s.contains(&arg_str(0))),
            "startsWith" => Value::Bool(s.starts_with(&arg_str(0))),
            "endsWith" => Value::Bool(s.ends_with(&arg_str(0))),
            "indexOf" => {
                let needle = arg_str(0);
                let idx = s.find(&needle).map(|byte| s[..byte].chars().count());
                Value::Number(idx.map_or(-1.0, |i| i as f64))
            }
            "charAt" => {
                let idx = arg_num(0).map_or(0, to_int32);
                let ch = usize::try_from(idx).ok().and_then(|i| chars.get(i));
                Value::String(ch.map(char::to_string).unwrap_or_default())
            }
            "substring" => {
                let clamp = |n: f64| (to_int32(n).max(0) as usize).min(chars.len());
                let start = arg_num(0).map_or(0, clamp);
                let end = arg_num(1).map_or(chars.len(), clamp);
                let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
                Value::String(chars[lo..hi].iter().collect())
            }
            "slice" => {
                let (start, end) = slice_bounds(chars.len(), arg_num(0), arg_num(1));
                Value::String(chars[start..end.max(start)].iter().collect())
            }
            "replace" => Value::String(s.replacen(&arg_str(0), &arg_str(1), 1)),
            "split" => match args.first() {
                None | Some(Value::Undefined) => Value::Array(vec![Value::from(s)]),
                Some(sep) => {
                    let sep = sep.to_string();
                    let parts: Vec<Value> = if sep.is_empty() {
                        chars.iter().map(|c| Value::String(c.to_string())).collect()
                    } else {
                        s.split(sep.as_str()).map(Value::from).collect()
                    };
                    Value::Array(parts)
                }
            },
            "padStart" | "padEnd" => {
                let target_len = arg_num(0).map_or(0, to_int32).max(0) as usize;
                if target_len > MAX_BUILT_STRING {
                    return Err(FormulaError::Argument {
                        function: name.to_string(),
                        reason: format!("length {} exceeds {}", target_len, MAX_BUILT_STRING),
                    });
                }
                let fill = args.get(1).map_or_else(|| " ".to_string(), Value::to_string);
                self.tick(target_len / 64)?;
                Value::String(pad(&chars, target_len, &fill, name == "padStart"))
            }
            "concat" => {
                let mut out = s.to_string();
                for arg in args {
                    out.push_str(&arg.to_string());
                }
                Value::String(out)
            }
            _ => {
                return Err(FormulaError::NotCallable {
                    name: name.to_string(),
                })
            }
        };
        Ok(value)
    }
}

fn binary(op: BinaryOp, left: &Value, right: &Value) -> Value {
    let num = |f: fn(f64, f64) -> f64| Value::Number(f(left.to_strict_number(), right.to_strict_number()));
    let ordering = || compare(left, right);

    match op {
        BinaryOp::Add => add(left, right),
        BinaryOp::Sub => num(|a, b| a - b),
        BinaryOp::Mul => num(|a, b| a * b),
        BinaryOp::Div => num(|a, b| a / b),
        BinaryOp::Rem => num(|a, b| a % b),
        BinaryOp::Eq => Value::Bool(loose_eq(left, right)),
        BinaryOp::NotEq => Value::Bool(!loose_eq(left, right)),
        BinaryOp::StrictEq => Value::Bool(left == right),
        BinaryOp::StrictNotEq => Value::Bool(left != right),
        BinaryOp::Lt => Value::Bool(ordering() == Some(Ordering::Less)),
        BinaryOp::LtEq => Value::Bool(matches!(ordering(), Some(Ordering::Less | Ordering::Equal))),
        BinaryOp::Gt => Value::Bool(ordering() == Some(Ordering::Greater)),
        BinaryOp::GtEq => {
            Value::Bool(matches!(ordering(), Some(Ordering::Greater | Ordering::Equal)))
        }
    }
}

fn add(left: &Value, right: &Value) -> Value {
    let textual = |v: &Value| matches!(v, Value::String(_) | Value::Array(_) | Value::Object(_));
    if textual(left) || textual(right) {
        Value::String(format!("{}{}", left, right))
    } else {
        Value::Number(left.to_strict_number() + right.to_strict_number())
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => left.to_strict_number().partial_cmp(&right.to_strict_number()),
    }
}

fn loose_eq(left: &Value, right: &Value) -> bool {
    if left.is_nullish() || right.is_nullish() {
        return left.is_nullish() && right.is_nullish();
    }
    match (left, right) {
        (Value::Number(_), Value::String(_))
        | (Value::String(_), Value::Number(_))
        | (Value::Bool(_), _)
        | (_, Value::Bool(_)) => left.to_strict_number() == right.to_strict_number(),
        _ => left == right,
    }
}

fn get_property(target: &Value, property: &str) -> Result<Value, FormulaError> {
    let index = || property.parse::<usize>().ok();
    match target {
        Value::Undefined | Value::Null => Err(FormulaError::InvalidAccess {
            property: property.to_string(),
            target: target.type_name(),
        }),
        Value::String(s) if property == "length" => Ok(Value::Number(s.chars().count() as f64)),
        Value::String(s) => Ok(index()
            .and_then(|i| s.chars().nth(i))
            .map_or(Value::Undefined, |c| Value::String(c.to_string()))),
        Value::Array(items) if property == "length" => Ok(Value::Number(items.len() as f64)),
        Value::Array(items) => Ok(index()
            .and_then(|i| items.get(i).cloned())
            .unwrap_or_default()),
        Value::Object(map) => Ok(map.get(property).cloned().unwrap_or_default()),
        Value::Bool(_) | Value::Number(_) => Ok(Value::Undefined),
    }
}

fn constant(namespace: &str, name: &str) -> Option<Value> {
    if namespace != "Math" {
        return None;
    }
    let n = match name {
        "PI" => std::f64::consts::PI,
        "E" => std::f64::consts::E,
        "LN2" => std::f64::consts::LN_2,
        "LN10" => std::f64::consts::LN_10,
        "SQRT2" => std::f64::consts::SQRT_2,
        _ => return None,
    };
    Some(Value::Number(n))
}

fn math(name: &str, args: &[Value]) -> Result<Value, FormulaError> {
    let a = |i: usize| args.get(i).map_or(f64::NAN, Value::to_strict_number);
    let n = match name {
        "abs" => a(0).abs(),
        "ceil" => a(0).ceil(),
        "floor" => a(0).floor(),
        "round" => round_half_up(a(0)),
        "trunc" => a(0).trunc(),
        "sign" => {
            let x = a(0);
            if x.is_nan() || x == 0.0 {
                x
            } else {
                x.signum()
            }
        }
        "sqrt" => a(0).sqrt(),
        "cbrt" => a(0).cbrt(),
        "exp" => a(0).exp(),
        "log" => a(0).ln(),
        "log2" => a(0).log2(),
        "log10" => a(0).log10(),
        "sin" => a(0).sin(),
        "cos" => a(0).cos(),
        "tan" => a(0).tan(),
        "asin" => a(0).asin(),
        "acos" => a(0).acos(),
        "atan" => a(0).atan(),
        "atan2" => a(0).atan2(a(1)),
        "pow" => a(0).powf(a(1)),
        "hypot" => args
            .iter()
            .map(Value::to_strict_number)
            .map(|x| x * x)
            .sum::<f64>()
            .sqrt(),
        "min" => fold_extreme(args, f64::INFINITY, f64::min),
        "max" => fold_extreme(args, f64::NEG_INFINITY, f64::max),
        "random" => rand::random::<f64>(),
        _ => {
            return Err(FormulaError::NotCallable {
                name: format!("Math.{}", name),
            })
        }
    };
    Ok(Value::Number(n))
}

/// Math.min/Math.max: any NaN argument poisons the result
fn fold_extreme(args: &[Value], init: f64, pick: fn(f64, f64) -> f64) -> f64 {
    args.iter().map(Value::to_strict_number).fold(init, |acc, x| {
        if acc.is_nan() || x.is_nan() {
            f64::NAN
        } else {
            pick(acc, x)
        }
    })
}

fn json(name: &str, args: &[Value]) -> Result<Value, FormulaError> {
    let arg = args.first().cloned().unwrap_or_default();
    match name {
        "stringify" => Ok(match arg {
            Value::Undefined => Value::Undefined,
            other => Value::String(other.to_json_string()),
        }),
        "parse" => serde_json::from_str::<serde_json::Value>(&arg.to_string())
            .map(Value::from)
            .map_err(|e| FormulaError::Argument {
                function: "JSON.parse".to_string(),
                reason: e.to_string(),
            }),
        _ => Err(FormulaError::NotCallable {
            name: format!("JSON.{}", name),
        }),
    }
}

fn global(name: &str, args: &[Value]) -> Result<Value, FormulaError> {
    let arg = args.first().cloned().unwrap_or_default();
    let value = match name {
        "parseFloat" => Value::Number(parse_float(&arg.to_string())),
        "parseInt" => Value::Number(parse_int(
            &arg.to_string(),
            args.get(1).map(Value::to_strict_number),
        )),
        "Number" if args.is_empty() => Value::Number(0.0),
        "Number" => Value::Number(arg.to_strict_number()),
        "String" if args.is_empty() => Value::String(String::new()),
        "String" => Value::String(arg.to_string()),
        "Boolean" => Value::Bool(arg.is_truthy()),
        "isNaN" => Value::Bool(arg.to_strict_number().is_nan()),
        "isFinite" => Value::Bool(arg.to_strict_number().is_finite()),
        _ => {
            return Err(FormulaError::UnknownIdentifier {
                name: name.to_string(),
            })
        }
    };
    Ok(value)
}

fn parse_int(text: &str, radix: Option<f64>) -> f64 {
    let s = text.trim_start();
    let (negative, mut s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };

    let mut radix = radix.map_or(0, to_int32);
    if radix == 0 || radix == 16 {
        if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            s = rest;
            radix = 16;
        }
    }
    if radix == 0 {
        radix = 10;
    }
    if !(2..=36).contains(&radix) {
        return f64::NAN;
    }

    let radix = radix as u32;
    let digits: Vec<u32> = s.chars().map_while(|c| c.to_digit(radix)).collect();
    if digits.is_empty() {
        return f64::NAN;
    }
    let n = digits
        .iter()
        .fold(0.0, |acc, d| acc * f64::from(radix) + f64::from(*d));
    if negative {
        -n
    } else {
        n
    }
}

fn to_radix(n: f64, radix: u32) -> String {
    if radix == 10 || !n.is_finite() || n.abs() >= 1e21 {
        return format_number(n);
    }
    let abs = n.abs();
    let mut v = abs.trunc() as u128;
    let mut digits = Vec::new();
    loop {
        let d = (v % u128::from(radix)) as u32;
        digits.push(std::char::from_digit(d, radix).unwrap_or('0'));
        v /= u128::from(radix);
        if v == 0 {
            break;
        }
    }
    if n < 0.0 {
        digits.push('-');
    }
    let mut out: String = digits.iter().rev().collect();

    // fraction digits until exhausted, at most one per mantissa bit
    let mut frac = abs.fract();
    if frac > 0.0 {
        out.push('.');
        for _ in 0..MAX_RADIX_FRACTION_DIGITS {
            frac *= f64::from(radix);
            let d = frac.trunc();
            out.push(std::char::from_digit(d as u32, radix).unwrap_or('0'));
            frac -= d;
            if frac == 0.0 {
                break;
            }
        }
        while out.ends_with('0') {
            out.pop();
        }
        if out.ends_with('.') {
            out.pop();
        }
    }
    out
}

/// Resolve slice(start, end) bounds with negative offsets from the end
fn slice_bounds(len: usize, start: Option<f64>, end: Option<f64>) -> (usize, usize) {
    let resolve = |n: f64| -> usize {
        let i = i64::from(to_int32(n));
        if i < 0 {
            (len as i64 + i).max(0) as usize
        } else {
            (i as usize).min(len)
        }
    };
    (start.map_or(0, resolve), end.map_or(len, resolve))
}

fn pad(chars: &[char], target_len: usize, fill: &str, at_start: bool) -> String {
    let own: String = chars.iter().collect();
    if chars.len() >= target_len || fill.is_empty() {
        return own;
    }
    let padding: String = fill.chars().cycle().take(target_len - chars.len()).collect();
    if at_start {
        padding + &own
    } else {
        own + &padding
    }
}

#[cfg(test)]
mod tests {
    use super::super::{evaluate, FormulaLimits, Scope};
    use super::*;

    fn run(source: &str) -> Value {
        evaluate(source, &Scope::new(), &FormulaLimits::default()).unwrap()
    }

    #[test]
    fn loose_and_strict_equality() {
        assert_eq!(run("'5' == 5"), Value::Bool(true));
        assert_eq!(run("'5' === 5"), Value::Bool(false));
        assert_eq!(run("null == undefined"), Value::Bool(true));
        assert_eq!(run("null === undefined"), Value::Bool(false));
        assert_eq!(run("true == 1"), Value::Bool(true));
    }

    #[test]
    fn logical_operators_return_operands() {
        assert_eq!(run("0 || 'fallback'"), Value::from("fallback"));
        assert_eq!(run("'a' && 'b'"), Value::from("b"));
        assert_eq!(run("null ?? 3"), Value::Number(3.0));
        assert_eq!(run("0 ?? 3"), Value::Number(0.0));
    }

    #[test]
    fn string_comparison_is_lexicographic() {
        assert_eq!(run("'b' > 'a'"), Value::Bool(true));
        assert_eq!(run("'10' < 9"), Value::Bool(false));
    }

    #[test]
    fn math_helpers() {
        assert_eq!(run("Math.round(2.5)"), Value::Number(3.0));
        assert_eq!(run("Math.min(4, 2, 8)"), Value::Number(2.0));
        assert_eq!(run("Math.max()"), Value::Number(f64::NEG_INFINITY));
        assert_eq!(run("Math.pow(2, 10)"), Value::Number(1024.0));
        assert_eq!(run("Math.floor(Math.PI)"), Value::Number(3.0));
        let r = run("Math.random()").to_number();
        assert!((0.0..1.0).contains(&r));
    }

    #[test]
    fn global_conversions() {
        assert_eq!(run("parseFloat('3.5 °C')"), Value::Number(3.5));
        assert_eq!(run("parseInt('0x1f')"), Value::Number(31.0));
        assert_eq!(run("parseInt('101', 2)"), Value::Number(5.0));
        assert_eq!(run("String(12) + 1"), Value::from("121"));
        assert_eq!(run("Number('12') + 1"), Value::Number(13.0));
        assert_eq!(run("isNaN('abc')"), Value::Bool(true));
    }

    #[test]
    fn json_helpers() {
        assert_eq!(run("JSON.parse('{\"a\":[1,2]}').a[1]"), Value::Number(2.0));
        assert_eq!(run("JSON.stringify([1, 'x'])"), Value::from(r#"[1,"x"]"#));
        assert!(evaluate("JSON.parse('{')", &Scope::new(), &FormulaLimits::default()).is_err());
    }

    #[test]
    fn string_helpers() {
        assert_eq!(run("'abc'.length"), Value::Number(3.0));
        assert_eq!(run("'7'.padStart(3, '0')"), Value::from("007"));
        assert_eq!(run("'a,b,c'.split(',').join('|')"), Value::from("a|b|c"));
        assert_eq!(run("'Hello'.slice(-3)"), Value::from("llo"));
        assert_eq!(run("'Hello'.substring(4, 1)"), Value::from("ell"));
        assert_eq!(run("'Hello'.indexOf('l')"), Value::Number(2.0));
        assert_eq!(run("' x '.trim()"), Value::from("x"));
    }

    #[test]
    fn property_of_undefined_is_an_error() {
        let scope: Scope = [("a".to_string(), Value::Undefined)].into_iter().collect();
        let err = evaluate("a.b", &scope, &FormulaLimits::default()).unwrap_err();
        assert_eq!(
            err,
            FormulaError::InvalidAccess {
                property: "b".to_string(),
                target: "undefined"
            }
        );
    }

    #[test]
    fn arguments_shadow_nothing_callable() {
        let scope: Scope = [("f".to_string(), Value::from(1.0))].into_iter().collect();
        assert!(matches!(
            evaluate("f(1)", &scope, &FormulaLimits::default()),
            Err(FormulaError::NotCallable { .. })
        ));
    }

    #[test]
    fn oversized_padding_is_rejected() {
        let result = evaluate("'x'.padStart(1000000)", &Scope::new(), &FormulaLimits::default());
        assert!(matches!(result, Err(FormulaError::Argument { .. })));
    }

    #[test]
    fn radix_conversion() {
        assert_eq!(to_radix(255.0, 16), "ff");
        assert_eq!(to_radix(-5.0, 2), "-101");
        assert_eq!(to_radix(1.5, 16), "1.8");
        assert_eq!(to_radix(-0.75, 2), "-0.11");
        assert_eq!(to_radix(0.0, 16), "0");
        assert_eq!(to_radix(1e-300, 2), "0");
    }
}
