//! Template tokenizer: `{state;op1;op2(arg)}` → [`Binding`]

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use super::types::{split_channel, Binding, FormulaArg, Operation};
use crate::value::parse_float;

/// Maximum binding tokens processed per template
pub const MAX_TOKENS: usize = 50;

/// Shortest `{...}` run on a single line
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^\n]+?)\}").unwrap());

/// Formula head: `name:reference`
static FORMULA_HEAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w+:\s?[-\w.]+").unwrap());

/// Further formula argument: `name:reference`, nothing else
static FORMULA_ARG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w+:\s?[-.\w]+$").unwrap());

/// Operator: `name` or `name(arg)`
static OPERATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([\w\s/+*%\-]+)(\((.*)\))?").unwrap());

/// Extracts bindings from a raw template
pub trait BindingParser: Send + Sync {
    /// Ordered bindings of `template`, `None` when it has none
    fn parse(&self, template: &str) -> Option<Vec<Binding>>;
}

/// Default parser for the `{ref;op;op}` / `{a:ref;b:ref;formula}` grammar
#[derive(Debug, Clone)]
pub struct TokenParser {
    max_tokens: usize,
}

impl Default for TokenParser {
    fn default() -> Self {
        Self::new(MAX_TOKENS)
    }
}

impl TokenParser {
    pub fn new(max_tokens: usize) -> Self {
        Self { max_tokens }
    }
}

impl BindingParser for TokenParser {
    fn parse(&self, template: &str) -> Option<Vec<Binding>> {
        let candidates: Vec<_> = TOKEN_PATTERN.captures_iter(template).collect();
        if candidates.len() > self.max_tokens {
            warn!(
                template,
                count = candidates.len(),
                limit = self.max_tokens,
                "too many binding tokens, ignoring the rest"
            );
        }

        let bindings: Vec<Binding> = candidates
            .iter()
            .take(self.max_tokens)
            .filter_map(|caps| {
                let token = caps.get(0)?.as_str();
                let inner = caps.get(1)?.as_str();
                // `{{` escape or inline JSON
                if inner.starts_with('{') || inner.starts_with('"') {
                    return None;
                }
                Some(parse_token(token, inner, template))
            })
            .collect();

        if bindings.is_empty() {
            None
        } else {
            Some(bindings)
        }
    }
}

fn parse_token(token: &str, inner: &str, template: &str) -> Binding {
    let parts: Vec<&str> = inner.split(';').map(str::trim).collect();
    let head = parts[0];
    let rest = &parts[1..];

    if FORMULA_HEAD.is_match(head) || (head.is_empty() && !rest.is_empty()) {
        return parse_formula(token, head, rest, template);
    }

    let (state_ref, system_ref, is_seconds) = split_channel(head);
    Binding {
        state_ref,
        system_ref,
        token: token.to_string(),
        operations: rest
            .iter()
            .filter_map(|part| parse_operation(part, template))
            .collect(),
        format: template.to_string(),
        is_seconds,
    }
}

/// `{h:height;w:width;Math.max(h, w)}`
fn parse_formula(token: &str, head: &str, rest: &[&str], template: &str) -> Binding {
    let mut args: Vec<FormulaArg> = FormulaArg::parse(head).into_iter().collect();
    let mut formulas: Vec<String> = Vec::new();
    // args given after a formula still join the first eval; later evals copy
    // the args known when their formula appears
    let mut snapshots: Vec<usize> = Vec::new();

    for part in rest {
        if FORMULA_ARG.is_match(part) {
            if let Some(arg) = FormulaArg::parse(part) {
                args.push(arg);
            }
        } else {
            formulas.push(part.replace("::", ":"));
            snapshots.push(args.len());
        }
    }

    let operations = if formulas.is_empty() {
        vec![Operation::Eval {
            args: args.clone(),
            formula: None,
        }]
    } else {
        formulas
            .into_iter()
            .zip(snapshots)
            .enumerate()
            .map(|(i, (formula, known))| Operation::Eval {
                args: if i == 0 { args.clone() } else { args[..known].to_vec() },
                formula: Some(formula),
            })
            .collect()
    };

    let (state_ref, system_ref) = args
        .first()
        .map(|arg| (arg.state_ref.clone(), arg.system_ref.clone()))
        .unwrap_or_default();

    Binding {
        state_ref,
        system_ref,
        token: token.to_string(),
        operations,
        format: template.to_string(),
        is_seconds: false,
    }
}

fn parse_operation(part: &str, template: &str) -> Option<Operation> {
    let Some(caps) = OPERATOR.captures(part) else {
        return Some(Operation::Unknown(part.to_string()));
    };
    let name = caps.get(1).map_or("", |m| m.as_str()).trim();
    let arg = caps.get(3).map(|m| m.as_str().trim());

    let required = |arg: Option<&str>| -> Option<f64> {
        let Some(raw) = arg else {
            warn!(template, operator = name, "operator requires a numeric argument");
            return None;
        };
        numeric(raw, name, template)
    };
    let optional = |arg: Option<&str>| -> Option<Option<f64>> {
        match arg {
            None => Some(None),
            Some(raw) => numeric(raw, name, template).map(Some),
        }
    };

    let op = match name {
        "*" => Operation::Multiply(Some(required(arg)?)),
        "/" => Operation::Divide(Some(required(arg)?)),
        "+" => Operation::Add(Some(required(arg)?)),
        "-" => Operation::Subtract(Some(required(arg)?)),
        "%" => Operation::Remainder(Some(required(arg)?)),
        "min" => Operation::Min(Some(required(arg)?)),
        "max" => Operation::Max(Some(required(arg)?)),
        "round" => Operation::Round(optional(arg)?),
        "pow" => Operation::Pow(optional(arg)?),
        "random" => Operation::Random(optional(arg)?),
        "date" => Operation::Date(arg.unwrap_or_default().to_string()),
        "momentDate" => Operation::MomentDate(arg.unwrap_or_default().to_string()),
        "json" => Operation::Json(arg.unwrap_or_default().to_string()),
        "value" => Operation::Value(arg.unwrap_or("2").to_string()),
        "array" => Operation::Array(
            arg.map(|list| list.split(',').map(|item| item.trim().to_string()).collect())
                .unwrap_or_default(),
        ),
        "sqrt" => Operation::Sqrt,
        "hex" => Operation::Hex,
        "HEX" => Operation::HexUpper,
        "hex2" => Operation::Hex2,
        "HEX2" => Operation::Hex2Upper,
        "floor" => Operation::Floor,
        "ceil" => Operation::Ceil,
        other => Operation::Unknown(other.to_string()),
    };
    Some(op)
}

/// Numeric operator argument; the first `,` is a decimal comma
fn numeric(raw: &str, operator: &str, template: &str) -> Option<f64> {
    let n = parse_float(&raw.replacen(',', ".", 1));
    if n.is_nan() {
        warn!(template, operator, argument = raw, "non-numeric operator argument, operator dropped");
        return None;
    }
    Some(n)
}
