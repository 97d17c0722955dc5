//! Binding descriptors produced by a [`BindingParser`](super::BindingParser)

use serde::{Deserialize, Serialize};

/// Channel suffixes of a state reference
pub const CHANNELS: &[&str] = &["val", "ts", "lc", "ack", "from"];

/// One `{...}` token of a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    /// Reference with channel suffix (`hall.temp.val`)
    pub state_ref: String,
    /// Reference without channel suffix (`hall.temp`)
    pub system_ref: String,
    /// Exact text replaced in the template, braces included
    pub token: String,
    #[serde(default)]
    pub operations: Vec<Operation>,
    /// Raw template the binding was parsed from
    pub format: String,
    /// `.ts` / `.lc` channels hold timestamps
    #[serde(default)]
    pub is_seconds: bool,
}

/// Named formula argument: `name:reference`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulaArg {
    pub name: String,
    pub state_ref: String,
    pub system_ref: String,
}

impl FormulaArg {
    /// Parse `h:hall.height` (whitespace after the colon allowed)
    pub fn parse(part: &str) -> Option<Self> {
        let (name, reference) = part.split_once(':')?;
        let (state_ref, system_ref, _) = split_channel(reference.trim());
        Some(Self {
            name: name.trim().to_string(),
            state_ref,
            system_ref,
        })
    }
}

/// Operator applied to a resolved value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "arg", rename_all = "camelCase")]
pub enum Operation {
    Eval {
        args: Vec<FormulaArg>,
        formula: Option<String>,
    },
    #[serde(rename = "*")]
    Multiply(Option<f64>),
    #[serde(rename = "/")]
    Divide(Option<f64>),
    #[serde(rename = "+")]
    Add(Option<f64>),
    #[serde(rename = "-")]
    Subtract(Option<f64>),
    #[serde(rename = "%")]
    Remainder(Option<f64>),
    Round(Option<f64>),
    Pow(Option<f64>),
    Sqrt,
    Hex,
    #[serde(rename = "HEX")]
    HexUpper,
    Hex2,
    #[serde(rename = "HEX2")]
    Hex2Upper,
    /// Decimal count and optional separator pair
    Value(String),
    Array(Vec<String>),
    Date(String),
    MomentDate(String),
    Min(Option<f64>),
    Max(Option<f64>),
    Random(Option<f64>),
    Floor,
    Ceil,
    /// Property path into a JSON document
    Json(String),
    Unknown(String),
}

impl Operation {
    /// Operator name as written in templates
    pub fn name(&self) -> &str {
        match self {
            Operation::Eval { .. } => "eval",
            Operation::Multiply(_) => "*",
            Operation::Divide(_) => "/",
            Operation::Add(_) => "+",
            Operation::Subtract(_) => "-",
            Operation::Remainder(_) => "%",
            Operation::Round(_) => "round",
            Operation::Pow(_) => "pow",
            Operation::Sqrt => "sqrt",
            Operation::Hex => "hex",
            Operation::HexUpper => "HEX",
            Operation::Hex2 => "hex2",
            Operation::Hex2Upper => "HEX2",
            Operation::Value(_) => "value",
            Operation::Array(_) => "array",
            Operation::Date(_) => "date",
            Operation::MomentDate(_) => "momentDate",
            Operation::Min(_) => "min",
            Operation::Max(_) => "max",
            Operation::Random(_) => "random",
            Operation::Floor => "floor",
            Operation::Ceil => "ceil",
            Operation::Json(_) => "json",
            Operation::Unknown(name) => name,
        }
    }
}

/// Split a reference into `(state_ref, system_ref, is_seconds)`
///
/// A reference without a known channel suffix reads the `.val` channel.
pub fn split_channel(reference: &str) -> (String, String, bool) {
    match reference.rsplit_once('.') {
        Some((base, channel)) if CHANNELS.contains(&channel) => (
            reference.to_string(),
            base.to_string(),
            channel == "ts" || channel == "lc",
        ),
        _ => (format!("{}.val", reference), reference.to_string(), false),
    }
}
