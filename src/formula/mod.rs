//! Restricted formula language for `eval` bindings
//!
//! `{h:height;w:width;Math.max(20, h + w)}` binds `h` and `w` to live
//! states and evaluates the formula text. Formulas are parsed into an AST
//! over a small fixed grammar and evaluated against the named arguments
//! only; nothing outside the scope map is reachable.
//!
//! Grammar (lowest to highest precedence):
//! ```text
//! ternary     a ? b : c
//! logical     ||  ??  &&
//! equality    == != === !==
//! relational  < <= > >=
//! additive    + -
//! product     * / %
//! unary       - + !
//! postfix     a.b  a[i]  f(x)
//! primary     number  'string'  "string"  [list]  name  (expr)
//! ```
//!
//! Every evaluated node costs one step; the step budget and nesting depth
//! are bounded by [`FormulaLimits`].

mod eval;
mod lexer;
mod parser;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::Value;

pub use parser::{BinaryOp, Expr, LogicalOp, UnaryOp};

/// Named arguments visible to a formula
pub type Scope = BTreeMap<String, Value>;

/// Resource limits for a single formula evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormulaLimits {
    /// Maximum evaluated nodes (including helper work)
    pub max_steps: usize,
    /// Maximum nesting depth while parsing and evaluating
    pub max_depth: usize,
}

impl Default for FormulaLimits {
    fn default() -> Self {
        Self {
            max_steps: 10_000,
            max_depth: 64,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedChar { ch: char, position: usize },

    #[error("unterminated string starting at position {position}")]
    UnterminatedString { position: usize },

    #[error("unexpected {found} at position {position}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
        position: usize,
    },

    #[error("unexpected end of formula")]
    UnexpectedEnd,

    #[error("formula nesting exceeds {limit} levels")]
    TooDeep { limit: usize },

    #[error("'{name}' is not defined")]
    UnknownIdentifier { name: String },

    #[error("'{name}' is not a function")]
    NotCallable { name: String },

    #[error("cannot read property '{property}' of {target}")]
    InvalidAccess {
        property: String,
        target: &'static str,
    },

    #[error("formula exceeded the step budget of {limit}")]
    StepBudget { limit: usize },

    #[error("{function}: {reason}")]
    Argument { function: String, reason: String },
}

/// Parse formula text into an expression tree
pub fn parse(source: &str, limits: &FormulaLimits) -> Result<Expr, FormulaError> {
    let tokens = lexer::tokenize(source)?;
    parser::Parser::new(tokens, limits.max_depth).parse()
}

/// Parse and evaluate `source` against `scope`
pub fn evaluate(source: &str, scope: &Scope, limits: &FormulaLimits) -> Result<Value, FormulaError> {
    let expr = parse(source, limits)?;
    eval::Evaluator::new(scope, *limits).eval(&expr, 0)
}
