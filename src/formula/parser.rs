//! Formula parser (precedence climbing)

use super::lexer::{Tok, Token};
use super::FormulaError;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Coalesce,
}

/// Formula expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Ident(String),
    List(Vec<Expr>),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Member {
        object: Box<Expr>,
        property: String,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
}

enum Infix {
    Binary(BinaryOp),
    Logical(LogicalOp),
}

fn infix(punct: &str) -> Option<(u8, Infix)> {
    let entry = match punct {
        "||" => (1, Infix::Logical(LogicalOp::Or)),
        "??" => (1, Infix::Logical(LogicalOp::Coalesce)),
        "&&" => (2, Infix::Logical(LogicalOp::And)),
        "==" => (3, Infix::Binary(BinaryOp::Eq)),
        "!=" => (3, Infix::Binary(BinaryOp::NotEq)),
        "===" => (3, Infix::Binary(BinaryOp::StrictEq)),
        "!==" => (3, Infix::Binary(BinaryOp::StrictNotEq)),
        "<" => (4, Infix::Binary(BinaryOp::Lt)),
        "<=" => (4, Infix::Binary(BinaryOp::LtEq)),
        ">" => (4, Infix::Binary(BinaryOp::Gt)),
        ">=" => (4, Infix::Binary(BinaryOp::GtEq)),
        "+" => (5, Infix::Binary(BinaryOp::Add)),
        "-" => (5, Infix::Binary(BinaryOp::Sub)),
        "*" => (6, Infix::Binary(BinaryOp::Mul)),
        "/" => (6, Infix::Binary(BinaryOp::Div)),
        "%" => (6, Infix::Binary(BinaryOp::Rem)),
        _ => return None,
    };
    Some(entry)
}

pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Token>, max_depth: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            max_depth,
        }
    }

    pub(crate) fn parse(mut self) -> Result<Expr, FormulaError> {
        let expr = self.expression()?;
        match self.tokens.get(self.pos) {
            Some(token) => Err(FormulaError::UnexpectedToken {
                found: token.tok.to_string(),
                expected: "end of formula",
                position: token.position,
            }),
            None => Ok(expr),
        }
    }

    fn enter(&mut self) -> Result<(), FormulaError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(FormulaError::TooDeep {
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    fn peek_punct(&self) -> Option<&'static str> {
        match self.tokens.get(self.pos) {
            Some(Token {
                tok: Tok::Punct(p), ..
            }) => Some(*p),
            _ => None,
        }
    }

    fn eat(&mut self, punct: &str) -> bool {
        if self.peek_punct() == Some(punct) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, punct: &'static str) -> Result<(), FormulaError> {
        if self.eat(punct) {
            return Ok(());
        }
        Err(self.unexpected(punct))
    }

    fn unexpected(&self, expected: &'static str) -> FormulaError {
        match self.tokens.get(self.pos) {
            Some(token) => FormulaError::UnexpectedToken {
                found: token.tok.to_string(),
                expected,
                position: token.position,
            },
            None => FormulaError::UnexpectedEnd,
        }
    }

    fn expression(&mut self) -> Result<Expr, FormulaError> {
        self.enter()?;
        let test = self.binary(1)?;
        let expr = if self.eat("?") {
            let then = self.expression()?;
            self.expect(":")?;
            let otherwise = self.expression()?;
            Expr::Conditional {
                test: Box::new(test),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            }
        } else {
            test
        };
        self.depth -= 1;
        Ok(expr)
    }

    fn binary(&mut self, min_prec: u8) -> Result<Expr, FormulaError> {
        let mut left = self.unary()?;
        let depth_before = self.depth;

        while let Some((prec, op)) = self.peek_punct().and_then(infix) {
            if prec < min_prec {
                break;
            }
            self.pos += 1;
            // each link of a chain deepens the (left-leaning) tree
            self.enter()?;
            let right = self.binary(prec + 1)?;
            left = match op {
                Infix::Binary(op) => Expr::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                Infix::Logical(op) => Expr::Logical {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
        }

        self.depth = depth_before;
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, FormulaError> {
        let op = match self.peek_punct() {
            Some("-") => UnaryOp::Neg,
            Some("+") => UnaryOp::Plus,
            Some("!") => UnaryOp::Not,
            _ => return self.postfix(),
        };
        self.pos += 1;
        self.enter()?;
        let operand = self.unary()?;
        self.depth -= 1;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn postfix(&mut self) -> Result<Expr, FormulaError> {
        let mut expr = self.primary()?;
        let depth_before = self.depth;

        loop {
            if self.eat(".") {
                self.enter()?;
                let property = match self.tokens.get(self.pos) {
                    Some(Token {
                        tok: Tok::Ident(name),
                        ..
                    }) => name.clone(),
                    _ => return Err(self.unexpected("property name")),
                };
                self.pos += 1;
                expr = Expr::Member {
                    object: Box::new(expr),
                    property,
                };
            } else if self.eat("[") {
                self.enter()?;
                let index = self.expression()?;
                self.expect("]")?;
                expr = Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                };
            } else if self.eat("(") {
                self.enter()?;
                let args = self.list(")")?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                };
            } else {
                break;
            }
        }

        self.depth = depth_before;
        Ok(expr)
    }

    /// Comma-separated expressions up to `close` (already past the opener)
    fn list(&mut self, close: &'static str) -> Result<Vec<Expr>, FormulaError> {
        let mut items = Vec::new();
        if self.eat(close) {
            return Ok(items);
        }
        loop {
            items.push(self.expression()?);
            if self.eat(close) {
                return Ok(items);
            }
            if !self.eat(",") {
                return Err(self.unexpected(if close == ")" { "',' or ')'" } else { "',' or ']'" }));
            }
        }
    }

    fn primary(&mut self) -> Result<Expr, FormulaError> {
        let Some(token) = self.tokens.get(self.pos).cloned() else {
            return Err(FormulaError::UnexpectedEnd);
        };
        self.pos += 1;

        match token.tok {
            Tok::Number(n) => Ok(Expr::Literal(Value::Number(n))),
            Tok::Str(s) => Ok(Expr::Literal(Value::String(s))),
            Tok::Ident(name) => Ok(match name.as_str() {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "null" => Expr::Literal(Value::Null),
                "undefined" => Expr::Literal(Value::Undefined),
                "NaN" => Expr::Literal(Value::Number(f64::NAN)),
                "Infinity" => Expr::Literal(Value::Number(f64::INFINITY)),
                _ => Expr::Ident(name),
            }),
            Tok::Punct("(") => {
                let expr = self.expression()?;
                self.expect(")")?;
                Ok(expr)
            }
            Tok::Punct("[") => {
                self.enter()?;
                let items = self.list("]")?;
                self.depth -= 1;
                Ok(Expr::List(items))
            }
            other => Err(FormulaError::UnexpectedToken {
                found: other.to_string(),
                expected: "a value",
                position: token.position,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::lexer::tokenize;
    use super::*;

    fn parse(source: &str) -> Result<Expr, FormulaError> {
        Parser::new(tokenize(source).unwrap(), 64).parse()
    }

    fn num(n: f64) -> Box<Expr> {
        Box::new(Expr::Literal(Value::Number(n)))
    }

    #[test]
    fn multiplication_binds_tighter() {
        assert_eq!(
            parse("1 + 2 * 3").unwrap(),
            Expr::Binary {
                op: BinaryOp::Add,
                left: num(1.0),
                right: Box::new(Expr::Binary {
                    op: BinaryOp::Mul,
                    left: num(2.0),
                    right: num(3.0),
                }),
            }
        );
    }

    #[test]
    fn subtraction_is_left_associative() {
        assert_eq!(
            parse("5 - 2 - 1").unwrap(),
            Expr::Binary {
                op: BinaryOp::Sub,
                left: Box::new(Expr::Binary {
                    op: BinaryOp::Sub,
                    left: num(5.0),
                    right: num(2.0),
                }),
                right: num(1.0),
            }
        );
    }

    #[test]
    fn method_call_chain() {
        let expr = parse("Math.max(a, 1)").unwrap();
        let Expr::Call { callee, args } = expr else {
            panic!("expected call");
        };
        assert_eq!(args.len(), 2);
        assert_eq!(
            *callee,
            Expr::Member {
                object: Box::new(Expr::Ident("Math".to_string())),
                property: "max".to_string(),
            }
        );
    }

    #[test]
    fn nested_ternary() {
        let expr = parse("a ? 1 : b ? 2 : 3").unwrap();
        let Expr::Conditional { otherwise, .. } = expr else {
            panic!("expected conditional");
        };
        assert!(matches!(*otherwise, Expr::Conditional { .. }));
    }

    #[test]
    fn missing_closing_paren() {
        assert_eq!(parse("(1 + 2"), Err(FormulaError::UnexpectedEnd));
        assert!(matches!(
            parse("f(1 2)"),
            Err(FormulaError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn long_chains_count_towards_depth() {
        let chain = vec!["1"; 100].join("+");
        assert_eq!(parse(&chain), Err(FormulaError::TooDeep { limit: 64 }));
    }
}
