//! Formula tokenizer

use std::fmt;

use super::FormulaError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Tok {
    Number(f64),
    Str(String),
    Ident(String),
    Punct(&'static str),
}

impl fmt::Display for Tok {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tok::Number(n) => write!(f, "number {}", n),
            Tok::Str(s) => write!(f, "string '{}'", s),
            Tok::Ident(name) => write!(f, "'{}'", name),
            Tok::Punct(p) => write!(f, "'{}'", p),
        }
    }
}

/// Token with its character offset in the source
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub tok: Tok,
    pub position: usize,
}

/// Longest first, so `===` wins over `==` and `=`
const PUNCTUATION: &[&str] = &[
    "===", "!==", "==", "!=", "<=", ">=", "&&", "||", "??", "+", "-", "*", "/", "%", "<", ">",
    "!", "?", ":", "(", ")", "[", "]", ",", ".",
];

pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, FormulaError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];

        if ch.is_whitespace() {
            i += 1;
            continue;
        }

        // trailing statement terminator is tolerated
        if ch == ';' && chars[i + 1..].iter().all(|c| c.is_whitespace()) {
            break;
        }

        let start = i;

        if ch.is_ascii_digit()
            || (ch == '.' && chars.get(i + 1).is_some_and(char::is_ascii_digit))
        {
            i = scan_number(&chars, i);
            let text: String = chars[start..i].iter().collect();
            let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
                Some(hex) => u64::from_str_radix(hex, 16).ok().map(|n| n as f64),
                None => text.parse::<f64>().ok(),
            };
            let n = parsed.ok_or(FormulaError::UnexpectedChar { ch, position: start })?;
            tokens.push(Token {
                tok: Tok::Number(n),
                position: start,
            });
            continue;
        }

        if ch == '\'' || ch == '"' {
            let (text, end) = scan_string(&chars, i)?;
            tokens.push(Token {
                tok: Tok::Str(text),
                position: start,
            });
            i = end;
            continue;
        }

        if ch.is_alphabetic() || ch == '_' || ch == '$' {
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '$') {
                i += 1;
            }
            tokens.push(Token {
                tok: Tok::Ident(chars[start..i].iter().collect()),
                position: start,
            });
            continue;
        }

        let punct = PUNCTUATION.iter().find(|p| {
            p.chars()
                .enumerate()
                .all(|(k, pc)| chars.get(i + k) == Some(&pc))
        });
        match punct {
            Some(&p) => {
                tokens.push(Token {
                    tok: Tok::Punct(p),
                    position: start,
                });
                i += p.len();
            }
            None => return Err(FormulaError::UnexpectedChar { ch, position: start }),
        }
    }

    Ok(tokens)
}

fn scan_number(chars: &[char], mut i: usize) -> usize {
    if chars[i] == '0' && matches!(chars.get(i + 1), Some('x' | 'X')) {
        i += 2;
        while i < chars.len() && chars[i].is_ascii_hexdigit() {
            i += 1;
        }
        return i;
    }
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    if i < chars.len() && chars[i] == '.' && chars.get(i + 1).is_some_and(char::is_ascii_digit) {
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < chars.len() && matches!(chars[i], 'e' | 'E') {
        let mut j = i + 1;
        if j < chars.len() && matches!(chars[j], '+' | '-') {
            j += 1;
        }
        if j < chars.len() && chars[j].is_ascii_digit() {
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    i
}

fn scan_string(chars: &[char], start: usize) -> Result<(String, usize), FormulaError> {
    let quote = chars[start];
    let mut text = String::new();
    let mut i = start + 1;

    while i < chars.len() {
        match chars[i] {
            c if c == quote => return Ok((text, i + 1)),
            '\\' => {
                let escaped = chars
                    .get(i + 1)
                    .ok_or(FormulaError::UnterminatedString { position: start })?;
                text.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => *other,
                });
                i += 2;
            }
            c => {
                text.push(c);
                i += 1;
            }
        }
    }

    Err(FormulaError::UnterminatedString { position: start })
}
