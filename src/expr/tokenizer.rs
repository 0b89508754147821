//! WHERE tokenizer
//!
//! Splits an expression into parentheses, operators, logical keywords,
//! literals and identifiers, skipping whitespace.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{DbError, Result};
use crate::types::Value;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

/// A WHERE token
#[derive(Debug, Clone, PartialEq)]
pub enum ExprToken {
    LParen,
    RParen,
    Compare(CompareOp),
    And,
    Or,
    Not,
    Literal(Value),
    /// Column reference, resolved against the row at evaluation time
    Ident(String),
}

/// Tokenize a WHERE expression
pub fn tokenize(expr: &str) -> Result<Vec<ExprToken>> {
    let mut chars = expr.chars().peekable();
    let mut tokens = Vec::new();

    while let Some(&c) = chars.peek() {
        let token = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '(' => {
                chars.next();
                ExprToken::LParen
            }
            ')' => {
                chars.next();
                ExprToken::RParen
            }
            '=' | '!' | '<' | '>' => scan_operator(&mut chars)?,
            '\'' | '"' => scan_string(&mut chars, c)?,
            '-' => scan_number(&mut chars)?,
            c if c.is_ascii_digit() => scan_number(&mut chars)?,
            c if c.is_ascii_alphabetic() || c == '_' => scan_word(&mut chars),
            other => {
                return Err(DbError::Expression(format!(
                    "unexpected character {:?} in WHERE clause",
                    other
                )))
            }
        };
        tokens.push(token);
    }

    Ok(tokens)
}

fn scan_operator(chars: &mut Peekable<Chars<'_>>) -> Result<ExprToken> {
    let first = chars.next().unwrap_or_default();
    let has_eq = chars.next_if_eq(&'=').is_some();

    let op = match (first, has_eq) {
        ('=', false) => CompareOp::Eq,
        ('!', true) => CompareOp::Ne,
        ('<', false) => CompareOp::Lt,
        ('<', true) => CompareOp::Le,
        ('>', false) => CompareOp::Gt,
        ('>', true) => CompareOp::Ge,
        ('=', true) => {
            return Err(DbError::Expression("unknown operator '=='".to_string()))
        }
        _ => return Err(DbError::Expression(format!("unknown operator '{}'", first))),
    };
    Ok(ExprToken::Compare(op))
}

fn scan_string(chars: &mut Peekable<Chars<'_>>, quote: char) -> Result<ExprToken> {
    chars.next();
    let mut value = String::new();
    loop {
        match chars.next() {
            Some(c) if c == quote => {
                if chars.next_if_eq(&quote).is_some() {
                    value.push(quote);
                } else {
                    return Ok(ExprToken::Literal(Value::Text(value)));
                }
            }
            Some(c) => value.push(c),
            None => {
                return Err(DbError::Expression(
                    "unterminated string in WHERE clause".to_string(),
                ))
            }
        }
    }
}

/// `-?\d+(\.\d+)?`: integer without a decimal point, float with one
fn scan_number(chars: &mut Peekable<Chars<'_>>) -> Result<ExprToken> {
    let mut text = String::new();
    if let Some(minus) = chars.next_if_eq(&'-') {
        text.push(minus);
    }
    while let Some(d) = chars.next_if(|c| c.is_ascii_digit()) {
        text.push(d);
    }
    if text.is_empty() || text == "-" {
        return Err(DbError::Expression("'-' must be followed by a number".to_string()));
    }

    let mut lookahead = chars.clone();
    if lookahead.next() == Some('.') && matches!(lookahead.next(), Some(d) if d.is_ascii_digit()) {
        chars.next();
        text.push('.');
        while let Some(d) = chars.next_if(|c| c.is_ascii_digit()) {
            text.push(d);
        }
        let value = text
            .parse()
            .map_err(|_| DbError::Expression(format!("invalid number {}", text)))?;
        return Ok(ExprToken::Literal(Value::Float(value)));
    }

    let value = text
        .parse()
        .map_err(|_| DbError::Expression(format!("integer out of range: {}", text)))?;
    Ok(ExprToken::Literal(Value::Int(value)))
}

fn scan_word(chars: &mut Peekable<Chars<'_>>) -> ExprToken {
    let mut word = String::new();
    while let Some(c) = chars.next_if(|c| c.is_ascii_alphanumeric() || *c == '_') {
        word.push(c);
    }

    match word.to_ascii_uppercase().as_str() {
        "AND" => ExprToken::And,
        "OR" => ExprToken::Or,
        "NOT" => ExprToken::Not,
        "TRUE" => ExprToken::Literal(Value::Bool(true)),
        "FALSE" => ExprToken::Literal(Value::Bool(false)),
        _ => ExprToken::Ident(word),
    }
}
