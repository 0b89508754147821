//! Compiled WHERE predicate
//!
//! Shunting-yard conversion to postfix, then stack evaluation per row.

use std::cmp::Ordering;

use super::tokenizer::{tokenize, CompareOp, ExprToken};
use crate::error::{DbError, Result};
use crate::types::{Row, Value};

/// Binding strength; comparisons reduce before any logical operator
fn precedence(token: &ExprToken) -> u8 {
    match token {
        ExprToken::Compare(_) => 4,
        ExprToken::Not => 3,
        ExprToken::And => 2,
        ExprToken::Or => 1,
        _ => 0,
    }
}

/// A WHERE expression in postfix order, ready to evaluate against rows
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    postfix: Vec<ExprToken>,
}

impl Predicate {
    /// Predicate that matches every row
    pub fn always() -> Self {
        Self {
            postfix: Vec::new(),
        }
    }

    /// Compile an optional clause; absent or blank matches everything
    pub fn compile_optional(expr: Option<&str>) -> Result<Self> {
        match expr {
            Some(text) => Self::compile(text),
            None => Ok(Self::always()),
        }
    }

    /// Tokenize and reorder `expr` into postfix
    ///
    /// Fails on unbalanced parentheses, and on groups with nothing inside
    /// them such as `()`. Blank text compiles to `always()`.
    pub fn compile(expr: &str) -> Result<Self> {
        let tokens = tokenize(expr)?;
        if tokens.is_empty() {
            return Ok(Self::always());
        }

        let mut output = Vec::new();
        let mut ops: Vec<ExprToken> = Vec::new();

        for token in tokens {
            match token {
                ExprToken::Literal(_) | ExprToken::Ident(_) => output.push(token),
                // Unary prefix: nothing to its left can be reduced yet
                ExprToken::Not | ExprToken::LParen => ops.push(token),
                ExprToken::Compare(_) | ExprToken::And | ExprToken::Or => {
                    let p = precedence(&token);
                    while let Some(top) = ops.last() {
                        if *top == ExprToken::LParen || precedence(top) < p {
                            break;
                        }
                        output.extend(ops.pop());
                    }
                    ops.push(token);
                }
                ExprToken::RParen => loop {
                    match ops.pop() {
                        Some(ExprToken::LParen) => break,
                        Some(op) => output.push(op),
                        None => {
                            return Err(DbError::Expression(
                                "unbalanced parentheses: unexpected ')'".to_string(),
                            ))
                        }
                    }
                },
            }
        }

        while let Some(op) = ops.pop() {
            if op == ExprToken::LParen {
                return Err(DbError::Expression(
                    "unbalanced parentheses: missing ')'".to_string(),
                ));
            }
            output.push(op);
        }

        if output.is_empty() {
            return Err(DbError::Expression(format!(
                "invalid WHERE expression: '{}' has no operands",
                expr.trim()
            )));
        }

        Ok(Self { postfix: output })
    }

    /// Whether the expression is blank (matches everything)
    pub fn is_always(&self) -> bool {
        self.postfix.is_empty()
    }

    /// Evaluate against one row; identifiers missing from the row are Null
    pub fn matches(&self, row: &Row) -> Result<bool> {
        if self.postfix.is_empty() {
            return Ok(true);
        }

        let mut stack: Vec<Value> = Vec::with_capacity(self.postfix.len());
        for token in &self.postfix {
            match token {
                ExprToken::Literal(value) => stack.push(value.clone()),
                ExprToken::Ident(name) => stack.push(row.value_of(name).clone()),
                ExprToken::Compare(op) => {
                    let (left, right) = pop_pair(&mut stack, op.as_str())?;
                    stack.push(Value::Bool(apply_compare(*op, &left, &right)?));
                }
                ExprToken::And => {
                    let (left, right) = pop_pair(&mut stack, "AND")?;
                    stack.push(Value::Bool(left.is_truthy() && right.is_truthy()));
                }
                ExprToken::Or => {
                    let (left, right) = pop_pair(&mut stack, "OR")?;
                    stack.push(Value::Bool(left.is_truthy() || right.is_truthy()));
                }
                ExprToken::Not => {
                    let operand = stack
                        .pop()
                        .ok_or_else(|| DbError::Expression("NOT without operand".to_string()))?;
                    stack.push(Value::Bool(!operand.is_truthy()));
                }
                ExprToken::LParen | ExprToken::RParen => {
                    return Err(DbError::Expression("stray parenthesis".to_string()))
                }
            }
        }

        if stack.len() != 1 {
            return Err(DbError::Expression(format!(
                "invalid WHERE expression: {} values left after evaluation",
                stack.len()
            )));
        }
        Ok(stack[0].is_truthy())
    }

    /// Keep the rows this predicate matches, in order
    pub fn filter(&self, rows: Vec<Row>) -> Result<Vec<Row>> {
        if self.is_always() {
            return Ok(rows);
        }
        let mut kept = Vec::with_capacity(rows.len());
        for row in rows {
            if self.matches(&row)? {
                kept.push(row);
            }
        }
        Ok(kept)
    }
}

fn pop_pair(stack: &mut Vec<Value>, op: &str) -> Result<(Value, Value)> {
    match (stack.pop(), stack.pop()) {
        (Some(right), Some(left)) => Ok((left, right)),
        _ => Err(DbError::Expression(format!("{} needs two operands", op))),
    }
}

/// Equality never fails; ordering of incomparable values does
fn apply_compare(op: CompareOp, left: &Value, right: &Value) -> Result<bool> {
    let ordering = left.compare(right);
    let result = match op {
        CompareOp::Eq => ordering == Some(Ordering::Equal),
        CompareOp::Ne => ordering != Some(Ordering::Equal),
        _ => {
            let ordering = ordering.ok_or_else(|| {
                DbError::Expression(format!(
                    "cannot compare {} '{}' with {} '{}' using {}",
                    left.kind(),
                    left,
                    right.kind(),
                    right,
                    op.as_str()
                ))
            })?;
            match op {
                CompareOp::Lt => ordering == Ordering::Less,
                CompareOp::Le => ordering != Ordering::Greater,
                CompareOp::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            }
        }
    };
    Ok(result)
}

/// Evaluate an optional WHERE text against one row
pub fn evaluate(expr: Option<&str>, row: &Row) -> Result<bool> {
    Predicate::compile_optional(expr)?.matches(row)
}
