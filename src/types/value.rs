//! Value definitions
//!
//! The closed set of values that flow between the parser, the evaluator and
//! storage, plus coercion into strict column types.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use super::ColumnType;
use crate::error::{DbError, Result};

/// Loosely-typed value as parsed from a statement or read from a row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent field (unknown column, missing identifier)
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Short name of the variant, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Boolean interpretation used by AND / OR / NOT
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Text(s) => !s.is_empty(),
        }
    }

    /// Compare two values of compatible kinds
    ///
    /// Int and Float compare numerically with each other. Returns `None` for
    /// pairings with no meaningful order (text vs number, bool vs int, ...).
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Total order for sorting: Null first, incomparable pairs tie
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            _ => self.compare(other).unwrap_or(Ordering::Equal),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            // Debug keeps a trailing ".0" on whole floats (20000.0, not 20000)
            Value::Float(v) => write!(f, "{:?}", v),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

const TRUE_WORDS: [&str; 5] = ["true", "1", "t", "yes", "y"];
const FALSE_WORDS: [&str; 5] = ["false", "0", "f", "no", "n"];

/// Coerce a value into the strict representation of `target`
///
/// Booleans are never accepted as numbers.
pub fn coerce(value: &Value, target: ColumnType) -> Result<Value> {
    match target {
        ColumnType::Int => coerce_int(value).map(Value::Int),
        ColumnType::Float => coerce_float(value).map(Value::Float),
        ColumnType::Text => coerce_text(value).map(Value::Text),
        ColumnType::Bool => coerce_bool(value).map(Value::Bool),
        ColumnType::Serial => Ok(value.clone()),
    }
}

fn mismatch(value: &Value, target: ColumnType) -> DbError {
    DbError::TypeMismatch(format!(
        "cannot store {} value '{}' in {} column",
        value.kind(),
        value,
        target
    ))
}

fn coerce_int(value: &Value) -> Result<i64> {
    match value {
        Value::Int(i) => Ok(*i),
        Value::Float(f) => {
            let truncated = f.trunc();
            if f.is_finite() && truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
                Ok(truncated as i64)
            } else {
                Err(mismatch(value, ColumnType::Int))
            }
        }
        Value::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| mismatch(value, ColumnType::Int)),
        Value::Bool(_) | Value::Null => Err(mismatch(value, ColumnType::Int)),
    }
}

fn coerce_float(value: &Value) -> Result<f64> {
    match value {
        Value::Int(i) => Ok(*i as f64),
        Value::Float(f) => Ok(*f),
        Value::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| mismatch(value, ColumnType::Float)),
        Value::Bool(_) | Value::Null => Err(mismatch(value, ColumnType::Float)),
    }
}

/// Render any non-null value as text
///
/// Booleans render lowercase (`true` / `false`), not capitalized. Floats keep
/// a fractional digit, so `20000` stored as FLOAT becomes `"20000.0"`.
fn coerce_text(value: &Value) -> Result<String> {
    match value {
        Value::Null => Err(mismatch(value, ColumnType::Text)),
        other => Ok(other.to_string()),
    }
}

fn coerce_bool(value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Int(i) => Ok(*i != 0),
        Value::Float(f) => Ok(*f != 0.0),
        Value::Text(s) => {
            let word = s.trim().to_ascii_lowercase();
            if TRUE_WORDS.contains(&word.as_str()) {
                Ok(true)
            } else if FALSE_WORDS.contains(&word.as_str()) {
                Ok(false)
            } else {
                Err(mismatch(value, ColumnType::Bool))
            }
        }
        Value::Null => Err(mismatch(value, ColumnType::Bool)),
    }
}
