//! Type System Module
//!
//! Logical column types, the loosely-typed `Value` that statements and rows
//! carry, and the coercion rules between the two.
//!
//! ## Responsibilities
//! - Name the five column types and parse them from statement text
//! - Validate schemas (exactly one SERIAL `_id` column, unique names)
//! - Coerce parsed values into a column's strict type
//! - Define truthiness and ordering for WHERE / ORDER BY

mod row;
mod value;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DbError, Result};

pub use row::Row;
pub use value::{coerce, Value};

/// Name of the synthetic primary key column
pub const ID_COLUMN: &str = "_id";

/// Logical column types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    Int,
    Float,
    Text,
    Bool,
    /// Engine-managed identifier, never supplied by statements
    Serial,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Int => "INT",
            ColumnType::Float => "FLOAT",
            ColumnType::Text => "TEXT",
            ColumnType::Bool => "BOOL",
            ColumnType::Serial => "SERIAL",
        }
    }
}

impl FromStr for ColumnType {
    type Err = DbError;

    /// Case-insensitive: `int`, `Int` and `INT` all name the same type
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "INT" => Ok(ColumnType::Int),
            "FLOAT" => Ok(ColumnType::Float),
            "TEXT" => Ok(ColumnType::Text),
            "BOOL" => Ok(ColumnType::Bool),
            "SERIAL" => Ok(ColumnType::Serial),
            _ => Err(DbError::UnknownColumnType(s.to_string())),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, typed column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }

    /// Whether this is the engine-managed `_id` column
    pub fn is_id(&self) -> bool {
        self.name == ID_COLUMN
    }
}

/// Ordered columns bound to a table name
///
/// Serialized as `{"table": ..., "columns": [{"name": ..., "type": ...}]}`;
/// this is both the header blob on disk and the DESCRIBE payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub table: String,
    pub columns: Vec<Column>,
}

impl Schema {
    /// Build a schema from user-declared columns
    ///
    /// Prepends `_id SERIAL` unless the caller already declared it.
    pub fn new(table: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        let mut columns = columns;
        if !columns.iter().any(Column::is_id) {
            columns.insert(0, Column::new(ID_COLUMN, ColumnType::Serial));
        }

        let schema = Self {
            table: table.into(),
            columns,
        };
        schema.validate()?;
        Ok(schema)
    }

    /// Check the structural invariants of a schema
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        let mut id_count = 0;

        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(DbError::DuplicateColumn(column.name.clone()));
            }
            match (column.is_id(), column.column_type) {
                (true, ColumnType::Serial) => id_count += 1,
                (true, other) => {
                    return Err(DbError::InvalidSchema(format!(
                        "{} must be SERIAL, not {}",
                        ID_COLUMN, other
                    )))
                }
                (false, ColumnType::Serial) => {
                    return Err(DbError::InvalidSchema(format!(
                        "SERIAL is reserved for {}, column {} cannot use it",
                        ID_COLUMN, column.name
                    )))
                }
                (false, _) => {}
            }
        }

        if id_count != 1 {
            return Err(DbError::InvalidSchema(format!(
                "schema must contain exactly one {} column",
                ID_COLUMN
            )));
        }
        Ok(())
    }

    /// Look up a column by name (case-sensitive)
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns that carry a stored value, in schema order (everything but `_id`)
    pub fn data_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.is_id())
    }

    /// Number of columns that carry a stored value
    pub fn data_column_count(&self) -> usize {
        self.data_columns().count()
    }
}
