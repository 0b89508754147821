//! Statement AST

use crate::types::Value;

/// A parsed statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `CREATE TABLE name (col type, ...)`
    CreateTable {
        name: String,
        columns: Vec<ColumnDef>,
    },

    /// `DROP TABLE name`
    DropTable { name: String },

    /// `DESCRIBE name`
    Describe { name: String },

    /// `INSERT INTO name [(col, ...)] VALUES (v, ...)`
    Insert {
        table: String,
        /// `None` for the positional form
        columns: Option<Vec<String>>,
        values: Vec<Value>,
    },

    /// `SELECT cols|* FROM name [WHERE ..] [ORDER BY ..] [LIMIT n] [OFFSET n]`
    Select {
        table: String,
        projection: Projection,
        where_clause: Option<String>,
        order_by: Option<OrderBy>,
        limit: Option<usize>,
        offset: Option<usize>,
    },

    /// `UPDATE name SET col=v, ... [WHERE ..]`
    Update {
        table: String,
        assignments: Vec<(String, Value)>,
        where_clause: Option<String>,
    },

    /// `DELETE FROM name [WHERE ..]`
    Delete {
        table: String,
        where_clause: Option<String>,
    },
}

/// Column definition in CREATE TABLE; the type name is resolved by the engine
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub type_name: String,
}

/// SELECT column list
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    All,
    Columns(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}
