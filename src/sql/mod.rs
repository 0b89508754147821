//! SQL Module
//!
//! Recognizes the statement subset MiniDB supports:
//!
//! ```text
//! CREATE TABLE name (col type, ...)
//! DROP TABLE name
//! DESCRIBE name
//! INSERT INTO name [(col, ...)] VALUES (v, ...)
//! SELECT col,...|* FROM name [WHERE expr] [ORDER BY col [ASC|DESC]] [LIMIT n] [OFFSET n]
//! UPDATE name SET col=v, ... [WHERE expr]
//! DELETE FROM name [WHERE expr]
//! ```
//!
//! Keywords are case-insensitive, identifiers keep their case. WHERE clauses
//! are kept as source text and compiled by `crate::expr`.

pub mod ast;
mod lexer;
mod parser;

pub use ast::{ColumnDef, OrderBy, Projection, SortDirection, Statement};
pub use lexer::{Lexer, Spanned, Token};
pub use parser::{parse, parse_literal, Parser};
