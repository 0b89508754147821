//! Engine Module
//!
//! The query engine that turns statement text into table operations.
//!
//! ## Responsibilities
//! - Parse statements and dispatch them to table storage
//! - Apply WHERE, ORDER BY, OFFSET/LIMIT and projection for SELECT
//! - Type-check INSERT values and UPDATE assignments against the schema
//! - Convert every failure into an error result at the statement boundary

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::error::{DbError, Result};
use crate::expr::Predicate;
use crate::protocol::{QueryResult, ResultData};
use crate::sql::{self, ColumnDef, OrderBy, Projection, SortDirection, Statement};
use crate::storage::TableRegistry;
use crate::types::{coerce, Column, ColumnType, Row, Schema, Value, ID_COLUMN};

/// The query engine
///
/// ## Concurrency Model
///
/// - The engine itself keeps no per-statement state; `execute` takes `&self`
///   and may be called from any number of session threads.
/// - Each table is guarded by its own re-entrant lock (see `storage`).
///   UPDATE and DELETE hold that lock for the whole statement, so the rows
///   they match cannot change underneath them.
/// - Statements on different tables never contend.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Open table handles under `config.data_dir`
    tables: TableRegistry,
}

impl Engine {
    /// Open an engine over the configured data directory
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.data_dir)?;

        let tables = TableRegistry::new(&config.data_dir, config.sync_strategy)?;

        tracing::info!("Engine opened at {}", config.data_dir.display());
        Ok(Self { config, tables })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Execute one statement
    ///
    /// Never fails: errors come back as `{status: "error", message}`.
    pub fn execute(&self, sql: &str) -> QueryResult {
        match sql::parse(sql).and_then(|statement| self.execute_statement(statement)) {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!("Statement failed: {} ({})", sql.trim(), e);
                QueryResult::error(e.to_string())
            }
        }
    }

    /// Execute an already-parsed statement
    pub fn execute_statement(&self, statement: Statement) -> Result<QueryResult> {
        match statement {
            Statement::CreateTable { name, columns } => self.create_table(&name, columns),
            Statement::DropTable { name } => self.drop_table(&name),
            Statement::Describe { name } => self.describe(&name),
            Statement::Insert {
                table,
                columns,
                values,
            } => self.insert(&table, columns, values),
            Statement::Select {
                table,
                projection,
                where_clause,
                order_by,
                limit,
                offset,
            } => self.select(
                &table,
                projection,
                where_clause.as_deref(),
                order_by,
                limit,
                offset,
            ),
            Statement::Update {
                table,
                assignments,
                where_clause,
            } => self.update(&table, assignments, where_clause.as_deref()),
            Statement::Delete {
                table,
                where_clause,
            } => self.delete(&table, where_clause.as_deref()),
        }
    }

    // =========================================================================
    // DDL
    // =========================================================================

    fn create_table(&self, name: &str, defs: Vec<ColumnDef>) -> Result<QueryResult> {
        let mut columns = Vec::with_capacity(defs.len());
        for def in defs {
            let column_type: ColumnType = def.type_name.parse()?;
            columns.push(Column::new(def.name, column_type));
        }
        let schema = Schema::new(name, columns)?;

        if self.tables.exists(name) {
            return Err(DbError::TableAlreadyExists(name.to_string()));
        }
        self.tables.create(schema)?;

        Ok(QueryResult::message(format!("Table {} created", name)))
    }

    fn drop_table(&self, name: &str) -> Result<QueryResult> {
        self.tables.drop_table(name)?;
        Ok(QueryResult::message(format!("Table {} dropped", name)))
    }

    fn describe(&self, name: &str) -> Result<QueryResult> {
        let table = self.tables.open(name)?;
        Ok(QueryResult::ok(Some(ResultData::Schema(table.describe()?))))
    }

    // =========================================================================
    // DML
    // =========================================================================

    fn insert(
        &self,
        name: &str,
        columns: Option<Vec<String>>,
        values: Vec<Value>,
    ) -> Result<QueryResult> {
        let table = self.tables.open(name)?;
        let schema = table.schema();

        let by_column: HashMap<String, Value> = match columns {
            None => {
                let expected = schema.data_column_count();
                if expected != values.len() {
                    return Err(DbError::Parse(format!(
                        "table {} expects {} values, got {}",
                        name,
                        expected,
                        values.len()
                    )));
                }
                schema
                    .data_columns()
                    .map(|c| c.name.clone())
                    .zip(values)
                    .collect()
            }
            Some(names) => names.into_iter().zip(values).collect(),
        };

        let row = table.insert(&by_column)?;
        Ok(QueryResult::ok(Some(ResultData::Row(row))))
    }

    fn select(
        &self,
        name: &str,
        projection: Projection,
        where_clause: Option<&str>,
        order_by: Option<OrderBy>,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<QueryResult> {
        let table = self.tables.open(name)?;
        let predicate = Predicate::compile_optional(where_clause)?;

        let mut rows = predicate.filter(table.read_all()?)?;

        if let Some(order) = order_by {
            // sort_by is stable, so ties keep scan order in both directions
            rows.sort_by(|a, b| {
                let ordering = a.value_of(&order.column).sort_cmp(b.value_of(&order.column));
                match order.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        let window = rows
            .into_iter()
            .skip(offset.unwrap_or(0))
            .take(limit.unwrap_or(usize::MAX));

        let rows: Vec<Row> = match projection {
            Projection::All => window.collect(),
            Projection::Columns(columns) => window.map(|row| row.project(&columns)).collect(),
        };

        Ok(QueryResult::ok(Some(ResultData::Rows(rows))))
    }

    fn update(
        &self,
        name: &str,
        assignments: Vec<(String, Value)>,
        where_clause: Option<&str>,
    ) -> Result<QueryResult> {
        let table = self.tables.open(name)?;
        let predicate = Predicate::compile_optional(where_clause)?;

        let mut typed = HashMap::with_capacity(assignments.len());
        for (column, value) in assignments {
            let column_type = self.assignable_type(table.schema(), &column)?;
            let value = coerce(&value, column_type)?;
            typed.insert(column, value);
        }

        let _guard = table.lock();
        let targets = predicate.filter(table.read_all()?)?;

        let mut updated = Vec::with_capacity(targets.len());
        for row in &targets {
            let id = row
                .id()
                .ok_or_else(|| DbError::InvalidId("row without _id".to_string()))?;
            updated.push(table.update(id, &typed)?);
        }

        tracing::debug!("Updated {} rows in {}", updated.len(), name);
        Ok(
            QueryResult::message(format!("{} row(s) updated", updated.len()))
                .with_data(ResultData::Rows(updated)),
        )
    }

    fn delete(&self, name: &str, where_clause: Option<&str>) -> Result<QueryResult> {
        let table = self.tables.open(name)?;
        let predicate = Predicate::compile_optional(where_clause)?;

        let _guard = table.lock();
        let targets = predicate.filter(table.read_all()?)?;

        for row in &targets {
            let id = row
                .id()
                .ok_or_else(|| DbError::InvalidId("row without _id".to_string()))?;
            table.delete(id)?;
        }

        tracing::debug!("Deleted {} rows from {}", targets.len(), name);
        Ok(
            QueryResult::message(format!("{} row(s) deleted", targets.len()))
                .with_data(ResultData::Count {
                    count: targets.len(),
                }),
        )
    }

    /// Type of a column an UPDATE may assign
    fn assignable_type(&self, schema: &Schema, column: &str) -> Result<ColumnType> {
        if column == ID_COLUMN {
            return Err(DbError::TypeMismatch(format!(
                "{} is SERIAL and assigned by the engine",
                ID_COLUMN
            )));
        }
        schema
            .column(column)
            .map(|c| c.column_type)
            .ok_or_else(|| DbError::UnknownColumn(column.to_string()))
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the table registry
    pub fn tables(&self) -> &TableRegistry {
        &self.tables
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
