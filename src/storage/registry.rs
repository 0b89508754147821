//! Table Registry
//!
//! Maps table names to shared handles so every statement on a table goes
//! through the same lock.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use super::Table;
use crate::config::SyncStrategy;
use crate::error::{DbError, Result};
use crate::types::Schema;

/// Registry of open tables under one data directory
///
/// ## Concurrency:
/// - `tables`: RwLock, readers share lookups, create/drop take it exclusively
/// - handles are `Arc<Table>`; a dropped table's handle is evicted first
pub struct TableRegistry {
    /// Directory holding `table_<name>.db` files
    data_dir: PathBuf,

    /// Sync strategy handed to every table
    sync_strategy: SyncStrategy,

    /// Open handles, keyed by table name
    tables: RwLock<HashMap<String, Arc<Table>>>,
}

impl TableRegistry {
    /// Create a registry rooted at `data_dir` (created if missing)
    pub fn new(data_dir: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        fs::create_dir_all(data_dir)?;
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            sync_strategy,
            tables: RwLock::new(HashMap::new()),
        })
    }

    /// Create a table file and register its handle
    pub fn create(&self, schema: Schema) -> Result<Arc<Table>> {
        let path = self.table_path(&schema.table)?;
        let mut tables = self.tables.write();

        let name = schema.table.clone();
        let table = Arc::new(Table::create(&path, schema, self.sync_strategy)?);
        tables.insert(name, Arc::clone(&table));
        Ok(table)
    }

    /// Get the handle for `name`, opening the file on first use
    pub fn open(&self, name: &str) -> Result<Arc<Table>> {
        let path = self.table_path(name)?;

        if let Some(table) = self.tables.read().get(name) {
            if table.path().exists() {
                return Ok(Arc::clone(table));
            }
        }

        let mut tables = self.tables.write();
        // Another thread may have opened it while we waited
        if let Some(table) = tables.get(name) {
            if table.path().exists() {
                return Ok(Arc::clone(table));
            }
        }
        evict(&mut tables, name);

        if !path.exists() {
            return Err(DbError::TableNotFound(name.to_string()));
        }

        let table = Arc::new(Table::open(&path, self.sync_strategy)?);
        tables.insert(name.to_string(), Arc::clone(&table));
        Ok(table)
    }

    /// Evict the handle and remove the table file
    pub fn drop_table(&self, name: &str) -> Result<()> {
        let path = self.table_path(name)?;
        let mut tables = self.tables.write();

        if !path.exists() {
            evict(&mut tables, name);
            return Err(DbError::TableNotFound(name.to_string()));
        }

        match tables.remove(name) {
            Some(table) => {
                // Wait out any statement still running on this table
                let _guard = table.lock();
                table.mark_dropped();
                Table::destroy(&path)
            }
            None => Table::destroy(&path),
        }
    }

    /// Whether a table file exists for `name`
    pub fn exists(&self, name: &str) -> bool {
        self.table_path(name).map(|p| p.exists()).unwrap_or(false)
    }

    /// File path for a table name
    pub fn table_path(&self, name: &str) -> Result<PathBuf> {
        if !is_valid_table_name(name) {
            return Err(DbError::InvalidSchema(format!("invalid table name: {:?}", name)));
        }
        Ok(self.data_dir.join(format!("table_{}.db", name)))
    }

    /// Number of cached handles (for testing and debugging)
    pub fn cached_count(&self) -> usize {
        self.tables.read().len()
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Forget the cached handle for `name` and invalidate it
fn evict(tables: &mut HashMap<String, Arc<Table>>, name: &str) {
    if let Some(table) = tables.remove(name) {
        let _guard = table.lock();
        table.mark_dropped();
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`, the identifier shape the parser accepts
fn is_valid_table_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
