//! Table implementation
//!
//! One append-only file per table, guarded by a re-entrant lock.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use uuid::Uuid;

use super::EntryReader;
use crate::config::SyncStrategy;
use crate::error::{DbError, Result};
use crate::format::{encode_entry, read_header, write_header, StoredEntry};
use crate::types::{coerce, Row, Schema, Value, ID_COLUMN};

/// Parse a user-supplied `_id` (32 hex digits, hyphens optional)
pub fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id.trim()).map_err(|_| DbError::InvalidId(id.to_string()))
}

/// A table backed by an append-only file
///
/// ## Concurrency:
/// - `lock`: re-entrant, held for the duration of every public operation
/// - `schema` and `data_offset` are fixed at open and never change
/// - `dropped`: set once under `lock`; every later operation fails with
///   `TableNotFound`, even if a new file appears at `path`
pub struct Table {
    /// Table file path
    path: PathBuf,

    /// Schema parsed from (or written to) the header
    schema: Schema,

    /// Offset of the first entry
    data_offset: u64,

    /// How each append is pushed to disk
    sync_strategy: SyncStrategy,

    /// Serializes all reads and writes on this table
    lock: ReentrantMutex<()>,

    /// Set when the table is dropped through the registry
    dropped: AtomicBool,
}

impl Table {
    /// Create a new table file holding only the header
    ///
    /// Fails with `TableAlreadyExists` if the file is already there.
    pub fn create(path: &Path, schema: Schema, sync_strategy: SyncStrategy) -> Result<Self> {
        schema.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => DbError::TableAlreadyExists(schema.table.clone()),
                _ => DbError::Io(e),
            })?;

        let data_offset = write_header(&mut file, &schema)?;
        file.flush()?;
        file.sync_all()?;

        tracing::info!(
            "Created table {} ({} columns) at {}",
            schema.table,
            schema.columns.len(),
            path.display()
        );

        Ok(Self {
            path: path.to_path_buf(),
            schema,
            data_offset,
            sync_strategy,
            lock: ReentrantMutex::new(()),
            dropped: AtomicBool::new(false),
        })
    }

    /// Open an existing table file and cache its schema
    pub fn open(path: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => DbError::TableNotFound(path.display().to_string()),
            _ => DbError::Io(e),
        })?;

        let (schema, data_offset) = read_header(&mut BufReader::new(file))?;

        tracing::debug!(
            "Opened table {} (data offset {}) from {}",
            schema.table,
            data_offset,
            path.display()
        );

        Ok(Self {
            path: path.to_path_buf(),
            schema,
            data_offset,
            sync_strategy,
            lock: ReentrantMutex::new(()),
            dropped: AtomicBool::new(false),
        })
    }

    /// Remove a table file entirely (no tombstoning)
    pub fn destroy(path: &Path) -> Result<()> {
        fs::remove_file(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => DbError::TableNotFound(path.display().to_string()),
            _ => DbError::Io(e),
        })?;
        tracing::info!("Removed table file {}", path.display());
        Ok(())
    }

    /// Take the table lock for a multi-step operation
    ///
    /// Re-entrant: the public operations can still be called while held.
    pub fn lock(&self) -> ReentrantMutexGuard<'_, ()> {
        self.lock.lock()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Scan raw entries in append order
    ///
    /// The returned reader keeps the table lock until it is dropped.
    pub fn entries(&self) -> Result<EntryReader<'_>> {
        let guard = self.lock.lock();
        self.ensure_live()?;
        EntryReader::open(&self.path, &self.schema, self.data_offset, guard)
            .map_err(|e| self.missing(e))
    }

    /// Rebuild the current rows: one per live id, values from its latest entry
    ///
    /// Full sequential scan, O(file size).
    pub fn read_all(&self) -> Result<Vec<Row>> {
        let _guard = self.lock.lock();
        self.ensure_live()?;

        let mut rows: Vec<Option<Row>> = Vec::new();
        let mut slots: HashMap<Uuid, usize> = HashMap::new();
        let mut scanned = 0usize;

        for entry in self.entries()? {
            scanned += 1;
            match entry? {
                StoredEntry::Live { id, values } => {
                    let row = self.build_row(id, values);
                    match slots.get(&id) {
                        Some(&slot) => rows[slot] = Some(row),
                        None => {
                            slots.insert(id, rows.len());
                            rows.push(Some(row));
                        }
                    }
                }
                StoredEntry::Tombstone { id } => {
                    if let Some(slot) = slots.remove(&id) {
                        rows[slot] = None;
                    }
                }
            }
        }

        let rows: Vec<Row> = rows.into_iter().flatten().collect();
        tracing::debug!(
            "Scanned {} entries of {}, {} live rows",
            scanned,
            self.schema.table,
            rows.len()
        );
        Ok(rows)
    }

    /// Table name and columns
    pub fn describe(&self) -> Result<Schema> {
        let _guard = self.lock.lock();
        self.ensure_live()?;
        Ok(self.schema.clone())
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Insert a row under a freshly generated id
    ///
    /// Every non-`_id` column needs a value. Returns the stored row.
    pub fn insert(&self, values: &HashMap<String, Value>) -> Result<Row> {
        let _guard = self.lock.lock();
        self.ensure_live()?;

        self.check_known_columns(values)?;

        let mut coerced = Vec::with_capacity(self.schema.data_column_count());
        for column in self.schema.data_columns() {
            let value = values
                .get(&column.name)
                .ok_or_else(|| DbError::MissingColumn(column.name.clone()))?;
            coerced.push(coerce(value, column.column_type)?);
        }

        let id = Uuid::new_v4();
        let row = self.build_row(id, coerced.clone());
        self.append(&StoredEntry::Live {
            id,
            values: coerced,
        })?;

        Ok(row)
    }

    /// Append a tombstone for `id`
    ///
    /// Does not check that the row exists; deleting an absent id still
    /// appends an entry and succeeds.
    pub fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.lock.lock();
        self.ensure_live()?;

        let id = parse_id(id)?;
        self.append(&StoredEntry::Tombstone { id })?;

        tracing::debug!("Tombstoned {} in {}", id.simple(), self.schema.table);
        Ok(())
    }

    /// Merge `updates` onto the current row, then delete it and re-insert
    ///
    /// The returned row carries a NEW id; the old id is gone after this call.
    pub fn update(&self, id: &str, updates: &HashMap<String, Value>) -> Result<Row> {
        let _guard = self.lock.lock();
        self.ensure_live()?;

        let target = parse_id(id)?.simple().to_string();
        self.check_known_columns(updates)?;

        let current = self
            .read_all()?
            .into_iter()
            .find(|row| row.id() == Some(target.as_str()))
            .ok_or_else(|| DbError::RowNotFound(id.to_string()))?;

        let mut merged = HashMap::with_capacity(self.schema.data_column_count());
        for column in self.schema.data_columns() {
            let value = match updates.get(&column.name) {
                Some(update) => coerce(update, column.column_type)?,
                None => current.value_of(&column.name).clone(),
            };
            merged.insert(column.name.clone(), value);
        }

        self.delete(&target)?;
        let row = self.insert(&merged)?;

        tracing::debug!(
            "Updated {} in {}, new id {}",
            target,
            self.schema.table,
            row.id().unwrap_or_default()
        );
        Ok(row)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.schema.table
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data_offset(&self) -> u64 {
        self.data_offset
    }

    pub fn is_dropped(&self) -> bool {
        self.dropped.load(Ordering::Acquire)
    }

    /// Invalidate this handle; the caller must hold `lock()`
    pub(crate) fn mark_dropped(&self) {
        self.dropped.store(true, Ordering::Release);
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Append one encoded entry and push it to disk before returning
    fn append(&self, entry: &StoredEntry) -> Result<()> {
        let buf = encode_entry(entry, &self.schema)?;

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| self.missing(DbError::Io(e)))?;

        file.write_all(&buf)?;
        file.flush()?;
        if self.sync_strategy == SyncStrategy::EveryWrite {
            file.sync_data()?;
        }
        Ok(())
    }

    fn build_row(&self, id: Uuid, values: Vec<Value>) -> Row {
        let mut row = Row::with_capacity(values.len() + 1);
        row.insert(ID_COLUMN, Value::Text(id.simple().to_string()));
        for (column, value) in self.schema.data_columns().zip(values) {
            row.insert(column.name.clone(), value);
        }
        row
    }

    /// Reject `_id` and names the schema doesn't declare
    fn check_known_columns(&self, values: &HashMap<String, Value>) -> Result<()> {
        for name in values.keys() {
            if name == ID_COLUMN {
                return Err(DbError::TypeMismatch(format!(
                    "{} is SERIAL and assigned by the engine",
                    ID_COLUMN
                )));
            }
            if self.schema.column(name).is_none() {
                return Err(DbError::UnknownColumn(name.clone()));
            }
        }
        Ok(())
    }

    fn ensure_live(&self) -> Result<()> {
        if self.is_dropped() {
            return Err(DbError::TableNotFound(self.schema.table.clone()));
        }
        Ok(())
    }

    /// Report a vanished file as `TableNotFound`
    fn missing(&self, err: DbError) -> DbError {
        match err {
            DbError::Io(ref e) if e.kind() == ErrorKind::NotFound => {
                DbError::TableNotFound(self.schema.table.clone())
            }
            other => other,
        }
    }
}
