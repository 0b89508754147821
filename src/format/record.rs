//! Stored entries
//!
//! Encoding and decoding of the append-only entries that follow the header.

use std::io::{self, Read};

use bytes::{BufMut, BytesMut};
use uuid::Uuid;

use super::{ENTRY_PREFIX_SIZE, LIVE_FLAG, TOMBSTONE_FLAG};
use crate::error::{DbError, Result};
use crate::types::{ColumnType, Schema, Value};

/// One immutable unit of the table log
#[derive(Debug, Clone, PartialEq)]
pub enum StoredEntry {
    /// Values for every non-`_id` column, in schema order
    Live { id: Uuid, values: Vec<Value> },

    /// Logical deletion of `id`
    Tombstone { id: Uuid },
}

impl StoredEntry {
    pub fn id(&self) -> Uuid {
        match self {
            StoredEntry::Live { id, .. } | StoredEntry::Tombstone { id } => *id,
        }
    }

    pub fn is_tombstone(&self) -> bool {
        matches!(self, StoredEntry::Tombstone { .. })
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Encode an entry into a single buffer, ready for one `write_all`
///
/// Live values must already be coerced to their column types.
pub fn encode_entry(entry: &StoredEntry, schema: &Schema) -> Result<BytesMut> {
    match entry {
        StoredEntry::Tombstone { id } => {
            let mut buf = BytesMut::with_capacity(ENTRY_PREFIX_SIZE);
            buf.put_u8(TOMBSTONE_FLAG);
            buf.put_slice(id.as_bytes());
            Ok(buf)
        }
        StoredEntry::Live { id, values } => {
            let expected = schema.data_column_count();
            if values.len() != expected {
                return Err(DbError::Serialization(format!(
                    "entry carries {} values, schema has {} data columns",
                    values.len(),
                    expected
                )));
            }

            let mut buf = BytesMut::with_capacity(ENTRY_PREFIX_SIZE + 9 * values.len());
            buf.put_u8(LIVE_FLAG);
            buf.put_slice(id.as_bytes());
            for (column, value) in schema.data_columns().zip(values) {
                encode_value(&mut buf, value, column.column_type, &column.name)?;
            }
            Ok(buf)
        }
    }
}

fn encode_value(buf: &mut BytesMut, value: &Value, column_type: ColumnType, column: &str) -> Result<()> {
    match (column_type, value) {
        (ColumnType::Int, Value::Int(i)) => buf.put_i64(*i),
        (ColumnType::Float, Value::Float(f)) => buf.put_f64(*f),
        (ColumnType::Bool, Value::Bool(b)) => buf.put_u8(u8::from(*b)),
        (ColumnType::Text, Value::Text(s)) => {
            let len = u32::try_from(s.len()).map_err(|_| {
                DbError::Serialization(format!("text in column {} exceeds 4 GiB", column))
            })?;
            buf.put_u32(len);
            buf.put_slice(s.as_bytes());
        }
        (column_type, value) => {
            return Err(DbError::TypeMismatch(format!(
                "column {} is {}, got {} value",
                column,
                column_type,
                value.kind()
            )))
        }
    }
    Ok(())
}

// =============================================================================
// Decoding
// =============================================================================

/// Read the next entry
///
/// Returns `Ok(None)` at a clean end of file, and also when the trailing
/// entry's flag/id prefix is cut short (a torn append). A payload cut short
/// is `CorruptFile`.
pub fn read_entry<R: Read>(reader: &mut R, schema: &Schema) -> Result<Option<StoredEntry>> {
    let mut prefix = [0u8; ENTRY_PREFIX_SIZE];
    let filled = read_full(reader, &mut prefix)?;
    if filled == 0 {
        return Ok(None);
    }
    if filled < ENTRY_PREFIX_SIZE {
        tracing::warn!(
            "Ignoring torn trailing entry ({} of {} prefix bytes)",
            filled,
            ENTRY_PREFIX_SIZE
        );
        return Ok(None);
    }

    let mut id_bytes = [0u8; 16];
    id_bytes.copy_from_slice(&prefix[1..]);
    let id = Uuid::from_bytes(id_bytes);

    match prefix[0] {
        TOMBSTONE_FLAG => Ok(Some(StoredEntry::Tombstone { id })),
        LIVE_FLAG => {
            let mut values = Vec::with_capacity(schema.data_column_count());
            for column in schema.data_columns() {
                values.push(decode_value(reader, column.column_type, &column.name)?);
            }
            Ok(Some(StoredEntry::Live { id, values }))
        }
        flag => Err(DbError::CorruptFile(format!(
            "unknown entry flag 0x{:02x} for id {}",
            flag,
            id.simple()
        ))),
    }
}

fn decode_value<R: Read>(reader: &mut R, column_type: ColumnType, column: &str) -> Result<Value> {
    match column_type {
        ColumnType::Int => {
            let mut raw = [0u8; 8];
            read_payload(reader, &mut raw, column)?;
            Ok(Value::Int(i64::from_be_bytes(raw)))
        }
        ColumnType::Float => {
            let mut raw = [0u8; 8];
            read_payload(reader, &mut raw, column)?;
            Ok(Value::Float(f64::from_be_bytes(raw)))
        }
        ColumnType::Bool => {
            let mut raw = [0u8; 1];
            read_payload(reader, &mut raw, column)?;
            Ok(Value::Bool(raw[0] != 0))
        }
        ColumnType::Text => {
            let mut raw_len = [0u8; 4];
            read_payload(reader, &mut raw_len, column)?;
            let len = u32::from_be_bytes(raw_len) as u64;

            let mut data = Vec::new();
            reader.by_ref().take(len).read_to_end(&mut data)?;
            if data.len() as u64 != len {
                return Err(DbError::CorruptFile(format!(
                    "text in column {} truncated: declared {} bytes, found {}",
                    column,
                    len,
                    data.len()
                )));
            }
            String::from_utf8(data).map(Value::Text).map_err(|_| {
                DbError::CorruptFile(format!("text in column {} is not valid UTF-8", column))
            })
        }
        ColumnType::Serial => Err(DbError::CorruptFile(format!(
            "column {} is SERIAL and carries no stored value",
            column
        ))),
    }
}

fn read_payload<R: Read>(reader: &mut R, buf: &mut [u8], column: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            DbError::CorruptFile(format!("value for column {} truncated", column))
        }
        _ => DbError::Io(e),
    })
}

/// Fill `buf` as far as the reader allows; returns the byte count read
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
