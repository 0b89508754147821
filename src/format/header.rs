//! Table header
//!
//! Reads and writes the fixed header that opens every table file.

use std::io::{Read, Write};

use bytes::{BufMut, BytesMut};

use super::{HEADER_PREFIX_SIZE, MAGIC, VERSION};
use crate::error::{DbError, Result};
use crate::types::Schema;

/// Write the header for `schema`
///
/// Returns the data offset (the number of header bytes written).
pub fn write_header<W: Write>(writer: &mut W, schema: &Schema) -> Result<u64> {
    let schema_bytes = serde_json::to_vec(schema)?;
    let schema_len = u32::try_from(schema_bytes.len())
        .map_err(|_| DbError::Serialization("schema too large for header".to_string()))?;

    let mut buf = BytesMut::with_capacity(HEADER_PREFIX_SIZE as usize + schema_bytes.len());
    buf.put_slice(MAGIC);
    buf.put_u8(VERSION);
    buf.put_u32(schema_len);
    buf.put_slice(&schema_bytes);

    writer.write_all(&buf)?;
    Ok(buf.len() as u64)
}

/// Read and validate a header
///
/// Returns the schema and the offset where entries begin.
pub fn read_header<R: Read>(reader: &mut R) -> Result<(Schema, u64)> {
    let mut prefix = [0u8; HEADER_PREFIX_SIZE as usize];
    reader.read_exact(&mut prefix).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => {
            DbError::CorruptFile("file shorter than header".to_string())
        }
        _ => DbError::Io(e),
    })?;

    if &prefix[0..8] != MAGIC {
        return Err(DbError::CorruptFile(format!(
            "invalid magic: expected {:?}, got {:?}",
            MAGIC,
            &prefix[0..8]
        )));
    }

    let version = prefix[8];
    if version != VERSION {
        return Err(DbError::CorruptFile(format!(
            "unsupported format version: {}",
            version
        )));
    }

    let schema_len = u32::from_be_bytes([prefix[9], prefix[10], prefix[11], prefix[12]]) as u64;

    // take() bounds the allocation by what the file actually holds
    let mut schema_bytes = Vec::new();
    reader.by_ref().take(schema_len).read_to_end(&mut schema_bytes)?;
    if schema_bytes.len() as u64 != schema_len {
        return Err(DbError::CorruptFile(format!(
            "schema declares {} bytes, only {} present",
            schema_len,
            schema_bytes.len()
        )));
    }

    let schema: Schema = serde_json::from_slice(&schema_bytes)
        .map_err(|e| DbError::CorruptFile(format!("unreadable schema: {}", e)))?;
    schema
        .validate()
        .map_err(|e| DbError::CorruptFile(format!("invalid schema in header: {}", e)))?;

    Ok((schema, HEADER_PREFIX_SIZE + schema_len))
}
