//! Tests for the table file format
//!
//! These tests verify:
//! - Header layout and schema round-trip
//! - Entry layout for live rows and tombstones
//! - Torn trailing entries versus truncated payloads
//! - Rejection of damaged headers

use std::io::Cursor;

use minidb::error::DbError;
use minidb::format::{
    encode_entry, read_entry, read_header, write_header, StoredEntry, ENTRY_PREFIX_SIZE,
    HEADER_PREFIX_SIZE, MAGIC, TOMBSTONE_FLAG,
};
use minidb::types::{Column, ColumnType, Schema, Value};
use uuid::Uuid;

// =============================================================================
// Helper Functions
// =============================================================================

fn sample_schema() -> Schema {
    Schema::new(
        "people",
        vec![
            Column::new("name", ColumnType::Text),
            Column::new("age", ColumnType::Int),
            Column::new("score", ColumnType::Float),
            Column::new("active", ColumnType::Bool),
        ],
    )
    .unwrap()
}

fn sample_live() -> StoredEntry {
    StoredEntry::Live {
        id: Uuid::new_v4(),
        values: vec![
            Value::from("Ada"),
            Value::Int(36),
            Value::Float(9.5),
            Value::Bool(true),
        ],
    }
}

// =============================================================================
// Header Tests
// =============================================================================

#[test]
fn test_header_layout() {
    let schema = sample_schema();
    let mut buf = Vec::new();
    let offset = write_header(&mut buf, &schema).unwrap();

    assert_eq!(offset, buf.len() as u64);
    assert_eq!(&buf[0..8], MAGIC);
    assert_eq!(buf[8], 1);

    let declared = u32::from_be_bytes([buf[9], buf[10], buf[11], buf[12]]) as u64;
    assert_eq!(declared + HEADER_PREFIX_SIZE, offset);

    let json: serde_json::Value = serde_json::from_slice(&buf[13..]).unwrap();
    assert_eq!(json["table"], "people");
    assert_eq!(json["columns"][0]["name"], "_id");
    assert_eq!(json["columns"][0]["type"], "SERIAL");
}

#[test]
fn test_header_roundtrip() {
    let schema = sample_schema();
    let mut buf = Vec::new();
    let offset = write_header(&mut buf, &schema).unwrap();

    let (read_back, data_offset) = read_header(&mut Cursor::new(&buf)).unwrap();
    assert_eq!(read_back, schema);
    assert_eq!(data_offset, offset);
}

#[test]
fn test_header_bad_magic() {
    let mut buf = Vec::new();
    write_header(&mut buf, &sample_schema()).unwrap();
    buf[0] = b'X';

    let err = read_header(&mut Cursor::new(&buf)).unwrap_err();
    assert!(matches!(err, DbError::CorruptFile(_)));
}

#[test]
fn test_header_bad_version() {
    let mut buf = Vec::new();
    write_header(&mut buf, &sample_schema()).unwrap();
    buf[8] = 9;

    let err = read_header(&mut Cursor::new(&buf)).unwrap_err();
    assert!(matches!(err, DbError::CorruptFile(_)));
}

#[test]
fn test_header_truncated_schema() {
    let mut buf = Vec::new();
    write_header(&mut buf, &sample_schema()).unwrap();
    buf.truncate(buf.len() - 5);

    let err = read_header(&mut Cursor::new(&buf)).unwrap_err();
    assert!(matches!(err, DbError::CorruptFile(_)));
}

#[test]
fn test_header_too_short() {
    let err = read_header(&mut Cursor::new(b"MINI".to_vec())).unwrap_err();
    assert!(matches!(err, DbError::CorruptFile(_)));
}

// =============================================================================
// Entry Tests
// =============================================================================

#[test]
fn test_live_entry_layout() {
    let schema = sample_schema();
    let entry = sample_live();
    let bytes = encode_entry(&entry, &schema).unwrap();

    // prefix + "Ada" (4 + 3) + int 8 + float 8 + bool 1
    assert_eq!(bytes.len(), ENTRY_PREFIX_SIZE + 7 + 8 + 8 + 1);
    assert_eq!(bytes[0], 0);
    assert_eq!(&bytes[1..17], entry.id().as_bytes());
    assert_eq!(&bytes[17..21], &3u32.to_be_bytes());
    assert_eq!(&bytes[21..24], b"Ada");
    assert_eq!(&bytes[24..32], &36i64.to_be_bytes());
}

#[test]
fn test_tombstone_layout() {
    let id = Uuid::new_v4();
    let bytes = encode_entry(&StoredEntry::Tombstone { id }, &sample_schema()).unwrap();

    assert_eq!(bytes.len(), ENTRY_PREFIX_SIZE);
    assert_eq!(bytes[0], TOMBSTONE_FLAG);
    assert_eq!(&bytes[1..], id.as_bytes());
}

#[test]
fn test_entries_read_back_in_order() {
    let schema = sample_schema();
    let live = sample_live();
    let tombstone = StoredEntry::Tombstone { id: live.id() };

    let mut buf = Vec::new();
    buf.extend_from_slice(&encode_entry(&live, &schema).unwrap());
    buf.extend_from_slice(&encode_entry(&tombstone, &schema).unwrap());

    let mut cursor = Cursor::new(buf);
    assert_eq!(read_entry(&mut cursor, &schema).unwrap(), Some(live));
    let second = read_entry(&mut cursor, &schema).unwrap().unwrap();
    assert!(second.is_tombstone());
    assert_eq!(read_entry(&mut cursor, &schema).unwrap(), None);
}

#[test]
fn test_encode_rejects_wrong_value_count() {
    let entry = StoredEntry::Live {
        id: Uuid::new_v4(),
        values: vec![Value::from("only one")],
    };
    let err = encode_entry(&entry, &sample_schema()).unwrap_err();
    assert!(matches!(err, DbError::Serialization(_)));
}

#[test]
fn test_encode_rejects_uncoerced_value() {
    let entry = StoredEntry::Live {
        id: Uuid::new_v4(),
        values: vec![
            Value::from("Ada"),
            Value::from("thirty"),
            Value::Float(1.0),
            Value::Bool(false),
        ],
    };
    let err = encode_entry(&entry, &sample_schema()).unwrap_err();
    assert!(matches!(err, DbError::TypeMismatch(_)));
}

// =============================================================================
// Truncation Tests
// =============================================================================

#[test]
fn test_torn_prefix_is_ignored() {
    let schema = sample_schema();
    let mut buf = encode_entry(&sample_live(), &schema).unwrap().to_vec();
    buf.extend_from_slice(&[0u8; 9]);

    let mut cursor = Cursor::new(buf);
    assert!(read_entry(&mut cursor, &schema).unwrap().is_some());
    assert_eq!(read_entry(&mut cursor, &schema).unwrap(), None);
}

#[test]
fn test_truncated_payload_is_corrupt() {
    let schema = sample_schema();
    let mut buf = encode_entry(&sample_live(), &schema).unwrap().to_vec();
    buf.truncate(buf.len() - 3);

    let err = read_entry(&mut Cursor::new(buf), &schema).unwrap_err();
    assert!(matches!(err, DbError::CorruptFile(_)));
}

#[test]
fn test_unknown_flag_is_corrupt() {
    let schema = sample_schema();
    let mut buf = encode_entry(&sample_live(), &schema).unwrap().to_vec();
    buf[0] = 7;

    let err = read_entry(&mut Cursor::new(buf), &schema).unwrap_err();
    assert!(matches!(err, DbError::CorruptFile(_)));
}
