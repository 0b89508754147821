//! Tests for value types and coercion
//!
//! These tests verify:
//! - Column type names and schema invariants
//! - Coercion of loosely-typed values into strict column types
//! - Ordering rules used by comparisons and ORDER BY

use std::cmp::Ordering;

use minidb::error::DbError;
use minidb::types::{coerce, Column, ColumnType, Row, Schema, Value, ID_COLUMN};

// =============================================================================
// Column Types and Schemas
// =============================================================================

#[test]
fn test_column_type_names_are_case_insensitive() {
    assert_eq!("int".parse::<ColumnType>().unwrap(), ColumnType::Int);
    assert_eq!("Float".parse::<ColumnType>().unwrap(), ColumnType::Float);
    assert_eq!("TEXT".parse::<ColumnType>().unwrap(), ColumnType::Text);
    assert_eq!("bool".parse::<ColumnType>().unwrap(), ColumnType::Bool);
    assert_eq!("serial".parse::<ColumnType>().unwrap(), ColumnType::Serial);
}

#[test]
fn test_unknown_column_type() {
    let err = "VARCHAR".parse::<ColumnType>().unwrap_err();
    assert!(matches!(err, DbError::UnknownColumnType(ref name) if name == "VARCHAR"));
}

#[test]
fn test_schema_prepends_id_column() {
    let schema = Schema::new(
        "users",
        vec![
            Column::new("name", ColumnType::Text),
            Column::new("age", ColumnType::Int),
        ],
    )
    .unwrap();

    let names: Vec<&str> = schema.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec![ID_COLUMN, "name", "age"]);
    assert_eq!(schema.columns[0].column_type, ColumnType::Serial);
    assert_eq!(schema.data_column_count(), 2);
}

#[test]
fn test_schema_keeps_declared_id_position() {
    let schema = Schema::new(
        "t",
        vec![
            Column::new("a", ColumnType::Int),
            Column::new(ID_COLUMN, ColumnType::Serial),
        ],
    )
    .unwrap();

    assert_eq!(schema.columns.len(), 2);
    assert_eq!(schema.columns[1].name, ID_COLUMN);
}

#[test]
fn test_schema_rejects_duplicate_columns() {
    let err = Schema::new(
        "t",
        vec![
            Column::new("a", ColumnType::Int),
            Column::new("a", ColumnType::Text),
        ],
    )
    .unwrap_err();
    assert!(matches!(err, DbError::DuplicateColumn(ref name) if name == "a"));
}

#[test]
fn test_schema_rejects_misplaced_serial() {
    let err = Schema::new("t", vec![Column::new("n", ColumnType::Serial)]).unwrap_err();
    assert!(matches!(err, DbError::InvalidSchema(_)));

    let err = Schema::new("t", vec![Column::new(ID_COLUMN, ColumnType::Int)]).unwrap_err();
    assert!(matches!(err, DbError::InvalidSchema(_)));
}

#[test]
fn test_schema_serializes_as_header_json() {
    let schema = Schema::new("t", vec![Column::new("a", ColumnType::Int)]).unwrap();
    let json = serde_json::to_string(&schema).unwrap();
    assert_eq!(
        json,
        r#"{"table":"t","columns":[{"name":"_id","type":"SERIAL"},{"name":"a","type":"INT"}]}"#
    );
}

// =============================================================================
// Coercion
// =============================================================================

#[test]
fn test_coerce_int() {
    assert_eq!(coerce(&Value::Int(7), ColumnType::Int).unwrap(), Value::Int(7));
    assert_eq!(coerce(&Value::Float(3.9), ColumnType::Int).unwrap(), Value::Int(3));
    assert_eq!(coerce(&Value::Float(-3.9), ColumnType::Int).unwrap(), Value::Int(-3));
    assert_eq!(coerce(&Value::from("42"), ColumnType::Int).unwrap(), Value::Int(42));
}

#[test]
fn test_coerce_int_rejects_bool_and_words() {
    assert!(matches!(
        coerce(&Value::Bool(true), ColumnType::Int),
        Err(DbError::TypeMismatch(_))
    ));
    assert!(matches!(
        coerce(&Value::from("abc"), ColumnType::Int),
        Err(DbError::TypeMismatch(_))
    ));
    assert!(matches!(
        coerce(&Value::Float(f64::NAN), ColumnType::Int),
        Err(DbError::TypeMismatch(_))
    ));
}

#[test]
fn test_coerce_float() {
    assert_eq!(coerce(&Value::Int(2), ColumnType::Float).unwrap(), Value::Float(2.0));
    assert_eq!(coerce(&Value::from("1.5"), ColumnType::Float).unwrap(), Value::Float(1.5));
    // Booleans never coerce to a numeric column
    for flag in [true, false] {
        assert!(matches!(
            coerce(&Value::Bool(flag), ColumnType::Float),
            Err(DbError::TypeMismatch(_))
        ));
        assert!(matches!(
            coerce(&Value::Bool(flag), ColumnType::Int),
            Err(DbError::TypeMismatch(_))
        ));
    }
}

#[test]
fn test_coerce_text_renders_values() {
    assert_eq!(coerce(&Value::Int(5), ColumnType::Text).unwrap(), Value::from("5"));
    assert_eq!(coerce(&Value::Float(20000.0), ColumnType::Text).unwrap(), Value::from("20000.0"));
    assert_eq!(coerce(&Value::Bool(true), ColumnType::Text).unwrap(), Value::from("true"));
    assert_eq!(coerce(&Value::Bool(false), ColumnType::Text).unwrap(), Value::from("false"));
    assert_eq!(coerce(&Value::from("x"), ColumnType::Text).unwrap(), Value::from("x"));
}

#[test]
fn test_coerce_bool_words() {
    for word in ["true", "1", "t", "YES", "y"] {
        assert_eq!(coerce(&Value::from(word), ColumnType::Bool).unwrap(), Value::Bool(true));
    }
    for word in ["false", "0", "F", "no", "n"] {
        assert_eq!(coerce(&Value::from(word), ColumnType::Bool).unwrap(), Value::Bool(false));
    }
    assert_eq!(coerce(&Value::Int(0), ColumnType::Bool).unwrap(), Value::Bool(false));
    assert_eq!(coerce(&Value::Int(3), ColumnType::Bool).unwrap(), Value::Bool(true));
    assert!(matches!(
        coerce(&Value::from("maybe"), ColumnType::Bool),
        Err(DbError::TypeMismatch(_))
    ));
}

#[test]
fn test_coerce_rejects_null() {
    for column_type in [ColumnType::Int, ColumnType::Float, ColumnType::Text, ColumnType::Bool] {
        assert!(coerce(&Value::Null, column_type).is_err());
    }
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn test_compare_mixed_numbers() {
    assert_eq!(Value::Int(2).compare(&Value::Float(2.5)), Some(Ordering::Less));
    assert_eq!(Value::Float(3.0).compare(&Value::Int(3)), Some(Ordering::Equal));
    assert_eq!(Value::from("a").compare(&Value::from("b")), Some(Ordering::Less));
}

#[test]
fn test_compare_incomparable_kinds() {
    assert_eq!(Value::from("1").compare(&Value::Int(1)), None);
    assert_eq!(Value::Bool(true).compare(&Value::Int(1)), None);
}

#[test]
fn test_sort_cmp_puts_null_first() {
    assert_eq!(Value::Null.sort_cmp(&Value::Int(-100)), Ordering::Less);
    assert_eq!(Value::Int(1).sort_cmp(&Value::Null), Ordering::Greater);
    assert_eq!(Value::from("x").sort_cmp(&Value::Int(1)), Ordering::Equal);
}

// =============================================================================
// Rows
// =============================================================================

#[test]
fn test_row_keeps_field_order_and_projects() {
    let mut row = Row::new();
    row.insert("b", Value::Int(1));
    row.insert("a", Value::Int(2));
    row.insert("b", Value::Int(3));

    assert_eq!(row.len(), 2);
    assert_eq!(serde_json::to_string(&row).unwrap(), r#"{"b":3,"a":2}"#);

    let projected = row.project(&["a".to_string(), "missing".to_string()]);
    assert_eq!(serde_json::to_string(&projected).unwrap(), r#"{"a":2,"missing":null}"#);
}
