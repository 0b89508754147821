//! Codec Tests
//!
//! Tests for request framing and result encoding.

use std::io::Cursor;

use minidb::error::DbError;
use minidb::protocol::{
    read_request, read_result, write_result, write_statement, QueryResult, Request, ResultData,
    MAX_LINE_SIZE,
};
use minidb::types::{Row, Value};

// =============================================================================
// Request Tests
// =============================================================================

#[test]
fn test_request_from_line() {
    assert_eq!(Request::from_line("   "), None);
    assert_eq!(Request::from_line("QUIT"), Some(Request::Quit));
    assert_eq!(Request::from_line(" exit "), Some(Request::Quit));
    assert_eq!(
        Request::from_line("  SELECT * FROM t  "),
        Some(Request::Execute("SELECT * FROM t".to_string()))
    );
}

#[test]
fn test_read_request_skips_blank_lines() {
    let mut input = Cursor::new(b"\n\r\n  \nDESCRIBE t\r\nquit\n".to_vec());

    assert_eq!(
        read_request(&mut input).unwrap(),
        Some(Request::Execute("DESCRIBE t".to_string()))
    );
    assert_eq!(read_request(&mut input).unwrap(), Some(Request::Quit));
    assert_eq!(read_request(&mut input).unwrap(), None);
}

#[test]
fn test_read_request_last_line_without_newline() {
    let mut input = Cursor::new(b"DROP TABLE t".to_vec());
    assert_eq!(
        read_request(&mut input).unwrap(),
        Some(Request::Execute("DROP TABLE t".to_string()))
    );
}

#[test]
fn test_read_request_invalid_utf8() {
    let mut input = Cursor::new(b"\xc3\x28\n".to_vec());
    assert!(matches!(
        read_request(&mut input).unwrap(),
        Some(Request::Malformed(_))
    ));
}

#[test]
fn test_read_request_line_too_large() {
    let mut input = Cursor::new(vec![b'a'; MAX_LINE_SIZE + 10]);
    assert!(matches!(read_request(&mut input), Err(DbError::Protocol(_))));
}

#[test]
fn test_write_statement_rejects_newlines() {
    let mut out = Vec::new();
    write_statement(&mut out, "SELECT * FROM t").unwrap();
    assert_eq!(out, b"SELECT * FROM t\n");

    assert!(matches!(
        write_statement(&mut out, "SELECT *\nFROM t"),
        Err(DbError::Protocol(_))
    ));
}

// =============================================================================
// Result Tests
// =============================================================================

#[test]
fn test_result_envelopes() {
    assert_eq!(
        QueryResult::message("Table t created").to_json_line().unwrap(),
        r#"{"status":"ok","message":"Table t created"}"#
    );
    assert_eq!(
        QueryResult::error("Table not found: t").to_json_line().unwrap(),
        r#"{"status":"error","message":"Table not found: t"}"#
    );
    assert_eq!(
        QueryResult::ok(Some(ResultData::Rows(Vec::new())))
            .to_json_line()
            .unwrap(),
        r#"{"status":"ok","data":[]}"#
    );
    assert_eq!(
        QueryResult::message("1 row(s) deleted")
            .with_data(ResultData::Count { count: 1 })
            .to_json_line()
            .unwrap(),
        r#"{"status":"ok","data":{"count":1},"message":"1 row(s) deleted"}"#
    );
}

#[test]
fn test_result_row_values() {
    let mut row = Row::new();
    row.insert("i", Value::Int(-4));
    row.insert("f", Value::Float(2.5));
    row.insert("b", Value::Bool(false));
    row.insert("s", Value::from("x\"y"));

    let line = QueryResult::ok(Some(ResultData::Row(row)))
        .to_json_line()
        .unwrap();
    assert_eq!(
        line,
        r#"{"status":"ok","data":{"i":-4,"f":2.5,"b":false,"s":"x\"y"}}"#
    );
}

#[test]
fn test_write_then_read_result() {
    let mut buf = Vec::new();
    write_result(&mut buf, &QueryResult::message("Bye")).unwrap();
    write_result(&mut buf, &QueryResult::error("boom")).unwrap();
    assert_eq!(buf.iter().filter(|&&b| b == b'\n').count(), 2);

    let mut reader = Cursor::new(buf);
    let first = read_result(&mut reader).unwrap().unwrap();
    assert_eq!(first["message"], "Bye");
    let second = read_result(&mut reader).unwrap().unwrap();
    assert_eq!(second["status"], "error");
    assert!(read_result(&mut reader).unwrap().is_none());
}
