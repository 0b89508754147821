//! Tests for the SQL parser
//!
//! These tests verify:
//! - Every supported statement shape
//! - Literal classification
//! - WHERE capture boundaries
//! - Error kinds for malformed and unsupported input

use minidb::error::DbError;
use minidb::sql::{
    parse, parse_literal, ColumnDef, Lexer, OrderBy, Projection, SortDirection, Statement, Token,
};
use minidb::types::Value;

// =============================================================================
// Lexer Tests
// =============================================================================

#[test]
fn test_lexer_tokens() {
    let tokens: Vec<Token> = Lexer::new("SELECT a, 'it''s' FROM t WHERE x >= -3;")
        .map(|s| s.unwrap().token)
        .collect();

    assert_eq!(
        tokens,
        vec![
            Token::Word("SELECT".to_string()),
            Token::Word("a".to_string()),
            Token::Comma,
            Token::String("it's".to_string()),
            Token::Word("FROM".to_string()),
            Token::Word("t".to_string()),
            Token::Word("WHERE".to_string()),
            Token::Word("x".to_string()),
            Token::Operator(">=".to_string()),
            Token::Number("-3".to_string()),
            Token::Semicolon,
        ]
    );
}

#[test]
fn test_lexer_rejects_unknown_character() {
    let result: Result<Vec<_>, _> = Lexer::new("SELECT # FROM t").collect();
    assert!(matches!(result, Err(DbError::Parse(_))));
}

// =============================================================================
// Literal Tests
// =============================================================================

#[test]
fn test_parse_literal_kinds() {
    assert_eq!(
        parse_literal(&Token::Number("42".to_string())).unwrap(),
        Some(Value::Int(42))
    );
    assert_eq!(
        parse_literal(&Token::Number("-1.5".to_string())).unwrap(),
        Some(Value::Float(-1.5))
    );
    assert_eq!(
        parse_literal(&Token::String("42".to_string())).unwrap(),
        Some(Value::from("42"))
    );
    assert_eq!(
        parse_literal(&Token::Word("TRUE".to_string())).unwrap(),
        Some(Value::Bool(true))
    );
    assert_eq!(
        parse_literal(&Token::Word("Alice".to_string())).unwrap(),
        Some(Value::from("Alice"))
    );
    assert_eq!(parse_literal(&Token::Comma).unwrap(), None);
}

// =============================================================================
// DDL Tests
// =============================================================================

#[test]
fn test_parse_create_table() {
    let statement = parse("create table users (name TEXT, age int);").unwrap();
    assert_eq!(
        statement,
        Statement::CreateTable {
            name: "users".to_string(),
            columns: vec![
                ColumnDef {
                    name: "name".to_string(),
                    type_name: "TEXT".to_string(),
                },
                ColumnDef {
                    name: "age".to_string(),
                    type_name: "int".to_string(),
                },
            ],
        }
    );
}

#[test]
fn test_parse_create_table_errors() {
    assert!(matches!(parse("CREATE TABLE t ()"), Err(DbError::Parse(_))));
    assert!(matches!(
        parse("CREATE TABLE t (a INT NOT)"),
        Err(DbError::Parse(_))
    ));
    assert!(matches!(
        parse("CREATE TABLE t a INT"),
        Err(DbError::UnsupportedStatement(_))
    ));
}

#[test]
fn test_parse_drop_and_describe() {
    assert_eq!(
        parse("DROP TABLE users").unwrap(),
        Statement::DropTable {
            name: "users".to_string()
        }
    );
    assert_eq!(
        parse("describe users;").unwrap(),
        Statement::Describe {
            name: "users".to_string()
        }
    );
}

// =============================================================================
// INSERT Tests
// =============================================================================

#[test]
fn test_parse_insert_positional() {
    let statement = parse("INSERT INTO users VALUES ('Alice', 30, 1.5, true)").unwrap();
    assert_eq!(
        statement,
        Statement::Insert {
            table: "users".to_string(),
            columns: None,
            values: vec![
                Value::from("Alice"),
                Value::Int(30),
                Value::Float(1.5),
                Value::Bool(true),
            ],
        }
    );
}

#[test]
fn test_parse_insert_named() {
    let statement = parse("INSERT INTO users (age, name) VALUES (30, Bob)").unwrap();
    assert_eq!(
        statement,
        Statement::Insert {
            table: "users".to_string(),
            columns: Some(vec!["age".to_string(), "name".to_string()]),
            values: vec![Value::Int(30), Value::from("Bob")],
        }
    );
}

#[test]
fn test_parse_insert_errors() {
    assert!(matches!(
        parse("INSERT INTO t (a, b) VALUES (1)"),
        Err(DbError::Parse(_))
    ));
    assert!(matches!(
        parse("INSERT INTO t (a, a) VALUES (1, 2)"),
        Err(DbError::Parse(_))
    ));
    assert!(matches!(
        parse("INSERT INTO t VALUES (1 2)"),
        Err(DbError::Parse(_))
    ));
    assert!(matches!(
        parse("INSERT INTO t VALUES 1, 2"),
        Err(DbError::UnsupportedStatement(_))
    ));
}

// =============================================================================
// SELECT Tests
// =============================================================================

#[test]
fn test_parse_select_star() {
    assert_eq!(
        parse("SELECT * FROM users").unwrap(),
        Statement::Select {
            table: "users".to_string(),
            projection: Projection::All,
            where_clause: None,
            order_by: None,
            limit: None,
            offset: None,
        }
    );
}

#[test]
fn test_parse_select_full() {
    let statement = parse(
        "SELECT name, age FROM users WHERE (age > 25 AND name != 'x') ORDER BY age DESC LIMIT 10 OFFSET 5;",
    )
    .unwrap();

    assert_eq!(
        statement,
        Statement::Select {
            table: "users".to_string(),
            projection: Projection::Columns(vec!["name".to_string(), "age".to_string()]),
            where_clause: Some("(age > 25 AND name != 'x')".to_string()),
            order_by: Some(OrderBy {
                column: "age".to_string(),
                direction: SortDirection::Desc,
            }),
            limit: Some(10),
            offset: Some(5),
        }
    );
}

#[test]
fn test_parse_select_offset_before_limit() {
    match parse("SELECT * FROM t OFFSET 2 LIMIT 3").unwrap() {
        Statement::Select { limit, offset, .. } => {
            assert_eq!(limit, Some(3));
            assert_eq!(offset, Some(2));
        }
        other => panic!("unexpected statement: {:?}", other),
    }
}

#[test]
fn test_parse_select_order_defaults_to_asc() {
    match parse("SELECT * FROM t ORDER BY name").unwrap() {
        Statement::Select { order_by, .. } => {
            assert_eq!(
                order_by,
                Some(OrderBy {
                    column: "name".to_string(),
                    direction: SortDirection::Asc,
                })
            );
        }
        other => panic!("unexpected statement: {:?}", other),
    }
}

#[test]
fn test_parse_select_bad_limit() {
    assert!(matches!(
        parse("SELECT * FROM t LIMIT -1"),
        Err(DbError::Parse(_))
    ));
    assert!(matches!(
        parse("SELECT * FROM t LIMIT ten"),
        Err(DbError::Parse(_))
    ));
}

// =============================================================================
// UPDATE / DELETE Tests
// =============================================================================

#[test]
fn test_parse_update() {
    let statement = parse("UPDATE users SET age = 31, name = 'Al' WHERE name = 'Alice'").unwrap();
    assert_eq!(
        statement,
        Statement::Update {
            table: "users".to_string(),
            assignments: vec![
                ("age".to_string(), Value::Int(31)),
                ("name".to_string(), Value::from("Al")),
            ],
            where_clause: Some("name = 'Alice'".to_string()),
        }
    );
}

#[test]
fn test_parse_update_errors() {
    assert!(matches!(parse("UPDATE t SET WHERE a = 1"), Err(DbError::Parse(_))));
    assert!(matches!(parse("UPDATE t SET a 1"), Err(DbError::Parse(_))));
}

#[test]
fn test_parse_delete() {
    assert_eq!(
        parse("DELETE FROM users").unwrap(),
        Statement::Delete {
            table: "users".to_string(),
            where_clause: None,
        }
    );
    assert_eq!(
        parse("DELETE FROM users WHERE age < 18 OR age > 65").unwrap(),
        Statement::Delete {
            table: "users".to_string(),
            where_clause: Some("age < 18 OR age > 65".to_string()),
        }
    );
}

// =============================================================================
// Unsupported Input
// =============================================================================

#[test]
fn test_unsupported_statements() {
    for sql in ["", "GRANT ALL ON t", "SELECT FROM t", "DROP users", "SELECT * FROM t junk"] {
        assert!(
            matches!(parse(sql), Err(DbError::UnsupportedStatement(_))),
            "expected unsupported: {:?}",
            sql
        );
    }
}
