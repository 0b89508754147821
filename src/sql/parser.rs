//! SQL Parser - Recursive descent over the supported statement shapes

use super::ast::{ColumnDef, OrderBy, Projection, SortDirection, Statement};
use super::lexer::{Lexer, Spanned, Token};
use crate::error::{DbError, Result};
use crate::types::Value;

/// Leading keywords of the statements MiniDB understands
const STATEMENT_KEYWORDS: [&str; 7] = [
    "CREATE", "DROP", "DESCRIBE", "INSERT", "SELECT", "UPDATE", "DELETE",
];

/// Parse a single statement (trailing `;` allowed)
pub fn parse(sql: &str) -> Result<Statement> {
    Parser::new(sql)?.parse()
}

/// Classify a value token: bool, integer, float, quoted string, or bare word as text
pub fn parse_literal(token: &Token) -> Result<Option<Value>> {
    let value = match token {
        Token::Number(n) if n.contains('.') => Value::Float(
            n.parse()
                .map_err(|_| DbError::Parse(format!("invalid number {}", n)))?,
        ),
        Token::Number(n) => Value::Int(
            n.parse()
                .map_err(|_| DbError::Parse(format!("integer out of range: {}", n)))?,
        ),
        Token::String(s) => Value::Text(s.clone()),
        Token::Word(w) if w.eq_ignore_ascii_case("true") => Value::Bool(true),
        Token::Word(w) if w.eq_ignore_ascii_case("false") => Value::Bool(false),
        Token::Word(w) => Value::Text(w.clone()),
        _ => return Ok(None),
    };
    Ok(Some(value))
}

/// SQL Parser - turns one statement's tokens into a `Statement`
pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
}

impl<'a> Parser<'a> {
    /// Tokenize `source`, rejecting unknown statement kinds up front
    pub fn new(source: &'a str) -> Result<Self> {
        let leading = source
            .trim_start()
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .next()
            .unwrap_or_default();
        if !STATEMENT_KEYWORDS
            .iter()
            .any(|k| k.eq_ignore_ascii_case(leading))
        {
            return Err(DbError::UnsupportedStatement(source.trim().to_string()));
        }

        let mut tokens = Lexer::new(source).collect::<Result<Vec<_>>>()?;
        while matches!(tokens.last(), Some(s) if s.token == Token::Semicolon) {
            tokens.pop();
        }

        Ok(Self {
            source,
            tokens,
            pos: 0,
        })
    }

    /// Parse the statement; every token must be consumed
    pub fn parse(&mut self) -> Result<Statement> {
        let keyword = match self.peek() {
            Some(Token::Word(w)) => w.to_ascii_uppercase(),
            _ => return Err(self.unsupported()),
        };

        let statement = match keyword.as_str() {
            "CREATE" => self.parse_create_table()?,
            "DROP" => self.parse_drop_table()?,
            "DESCRIBE" => self.parse_describe()?,
            "INSERT" => self.parse_insert()?,
            "SELECT" => self.parse_select()?,
            "UPDATE" => self.parse_update()?,
            "DELETE" => self.parse_delete()?,
            _ => return Err(self.unsupported()),
        };

        if self.pos < self.tokens.len() {
            return Err(self.unsupported());
        }
        Ok(statement)
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_create_table(&mut self) -> Result<Statement> {
        self.expect_keyword("CREATE")?;
        self.expect_keyword("TABLE")?;
        let name = self.next_ident()?;
        let inner = self.enclosed_tail()?;

        if inner.is_empty() {
            return Err(DbError::Parse(
                "CREATE TABLE needs at least one column".to_string(),
            ));
        }

        let mut columns = Vec::new();
        for part in split_commas(&inner) {
            match part {
                [Spanned { token: Token::Word(name), .. }, Spanned { token: Token::Word(type_name), .. }]
                    if is_ident(name) && is_ident(type_name) =>
                {
                    columns.push(ColumnDef {
                        name: name.clone(),
                        type_name: type_name.clone(),
                    });
                }
                _ => {
                    return Err(DbError::Parse(format!(
                        "malformed column definition in CREATE TABLE: '{}'",
                        self.text_of(part)
                    )))
                }
            }
        }

        Ok(Statement::CreateTable { name, columns })
    }

    fn parse_drop_table(&mut self) -> Result<Statement> {
        self.expect_keyword("DROP")?;
        self.expect_keyword("TABLE")?;
        Ok(Statement::DropTable {
            name: self.next_ident()?,
        })
    }

    fn parse_describe(&mut self) -> Result<Statement> {
        self.expect_keyword("DESCRIBE")?;
        Ok(Statement::Describe {
            name: self.next_ident()?,
        })
    }

    fn parse_insert(&mut self) -> Result<Statement> {
        self.expect_keyword("INSERT")?;
        self.expect_keyword("INTO")?;
        let table = self.next_ident()?;

        let columns = if self.next_if_token(&Token::OpenParen) {
            let start = self.pos;
            while !matches!(self.peek(), Some(Token::CloseParen) | None) {
                self.pos += 1;
            }
            let list = self.tokens[start..self.pos].to_vec();
            self.expect_token(&Token::CloseParen)?;

            let mut names = Vec::new();
            for part in split_commas(&list) {
                match part {
                    [Spanned { token: Token::Word(name), .. }] if is_ident(name) => {
                        if names.contains(name) {
                            return Err(DbError::Parse(format!(
                                "column {} listed twice in INSERT",
                                name
                            )));
                        }
                        names.push(name.clone());
                    }
                    _ => {
                        return Err(DbError::Parse(format!(
                            "malformed column list in INSERT: '{}'",
                            self.text_of(part)
                        )))
                    }
                }
            }
            Some(names)
        } else {
            None
        };

        self.expect_keyword("VALUES")?;
        let inner = self.enclosed_tail()?;

        let mut values = Vec::new();
        if !inner.is_empty() {
            for part in split_commas(&inner) {
                let value = match part {
                    [single] => parse_literal(&single.token)?,
                    _ => None,
                };
                match value {
                    Some(v) => values.push(v),
                    None => {
                        return Err(DbError::Parse(format!(
                            "malformed value in VALUES: '{}'",
                            self.text_of(part)
                        )))
                    }
                }
            }
        }

        if let Some(names) = &columns {
            if names.len() != values.len() {
                return Err(DbError::Parse(format!(
                    "INSERT lists {} columns but {} values",
                    names.len(),
                    values.len()
                )));
            }
        }

        Ok(Statement::Insert {
            table,
            columns,
            values,
        })
    }

    fn parse_select(&mut self) -> Result<Statement> {
        self.expect_keyword("SELECT")?;

        let projection = if self.next_if_token(&Token::Asterisk) {
            Projection::All
        } else {
            let start = self.pos;
            while !matches!(self.peek(), Some(t) if t.is_keyword("FROM")) {
                if self.peek().is_none() {
                    return Err(self.unsupported());
                }
                self.pos += 1;
            }
            let list = self.tokens[start..self.pos].to_vec();
            if list.is_empty() {
                return Err(self.unsupported());
            }

            let mut names = Vec::new();
            for part in split_commas(&list) {
                match part {
                    [Spanned { token: Token::Word(name), .. }] if is_ident(name) => {
                        names.push(name.clone())
                    }
                    _ => {
                        return Err(DbError::Parse(format!(
                            "malformed column list in SELECT: '{}'",
                            self.text_of(part)
                        )))
                    }
                }
            }
            Projection::Columns(names)
        };

        self.expect_keyword("FROM")?;
        let table = self.next_ident()?;

        let where_clause = if self.next_if_keyword("WHERE") {
            self.capture_where(true)
        } else {
            None
        };

        let order_by = if self.next_if_keyword("ORDER") {
            self.expect_keyword("BY")?;
            let column = self.next_ident()?;
            let direction = if self.next_if_keyword("DESC") {
                SortDirection::Desc
            } else {
                self.next_if_keyword("ASC");
                SortDirection::Asc
            };
            Some(OrderBy { column, direction })
        } else {
            None
        };

        let mut limit = None;
        let mut offset = None;
        loop {
            if limit.is_none() && self.next_if_keyword("LIMIT") {
                limit = Some(self.next_count("LIMIT")?);
            } else if offset.is_none() && self.next_if_keyword("OFFSET") {
                offset = Some(self.next_count("OFFSET")?);
            } else {
                break;
            }
        }

        Ok(Statement::Select {
            table,
            projection,
            where_clause,
            order_by,
            limit,
            offset,
        })
    }

    fn parse_update(&mut self) -> Result<Statement> {
        self.expect_keyword("UPDATE")?;
        let table = self.next_ident()?;
        self.expect_keyword("SET")?;

        let start = self.pos;
        while !matches!(self.peek(), Some(t) if t.is_keyword("WHERE")) && self.peek().is_some() {
            self.pos += 1;
        }
        let list = self.tokens[start..self.pos].to_vec();
        if list.is_empty() {
            return Err(DbError::Parse("UPDATE needs at least one assignment".to_string()));
        }

        let mut assignments = Vec::new();
        for part in split_commas(&list) {
            let assignment = match part {
                [Spanned { token: Token::Word(column), .. }, Spanned { token: Token::Operator(op), .. }, value]
                    if is_ident(column) && op == "=" =>
                {
                    parse_literal(&value.token)?.map(|v| (column.clone(), v))
                }
                _ => None,
            };
            match assignment {
                Some(a) => assignments.push(a),
                None => {
                    return Err(DbError::Parse(format!(
                        "malformed assignment in UPDATE: '{}'",
                        self.text_of(part)
                    )))
                }
            }
        }

        let where_clause = if self.next_if_keyword("WHERE") {
            self.capture_where(false)
        } else {
            None
        };

        Ok(Statement::Update {
            table,
            assignments,
            where_clause,
        })
    }

    fn parse_delete(&mut self) -> Result<Statement> {
        self.expect_keyword("DELETE")?;
        self.expect_keyword("FROM")?;
        let table = self.next_ident()?;

        let where_clause = if self.next_if_keyword("WHERE") {
            self.capture_where(false)
        } else {
            None
        };

        Ok(Statement::Delete {
            table,
            where_clause,
        })
    }

    // =========================================================================
    // Clause Helpers
    // =========================================================================

    /// Raw WHERE text up to the next top-level ORDER BY / LIMIT / OFFSET
    /// (when `in_select`) or the end of the statement
    fn capture_where(&mut self, in_select: bool) -> Option<String> {
        let start = self.pos;
        let mut depth = 0usize;

        while let Some(token) = self.peek() {
            match token {
                Token::OpenParen => depth += 1,
                Token::CloseParen => depth = depth.saturating_sub(1),
                t if in_select && depth == 0 && self.starts_select_tail(t) => break,
                _ => {}
            }
            self.pos += 1;
        }

        if start == self.pos {
            return None;
        }
        let text = self.source[self.tokens[start].start..self.tokens[self.pos - 1].end].trim();
        Some(text.to_string()).filter(|t| !t.is_empty())
    }

    fn starts_select_tail(&self, token: &Token) -> bool {
        if token.is_keyword("LIMIT") || token.is_keyword("OFFSET") {
            return true;
        }
        token.is_keyword("ORDER")
            && matches!(self.tokens.get(self.pos + 1), Some(s) if s.token.is_keyword("BY"))
    }

    /// `( ... )` that runs to the end of the statement; returns the inner tokens
    fn enclosed_tail(&mut self) -> Result<Vec<Spanned>> {
        self.expect_token(&Token::OpenParen)?;
        match self.tokens.last() {
            Some(last) if last.token == Token::CloseParen && self.tokens.len() > self.pos => {
                let inner = self.tokens[self.pos..self.tokens.len() - 1].to_vec();
                self.pos = self.tokens.len();
                Ok(inner)
            }
            _ => Err(self.unsupported()),
        }
    }

    fn next_count(&mut self, clause: &str) -> Result<usize> {
        match self.next_token() {
            Some(Token::Number(n)) => n.parse().map_err(|_| {
                DbError::Parse(format!("{} expects a non-negative integer, got {}", clause, n))
            }),
            Some(other) => Err(DbError::Parse(format!(
                "{} expects a non-negative integer, got {}",
                clause, other
            ))),
            None => Err(DbError::Parse(format!("{} expects a number", clause))),
        }
    }

    // =========================================================================
    // Token Helpers
    // =========================================================================

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn next_token(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|s| s.token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn next_if_keyword(&mut self, keyword: &str) -> bool {
        if matches!(self.peek(), Some(t) if t.is_keyword(keyword)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn next_if_token(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.next_if_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unsupported())
        }
    }

    fn expect_token(&mut self, token: &Token) -> Result<()> {
        if self.next_if_token(token) {
            Ok(())
        } else {
            Err(self.unsupported())
        }
    }

    fn next_ident(&mut self) -> Result<String> {
        match self.peek() {
            Some(Token::Word(w)) if is_ident(w) => {
                let ident = w.clone();
                self.pos += 1;
                Ok(ident)
            }
            _ => Err(self.unsupported()),
        }
    }

    fn text_of(&self, part: &[Spanned]) -> &str {
        match (part.first(), part.last()) {
            (Some(first), Some(last)) => &self.source[first.start..last.end],
            _ => "",
        }
    }

    fn unsupported(&self) -> DbError {
        DbError::UnsupportedStatement(self.source.trim().to_string())
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn is_ident(word: &str) -> bool {
    let mut chars = word.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn split_commas(tokens: &[Spanned]) -> Vec<&[Spanned]> {
    tokens.split(|s| s.token == Token::Comma).collect()
}
