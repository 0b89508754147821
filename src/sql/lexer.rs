//! SQL Lexer - Tokenizes statement text into spanned tokens

use std::fmt::Display;
use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::{DbError, Result};

/// A single lexical token of a statement
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Keyword, identifier or bare value; keywords are recognized by the parser
    Word(String),
    /// Numeric literal, `-?\d+(\.\d+)?`
    Number(String),
    /// Quoted literal with doubled-quote escapes already resolved
    String(String),
    /// Comparison operator: `=`, `!=`, `<`, `<=`, `>`, `>=`
    Operator(String),
    OpenParen,
    CloseParen,
    Comma,
    Semicolon,
    Asterisk,
}

impl Token {
    /// Whether this is the keyword `keyword` (case-insensitive)
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Word(w) if w.eq_ignore_ascii_case(keyword))
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Word(w) => f.write_str(w),
            Token::Number(n) => f.write_str(n),
            Token::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Token::Operator(op) => f.write_str(op),
            Token::OpenParen => f.write_str("("),
            Token::CloseParen => f.write_str(")"),
            Token::Comma => f.write_str(","),
            Token::Semicolon => f.write_str(";"),
            Token::Asterisk => f.write_str("*"),
        }
    }
}

/// A token and its byte range in the source text
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub start: usize,
    pub end: usize,
}

/// Statement lexer
pub struct Lexer<'a> {
    source: &'a str,
    iter: Peekable<CharIndices<'a>>,
}

impl Iterator for Lexer<'_> {
    type Item = Result<Spanned>;

    fn next(&mut self) -> Option<Self::Item> {
        self.scan().transpose()
    }
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            iter: source.char_indices().peekable(),
        }
    }

    /// Current byte position
    fn position(&mut self) -> usize {
        self.iter.peek().map(|(i, _)| *i).unwrap_or(self.source.len())
    }

    fn peek_char(&mut self) -> Option<char> {
        self.iter.peek().map(|(_, c)| *c)
    }

    /// Consumes the next character if it satisfies the predicate
    fn next_if<F: Fn(char) -> bool>(&mut self, predicate: F) -> Option<char> {
        self.iter.next_if(|(_, c)| predicate(*c)).map(|(_, c)| c)
    }

    /// Consumes consecutive characters while they satisfy the predicate
    fn next_while<F: Fn(char) -> bool>(&mut self, predicate: F) -> String {
        let mut value = String::new();
        while let Some(c) = self.next_if(&predicate) {
            value.push(c);
        }
        value
    }

    fn scan(&mut self) -> Result<Option<Spanned>> {
        self.next_while(char::is_whitespace);

        let start = self.position();
        let token = match self.peek_char() {
            None => return Ok(None),
            Some(q @ ('\'' | '"')) => self.scan_string(q)?,
            Some('-') => self.scan_negative()?,
            Some(c) if c.is_ascii_digit() => self.scan_number(),
            Some(c) if c.is_alphabetic() || c == '_' => self.scan_word(),
            Some(_) => self.scan_symbol()?,
        };
        let end = self.position();

        Ok(Some(Spanned { token, start, end }))
    }

    /// Quoted literal; a doubled quote inside stands for one quote
    fn scan_string(&mut self, quote: char) -> Result<Token> {
        self.iter.next();
        let mut value = String::new();
        loop {
            match self.iter.next() {
                Some((_, c)) if c == quote => {
                    if self.next_if(|n| n == quote).is_some() {
                        value.push(quote);
                    } else {
                        return Ok(Token::String(value));
                    }
                }
                Some((_, c)) => value.push(c),
                None => {
                    return Err(DbError::Parse(format!(
                        "unterminated {} quoted string",
                        if quote == '\'' { "single" } else { "double" }
                    )))
                }
            }
        }
    }

    fn scan_negative(&mut self) -> Result<Token> {
        self.iter.next();
        if !matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
            return Err(DbError::Parse("'-' must be followed by a number".to_string()));
        }
        match self.scan_number() {
            Token::Number(n) => Ok(Token::Number(format!("-{}", n))),
            Token::Word(w) => Ok(Token::Word(format!("-{}", w))),
            _ => Err(DbError::Parse("'-' must be followed by a number".to_string())),
        }
    }

    /// Digits with an optional fraction; digits running into letters form a bare word
    fn scan_number(&mut self) -> Token {
        let mut value = self.next_while(|c| c.is_ascii_digit());

        let mut lookahead = self.iter.clone();
        if let (Some((_, '.')), Some((_, d))) = (lookahead.next(), lookahead.next()) {
            if d.is_ascii_digit() {
                self.iter.next();
                value.push('.');
                value.push_str(&self.next_while(|c| c.is_ascii_digit()));
            }
        }

        if matches!(self.peek_char(), Some(c) if c.is_alphanumeric() || c == '_') {
            value.push_str(&self.next_while(|c| c.is_alphanumeric() || c == '_'));
            return Token::Word(value);
        }
        Token::Number(value)
    }

    fn scan_word(&mut self) -> Token {
        Token::Word(self.next_while(|c| c.is_alphanumeric() || c == '_'))
    }

    fn scan_symbol(&mut self) -> Result<Token> {
        let c = self.iter.next().map(|(_, c)| c).unwrap_or_default();
        let token = match c {
            '(' => Token::OpenParen,
            ')' => Token::CloseParen,
            ',' => Token::Comma,
            ';' => Token::Semicolon,
            '*' => Token::Asterisk,
            '=' => Token::Operator("=".to_string()),
            '<' | '>' => {
                if self.next_if(|n| n == '=').is_some() {
                    Token::Operator(format!("{}=", c))
                } else {
                    Token::Operator(c.to_string())
                }
            }
            '!' if self.next_if(|n| n == '=').is_some() => Token::Operator("!=".to_string()),
            other => {
                return Err(DbError::Parse(format!("unexpected character {:?}", other)))
            }
        };
        Ok(token)
    }
}
