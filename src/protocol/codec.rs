//! Protocol codec
//!
//! Line framing for requests and JSON responses.
//!
//! ## Wire Format
//! ```text
//! client → server:  <statement text>\n
//! server → client:  {"status":"ok",...}\n
//! ```

use std::io::{BufRead, Read, Write};

use super::{QueryResult, Request};
use crate::error::{DbError, Result};

/// Maximum line size (16 MB)
pub const MAX_LINE_SIZE: usize = 16 * 1024 * 1024;

/// Read raw bytes up to and excluding the next newline
///
/// `Ok(None)` at end of stream.
fn read_line_bytes<R: BufRead>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    let mut buf = Vec::new();
    let read = reader
        .by_ref()
        .take(MAX_LINE_SIZE as u64 + 1)
        .read_until(b'\n', &mut buf)?;

    if read == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
    } else if buf.len() > MAX_LINE_SIZE {
        return Err(DbError::Protocol(format!(
            "Line too large: more than {} bytes",
            MAX_LINE_SIZE
        )));
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    Ok(Some(buf))
}

/// Read the next non-blank request
///
/// Blocks until a complete line is received. `Ok(None)` when the peer closes.
pub fn read_request<R: BufRead>(reader: &mut R) -> Result<Option<Request>> {
    loop {
        let Some(bytes) = read_line_bytes(reader)? else {
            return Ok(None);
        };

        let line = match String::from_utf8(bytes) {
            Ok(line) => line,
            Err(_) => {
                return Ok(Some(Request::Malformed(
                    "request is not valid UTF-8".to_string(),
                )))
            }
        };

        if let Some(request) = Request::from_line(&line) {
            return Ok(Some(request));
        }
    }
}

/// Write a statement line
pub fn write_statement<W: Write>(writer: &mut W, statement: &str) -> Result<()> {
    if statement.contains('\n') {
        return Err(DbError::Protocol(
            "statement must fit on a single line".to_string(),
        ));
    }
    writer.write_all(statement.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Write a result as one JSON line
pub fn write_result<W: Write>(writer: &mut W, result: &QueryResult) -> Result<()> {
    let mut line = result.to_json_line()?;
    line.push('\n');
    writer.write_all(line.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Read one JSON response line (client side)
pub fn read_result<R: BufRead>(reader: &mut R) -> Result<Option<serde_json::Value>> {
    let Some(bytes) = read_line_bytes(reader)? else {
        return Ok(None);
    };
    let value = serde_json::from_slice(&bytes)
        .map_err(|e| DbError::Protocol(format!("Invalid response line: {}", e)))?;
    Ok(Some(value))
}
