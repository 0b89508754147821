//! Response definitions
//!
//! The result envelope returned by `Engine::execute` and written to clients.

use serde::Serialize;

use crate::error::Result;
use crate::types::{Row, Schema};

/// Response status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

/// Statement payloads
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ResultData {
    /// SELECT results, UPDATE's rewritten rows
    Rows(Vec<Row>),

    /// The row created by INSERT
    Row(Row),

    /// DESCRIBE output
    Schema(Schema),

    /// DELETE count, serialized as `{"count": n}`
    Count { count: usize },
}

/// `{status: "ok", data?, message?}` or `{status: "error", message}`
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub status: Status,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResultData>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl QueryResult {
    /// Create an OK result with optional payload
    pub fn ok(data: Option<ResultData>) -> Self {
        Self {
            status: Status::Ok,
            data,
            message: None,
        }
    }

    /// Create an OK result carrying only a message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: Status::Ok,
            data: None,
            message: Some(message.into()),
        }
    }

    /// Create an ERROR result
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            data: None,
            message: Some(message.into()),
        }
    }

    /// Attach a payload
    pub fn with_data(mut self, data: ResultData) -> Self {
        self.data = Some(data);
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// Rows of a SELECT/UPDATE result
    pub fn rows(&self) -> Option<&[Row]> {
        match &self.data {
            Some(ResultData::Rows(rows)) => Some(rows),
            _ => None,
        }
    }

    /// Row of an INSERT result
    pub fn row(&self) -> Option<&Row> {
        match &self.data {
            Some(ResultData::Row(row)) => Some(row),
            _ => None,
        }
    }

    /// Count of a DELETE result
    pub fn count(&self) -> Option<usize> {
        match &self.data {
            Some(ResultData::Count { count }) => Some(*count),
            _ => None,
        }
    }

    /// Render as one JSON line (no trailing newline)
    pub fn to_json_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
