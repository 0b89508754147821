//! Protocol Module
//!
//! Defines the session protocol between clients and the server.
//!
//! ## Protocol Format (line-delimited)
//!
//! ### Request
//! One statement per line, UTF-8. Blank lines are ignored; `quit` or `exit`
//! ends the session.
//!
//! ### Response
//! One JSON object per line:
//! ```text
//! {"status":"ok","data":...,"message":...}
//! {"status":"error","message":"..."}
//! ```

mod codec;
mod command;
mod response;

pub use codec::{read_request, read_result, write_result, write_statement, MAX_LINE_SIZE};
pub use command::Request;
pub use response::{QueryResult, ResultData, Status};
