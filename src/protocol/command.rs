//! Request definitions
//!
//! Represents one line sent by a client.

/// A parsed request line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Statement text for `Engine::execute`
    Execute(String),

    /// `quit` / `exit`: end the session
    Quit,

    /// Line that could not be decoded (e.g. not UTF-8)
    Malformed(String),
}

impl Request {
    /// Interpret a line; `None` for blank lines, which are skipped
    pub fn from_line(line: &str) -> Option<Self> {
        let text = line.trim();
        if text.is_empty() {
            return None;
        }
        if text.eq_ignore_ascii_case("quit") || text.eq_ignore_ascii_case("exit") {
            return Some(Request::Quit);
        }
        Some(Request::Execute(text.to_string()))
    }
}
