//! Response classification for command round trips.
//!
//! The module answers a command with free-form text. A command succeeded iff
//! the text contains the literal token `OK`; a query response additionally
//! carries a `key=value` segment from which the value is extracted. A timeout
//! with no bytes read classifies the same as a rejection.

/// The raw response text read after one command was sent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Response {
    raw: String,
}

impl Response {
    /// Wrap the raw text read from the transport.
    pub fn parse(raw: impl Into<String>) -> Response {
        Response { raw: raw.into() }
    }

    /// An empty response, as produced by a read timeout.
    pub fn empty() -> Response {
        Response::default()
    }

    /// Whether the module accepted the command.
    pub fn is_ok(&self) -> bool {
        self.raw.contains("OK")
    }

    /// Extract the value from a `key=value` query response.
    ///
    /// The value is the substring after the first `=` up to the next space or
    /// newline, or the end of the response if neither follows. Returns `None`
    /// when the response contains no `=`.
    pub fn value(&self) -> Option<String> {
        let eq = self.raw.find('=')?;
        let rest = &self.raw[eq + 1..];
        let end = rest.find([' ', '\n']).unwrap_or(rest.len());
        Some(rest[..end].to_string())
    }

    /// The raw response text.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}
