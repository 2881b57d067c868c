//! Error types for the AT command protocol.

use thiserror::Error;

/// Errors that can occur when working with the AT protocol.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Hex input has an odd number of digits.
    #[error("malformed hex encoding: odd length {len}")]
    MalformedEncoding {
        /// Length of the offending input.
        len: usize,
    },

    /// Hex input contains a character outside `[0-9a-fA-F]`.
    #[error("invalid hex digit at position {position}")]
    InvalidHexDigit {
        /// Byte offset of the first invalid character.
        position: usize,
    },

    /// An event line did not match the expected frame grammar.
    #[error("malformed event frame: {0}")]
    MalformedFrame(String),

    /// A decoded payload exceeds the frame capacity.
    #[error("payload too large: {len} bytes, max {max}")]
    PayloadTooLarge { len: usize, max: usize },

    /// Buffer overflow (line too long for the receive buffer).
    #[error("buffer overflow: max {max} bytes, got {actual}")]
    BufferOverflow { max: usize, actual: usize },
}

/// Result type alias for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
