//! Error types for driver operations.

use rak3172_protocol::ProtocolError;
use thiserror::Error;

/// Errors that can occur when operating the module.
#[derive(Debug, Error)]
pub enum Error {
    /// Exclusive transport access could not be acquired in time.
    #[error("timed out waiting for exclusive transport access")]
    LockTimeout,

    /// The module rejected a command, or no response arrived before the
    /// read bound elapsed (the two are indistinguishable on the wire).
    #[error("command failed: {command}")]
    CommandFailed {
        /// The command that failed, without terminator.
        command: String,
    },

    /// An argument failed validation; no transport traffic was generated.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation requires OTAA join mode.
    #[error("operation requires OTAA join mode")]
    WrongJoinMode,

    /// The network join did not complete before the wait ceiling.
    #[error("timed out waiting for network join")]
    JoinTimeout,

    /// A protocol-level decode failure.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Transport I/O failure.
    #[error("transport i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for driver operations.
pub type DriverResult<T> = Result<T, Error>;
