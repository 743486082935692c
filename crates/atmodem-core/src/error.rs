//! Error types for atmodem.
//!
//! Only genuinely exceptional conditions end up here: transport failures and
//! configuration mistakes. A modem that answers `ERROR`, or does not answer
//! at all, is reported through
//! [`ResponseOutcome`](crate::ResponseOutcome) instead, since callers are
//! expected to branch on it for every command.

/// The error type for all fallible atmodem operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transport-level error (serial port open failure, driver error).
    #[error("transport error: {0}")]
    Transport(String),

    /// An invalid configuration value was supplied.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The byte stream has been closed.
    #[error("not connected")]
    NotConnected,

    /// The connection to the modem was lost unexpectedly.
    #[error("connection lost")]
    ConnectionLost,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
