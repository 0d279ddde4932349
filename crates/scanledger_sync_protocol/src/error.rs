//! Error types for protocol encoding and decoding.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while encoding or decoding wire messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The message bytes are not a valid encoding of the expected shape.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}
