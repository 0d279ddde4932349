//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Another process holds the exclusive lock on the store directory.
    #[error("store locked: another process has exclusive access")]
    Locked,

    /// A key is not usable as a storage name.
    #[error("invalid storage key {key:?}: {reason}")]
    KeyName {
        /// The offending key.
        key: String,
        /// Why the key was rejected.
        reason: String,
    },
}

impl StorageError {
    /// Creates a key name error.
    pub fn key_name(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::KeyName {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
