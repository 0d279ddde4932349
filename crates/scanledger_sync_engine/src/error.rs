//! Error types for the sync engine.

use scanledger_storage::StorageError;
use scanledger_sync_protocol::ProtocolError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that fail a sync cycle.
///
/// Every variant leaves the cursor untouched: the delta that failed is
/// recomputed and resent wholesale on the next cycle, and the remote
/// deduplicates redeliveries by record id.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The transport failed before any response was received.
    #[error("transport failure: {message}")]
    Transport {
        /// Description of the underlying failure.
        message: String,
    },

    /// The remote answered with a non-success HTTP status.
    #[error("remote returned HTTP {status}")]
    HttpStatus {
        /// The HTTP status code.
        status: u16,
    },

    /// The remote parsed the batch and refused it.
    #[error("remote rejected the batch: {message}")]
    RemoteRejected {
        /// The remote's reason, or a placeholder when it gave none.
        message: String,
    },

    /// The acknowledgment body could not be decoded.
    #[error("unreadable acknowledgment: {reason}")]
    MalformedAck {
        /// What the decoder objected to.
        reason: String,
    },

    /// Another sync cycle is already running.
    #[error("a sync cycle is already in flight")]
    CycleInFlight,

    /// The outgoing batch could not be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The cursor watermark could not be encoded.
    #[error("cursor encoding failed: {0}")]
    CursorEncode(#[from] serde_json::Error),

    /// Reading or persisting the cursor failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SyncError {
    /// Creates a transport error from a failure description.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a rejection error from the remote's message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::RemoteRejected {
            message: message.into(),
        }
    }

    /// Creates a malformed-acknowledgment error.
    pub fn malformed_ack(reason: impl Into<String>) -> Self {
        Self::MalformedAck {
            reason: reason.into(),
        }
    }

    /// Returns `true` when retrying the same cycle may succeed.
    ///
    /// Network faults, server-side statuses, and an occupied engine are
    /// transient; a rejection or a local fault needs operator attention.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. }
                | Self::HttpStatus { .. }
                | Self::MalformedAck { .. }
                | Self::CycleInFlight
        )
    }
}
