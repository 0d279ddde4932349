//! Error types for scan ledger core operations.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in scan ledger operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage collaborator error.
    #[error("storage error: {0}")]
    Storage(#[from] scanledger_storage::StorageError),

    /// The ledger snapshot could not be encoded for persistence.
    #[error("snapshot encoding failed: {0}")]
    SnapshotEncode(#[from] serde_json::Error),

    /// A receipt code was empty after trimming.
    ///
    /// No record is created and no state changes.
    #[error("receipt code is empty after trimming")]
    EmptyCode,

    /// A courier label was empty after trimming.
    #[error("courier label is empty after trimming")]
    EmptyCourier,
}
