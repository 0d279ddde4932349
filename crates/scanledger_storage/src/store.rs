//! Key-value store trait definition.

use crate::error::{StorageError, StorageResult};

/// A named-key byte store for snapshot persistence.
///
/// Stores are **opaque byte stores** keyed by short names. Callers own all
/// format interpretation - a store does not understand ledger snapshots or
/// sync cursors, it only round-trips bytes under a key.
///
/// # Invariants
///
/// - `read` returns exactly the bytes of the most recent `write` to that key,
///   or `None` if the key was never written (or was removed)
/// - `write` replaces the previous value atomically: a reader never observes
///   a torn value, even across a crash
/// - `remove` of an absent key is a no-op, not an error
/// - Stores must be `Send + Sync` for concurrent access
///
/// # Keys
///
/// Keys become file names in persistent implementations, so they are
/// restricted to ASCII alphanumerics plus `.`, `_` and `-`, and must be
/// non-empty.
///
/// # Implementors
///
/// - [`super::MemoryStore`] - For tests and ephemeral ledgers
/// - [`super::FileStore`] - For persistent storage
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// Returns `None` if the key has never been written or was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or an I/O error occurs.
    fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// The replacement is atomic: after a crash the key holds either the
    /// old value or the new one, never a mixture.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or an I/O error occurs.
    fn write(&self, key: &str, value: &[u8]) -> StorageResult<()>;

    /// Removes the value stored under `key`, if any.
    ///
    /// Removing an absent key succeeds without effect.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or an I/O error occurs.
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Validates a storage key against the naming rules shared by all stores.
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::key_name(key, "key must not be empty"));
    }
    if key.starts_with('.') {
        return Err(StorageError::key_name(key, "key must not start with '.'"));
    }
    if let Some(bad) = key
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '.' | '_' | '-'))
    {
        return Err(StorageError::key_name(
            key,
            format!("character {bad:?} is not allowed"),
        ));
    }
    Ok(())
}
