//! In-memory key-value store for testing.

use crate::error::StorageResult;
use crate::store::{validate_key, KeyValueStore};
use parking_lot::RwLock;
use std::collections::HashMap;

/// An in-memory key-value store.
///
/// This store keeps all values in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral ledgers that don't need persistence
///
/// # Thread Safety
///
/// This store is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use scanledger_storage::{KeyValueStore, MemoryStore};
///
/// let store = MemoryStore::new();
/// store.write("ledger", b"snapshot bytes").unwrap();
/// assert_eq!(store.read("ledger").unwrap().as_deref(), Some(&b"snapshot bytes"[..]));
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with one key.
    ///
    /// Useful for testing recovery scenarios.
    #[must_use]
    pub fn with_entry(key: &str, value: Vec<u8>) -> Self {
        let store = Self::default();
        store.entries.write().insert(key.to_owned(), value);
        store
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if no keys are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        validate_key(key)?;
        Ok(self.entries.read().get(key).cloned())
    }

    fn write(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        validate_key(key)?;
        self.entries.write().insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.entries.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;

    #[test]
    fn memory_new_is_empty() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.read("ledger").unwrap(), None);
    }

    #[test]
    fn memory_write_then_read() {
        let store = MemoryStore::new();
        store.write("ledger", b"hello").unwrap();
        assert_eq!(store.read("ledger").unwrap().as_deref(), Some(&b"hello"[..]));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn memory_write_replaces_value() {
        let store = MemoryStore::new();
        store.write("ledger", b"first").unwrap();
        store.write("ledger", b"second").unwrap();
        assert_eq!(store.read("ledger").unwrap().as_deref(), Some(&b"second"[..]));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn memory_keys_are_independent() {
        let store = MemoryStore::new();
        store.write("ledger", b"records").unwrap();
        store.write("cursor", b"watermark").unwrap();
        assert_eq!(store.read("ledger").unwrap().as_deref(), Some(&b"records"[..]));
        assert_eq!(store.read("cursor").unwrap().as_deref(), Some(&b"watermark"[..]));
    }

    #[test]
    fn memory_remove_deletes_key() {
        let store = MemoryStore::new();
        store.write("ledger", b"data").unwrap();
        store.remove("ledger").unwrap();
        assert_eq!(store.read("ledger").unwrap(), None);
    }

    #[test]
    fn memory_remove_absent_key_is_noop() {
        let store = MemoryStore::new();
        assert!(store.remove("missing").is_ok());
    }

    #[test]
    fn memory_empty_value_round_trips() {
        let store = MemoryStore::new();
        store.write("empty", b"").unwrap();
        assert_eq!(store.read("empty").unwrap().as_deref(), Some(&b""[..]));
    }

    #[test]
    fn memory_invalid_key_is_rejected() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.write("a/b", b"x"),
            Err(StorageError::KeyName { .. })
        ));
        assert!(store.read("").is_err());
    }

    #[test]
    fn memory_with_entry_preloads() {
        let store = MemoryStore::with_entry("ledger", b"preloaded".to_vec());
        assert_eq!(
            store.read("ledger").unwrap().as_deref(),
            Some(&b"preloaded"[..])
        );
    }

    #[test]
    fn memory_shared_across_threads() {
        use std::sync::Arc;

        let store = Arc::new(MemoryStore::new());
        let writer = Arc::clone(&store);
        let handle = std::thread::spawn(move || {
            writer.write("ledger", b"from thread").unwrap();
        });
        handle.join().unwrap();
        assert_eq!(
            store.read("ledger").unwrap().as_deref(),
            Some(&b"from thread"[..])
        );
    }
}
