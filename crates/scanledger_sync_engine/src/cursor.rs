//! Persistent sync cursor.
//!
//! The cursor remembers the last record the remote has confirmed, keyed by
//! the ledger's store-lifetime ordinal. It advances only after a successful
//! acknowledgment, which is what makes delivery at-least-once: anything the
//! remote has not confirmed is still above the watermark and will be resent.

use crate::error::SyncResult;
use chrono::{DateTime, Utc};
use scanledger_storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Position of the newest record the remote has acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Watermark {
    /// Store-lifetime ordinal of the acknowledged record.
    pub ordinal: u64,
    /// Capture timestamp of that record, kept for operator display.
    pub observed_at: DateTime<Utc>,
}

impl Watermark {
    /// Creates a watermark.
    #[must_use]
    pub fn new(ordinal: u64, observed_at: DateTime<Utc>) -> Self {
        Self {
            ordinal,
            observed_at,
        }
    }
}

/// Store-backed cursor state.
///
/// A corrupt or missing cursor degrades to "never synced", which resends
/// history the remote deduplicates by record id. That trades bandwidth for
/// never silently skipping records.
pub struct SyncCursor {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl SyncCursor {
    /// Creates a cursor persisted under `key` in `store`.
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Loads the persisted watermark.
    ///
    /// Returns `None` when no cursor has been written yet or when the
    /// stored bytes do not parse.
    ///
    /// # Errors
    ///
    /// Returns an error if the store read fails.
    pub fn load(&self) -> SyncResult<Option<Watermark>> {
        let Some(bytes) = self.store.read(&self.key)? else {
            return Ok(None);
        };
        match serde_json::from_slice(&bytes) {
            Ok(mark) => Ok(Some(mark)),
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "cursor unreadable, treating as never synced");
                Ok(None)
            }
        }
    }

    /// Persists `mark` as the new watermark.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the store write fails.
    pub fn advance(&self, mark: Watermark) -> SyncResult<()> {
        let bytes = serde_json::to_vec(&mark)?;
        self.store.write(&self.key, &bytes)?;
        Ok(())
    }

    /// Removes the persisted watermark, forcing a full resend.
    ///
    /// # Errors
    ///
    /// Returns an error if the store removal fails.
    pub fn clear(&self) -> SyncResult<()> {
        self.store.remove(&self.key)?;
        Ok(())
    }
}
