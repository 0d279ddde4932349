//! Wire messages for the delta-sync exchange.
//!
//! The remote store is a JSON webhook: the engine POSTs one batch per sync
//! cycle and reads back one acknowledgment. Field names are fixed by the
//! remote's contract; timestamps travel as RFC 3339 strings.

use crate::error::ProtocolResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One record as it travels to the remote store.
///
/// The local store-lifetime ordinal is deliberately absent: it is a cursor
/// key private to the sender, not part of the remote contract. The `id` is
/// the idempotency key the remote deduplicates redeliveries by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRecord {
    /// Record identifier, the remote's idempotency key.
    pub id: Uuid,
    /// Per-day sequence number.
    pub sequence: u32,
    /// Normalized receipt code.
    pub code: String,
    /// Courier category label.
    pub courier: String,
    /// Capture timestamp.
    pub observed_at: DateTime<Utc>,
    /// Whether the sender flagged this record as a duplicate.
    pub duplicate: bool,
}

/// A batch of records pushed in one sync cycle.
///
/// Encodes as a bare JSON array, ordered by the sender: ascending
/// `(sequence, observed_at)` so remote ingestion order matches the
/// operator-visible numbering.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncBatch {
    /// The records, in transmission order.
    pub records: Vec<BatchRecord>,
}

impl SyncBatch {
    /// Creates a batch from records already in transmission order.
    #[must_use]
    pub fn new(records: Vec<BatchRecord>) -> Self {
        Self { records }
    }

    /// Returns the number of records in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the batch carries no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Encodes to JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn encode(&self) -> ProtocolResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decodes from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a JSON array of records.
    pub fn decode(bytes: &[u8]) -> ProtocolResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// The remote store's reply to a pushed batch.
///
/// `success` defaults to `false` when absent, so a reply that parses but
/// omits the field counts as a rejection rather than a malformed message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Acknowledgment {
    /// Whether the remote accepted the batch.
    #[serde(default)]
    pub success: bool,

    /// Number of records newly ingested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added: Option<u64>,

    /// Number of records skipped as already known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<u64>,

    /// Human-readable detail, set on rejection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Acknowledgment {
    /// Creates a successful acknowledgment with ingest counts.
    #[must_use]
    pub fn accepted(added: u64, skipped: u64) -> Self {
        Self {
            success: true,
            added: Some(added),
            skipped: Some(skipped),
            message: None,
        }
    }

    /// Creates a rejection with a reason.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            added: None,
            skipped: None,
            message: Some(message.into()),
        }
    }

    /// Encodes to JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn encode(&self) -> ProtocolResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decodes from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a JSON object.
    pub fn decode(bytes: &[u8]) -> ProtocolResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
