//! Ledger configuration.

use chrono::{FixedOffset, Local};

/// Returns the host's current local UTC offset.
///
/// Captured once per call; ledgers hold on to the value they were opened
/// with so day bucketing stays stable for their whole lifetime.
#[must_use]
pub fn local_day_offset() -> FixedOffset {
    *Local::now().offset()
}

/// Configuration for opening a ledger.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Storage key the snapshot is persisted under.
    pub snapshot_key: String,

    /// UTC offset used to bucket records into calendar days for
    /// per-day numbering.
    pub day_offset: FixedOffset,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            snapshot_key: "ledger.json".to_owned(),
            day_offset: local_day_offset(),
        }
    }
}

impl LedgerConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the storage key for the snapshot.
    #[must_use]
    pub fn snapshot_key(mut self, key: impl Into<String>) -> Self {
        self.snapshot_key = key.into();
        self
    }

    /// Sets the UTC offset used for day bucketing.
    #[must_use]
    pub const fn day_offset(mut self, offset: FixedOffset) -> Self {
        self.day_offset = offset;
        self
    }
}
