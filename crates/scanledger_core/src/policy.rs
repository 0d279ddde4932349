//! Deduplication and per-day numbering policy.

use crate::error::{CoreError, CoreResult};
use crate::record::{Courier, RecordId, ScanRecord};
use chrono::{DateTime, FixedOffset, Utc};

/// Classifies raw scans into [`ScanRecord`]s.
///
/// The policy owns the two derivation rules applied at capture time:
///
/// - **Duplicate detection**: a scan is a duplicate iff its normalized code
///   already exists among the records currently in the ledger, across every
///   courier and every day. The flag is computed once and never revisited.
/// - **Per-day numbering**: a scan's sequence is one more than the highest
///   sequence among records captured on the same calendar day, or 1 when
///   the day has none. Deletions never cause renumbering, so sequence
///   values stay stable once handed to an operator.
///
/// "Same calendar day" is evaluated against a fixed UTC offset captured at
/// construction, so numbering is deterministic across DST transitions and
/// in tests.
///
/// `classify` is a pure function of its inputs; the ledger composes it with
/// insertion under one write lock.
#[derive(Debug, Clone, Copy)]
pub struct ScanPolicy {
    day_offset: FixedOffset,
}

impl ScanPolicy {
    /// Creates a policy that buckets days at the given UTC offset.
    #[must_use]
    pub const fn new(day_offset: FixedOffset) -> Self {
        Self { day_offset }
    }

    /// Creates a policy using the host's local UTC offset.
    #[must_use]
    pub fn local() -> Self {
        Self::new(crate::config::local_day_offset())
    }

    /// Returns the offset used for day bucketing.
    #[must_use]
    pub const fn day_offset(&self) -> FixedOffset {
        self.day_offset
    }

    /// Normalizes a raw receipt code: trims surrounding whitespace and
    /// uppercases.
    #[must_use]
    pub fn normalize_code(raw: &str) -> String {
        raw.trim().to_uppercase()
    }

    /// Classifies a raw scan against the current ledger contents.
    ///
    /// Returns a fully-derived record with a fresh id, the normalized code,
    /// the duplicate flag, and the day sequence. The `ordinal` field is
    /// left at zero; the ledger assigns it on insertion.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyCode`] if the code is empty after
    /// normalization. No record is created.
    pub fn classify<'a, I>(
        &self,
        raw_code: &str,
        courier: Courier,
        now: DateTime<Utc>,
        current: I,
    ) -> CoreResult<ScanRecord>
    where
        I: IntoIterator<Item = &'a ScanRecord>,
    {
        let code = Self::normalize_code(raw_code);
        if code.is_empty() {
            return Err(CoreError::EmptyCode);
        }

        let today = now.with_timezone(&self.day_offset).date_naive();
        let mut duplicate = false;
        let mut day_max = 0u32;

        for record in current {
            if record.code == code {
                duplicate = true;
            }
            if record.day(self.day_offset) == today {
                day_max = day_max.max(record.sequence);
            }
        }

        Ok(ScanRecord {
            id: RecordId::new(),
            code,
            courier,
            observed_at: now,
            duplicate,
            sequence: day_max + 1,
            ordinal: 0,
        })
    }
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self::local()
    }
}
