//! Scan record types.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a scan record.
///
/// Record IDs are random UUIDs that are:
/// - Unique within a ledger for its whole lifetime
/// - Immutable once assigned
/// - The idempotency key the remote store deduplicates by
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Creates a new random record ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a record ID from a UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Converts to a UUID.
    #[must_use]
    pub const fn to_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RecordId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<RecordId> for Uuid {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A courier category label.
///
/// The ledger treats couriers as opaque labels beyond equality: which
/// couriers are valid is configuration at the operator surface, never core
/// logic. Labels are trimmed and uppercased on construction so `"shopee"`
/// and `" SHOPEE "` group together.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Courier(String);

impl Courier {
    /// Creates a normalized courier label.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyCourier`] if the label is empty after
    /// trimming.
    pub fn new(label: impl AsRef<str>) -> CoreResult<Self> {
        let normalized = label.as_ref().trim().to_uppercase();
        if normalized.is_empty() {
            return Err(CoreError::EmptyCourier);
        }
        Ok(Self(normalized))
    }

    /// Returns the normalized label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Courier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Courier({})", self.0)
    }
}

impl fmt::Display for Courier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Courier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One scanned receipt event.
///
/// Records are immutable once created: `duplicate` and `sequence` are
/// computed at creation time and never recomputed, even when other records
/// are later removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    /// Unique identifier, assigned at creation.
    pub id: RecordId,

    /// Normalized receipt code (trimmed, uppercased). Not unique: the same
    /// parcel can legitimately be scanned more than once.
    pub code: String,

    /// Courier category the code was scanned under.
    pub courier: Courier,

    /// Capture timestamp.
    pub observed_at: DateTime<Utc>,

    /// Whether the code already existed among live records at creation time.
    pub duplicate: bool,

    /// Rank among records captured on the same calendar day, starting at 1.
    pub sequence: u32,

    /// Store-lifetime insertion counter, assigned by the ledger.
    ///
    /// Zero until the record is inserted; stored records always carry a
    /// positive ordinal. Ordinals are never reused, including across
    /// `clear`. This is the sync cursor key.
    pub ordinal: u64,
}

impl ScanRecord {
    /// Returns the calendar day this record was captured on, evaluated
    /// against the given UTC offset.
    #[must_use]
    pub fn day(&self, offset: FixedOffset) -> NaiveDate {
        self.observed_at.with_timezone(&offset).date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn record_id_new_is_unique() {
        let id1 = RecordId::new();
        let id2 = RecordId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn record_id_uuid_conversion() {
        let uuid = Uuid::new_v4();
        let id = RecordId::from_uuid(uuid);
        assert_eq!(id.to_uuid(), uuid);
    }

    #[test]
    fn record_id_parses_display_output() {
        let id = RecordId::new();
        let parsed: RecordId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn record_id_rejects_garbage() {
        assert!("not-a-uuid".parse::<RecordId>().is_err());
    }

    #[test]
    fn record_id_serializes_as_plain_string() {
        let id = RecordId::from_uuid(Uuid::nil());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
    }

    #[test]
    fn courier_normalizes_label() {
        let courier = Courier::new(" shopee ").unwrap();
        assert_eq!(courier.as_str(), "SHOPEE");
        assert_eq!(courier, Courier::new("SHOPEE").unwrap());
    }

    #[test]
    fn courier_rejects_blank_label() {
        assert!(matches!(Courier::new("   "), Err(CoreError::EmptyCourier)));
        assert!(Courier::new("").is_err());
    }

    #[test]
    fn courier_keeps_punctuation() {
        let courier = Courier::new("j&t").unwrap();
        assert_eq!(courier.as_str(), "J&T");
    }

    #[test]
    fn record_serde_uses_camel_case() {
        let record = ScanRecord {
            id: RecordId::from_uuid(Uuid::nil()),
            code: "ABC123".to_owned(),
            courier: Courier::new("SHOPEE").unwrap(),
            observed_at: Utc.with_ymd_and_hms(2024, 5, 4, 10, 30, 0).unwrap(),
            duplicate: false,
            sequence: 1,
            ordinal: 1,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["observedAt"], "2024-05-04T10:30:00Z");
        assert_eq!(json["duplicate"], false);
        assert_eq!(json["sequence"], 1);
        assert_eq!(json["ordinal"], 1);

        let back: ScanRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn day_respects_offset() {
        let record = ScanRecord {
            id: RecordId::new(),
            code: "X".to_owned(),
            courier: Courier::new("A").unwrap(),
            // 18:00 UTC is already the next day at UTC+7.
            observed_at: Utc.with_ymd_and_hms(2024, 5, 4, 18, 0, 0).unwrap(),
            duplicate: false,
            sequence: 1,
            ordinal: 1,
        };

        let utc = chrono::FixedOffset::east_opt(0).unwrap();
        let jakarta = chrono::FixedOffset::east_opt(7 * 3600).unwrap();
        assert_eq!(record.day(utc).to_string(), "2024-05-04");
        assert_eq!(record.day(jakarta).to_string(), "2024-05-05");
    }
}
