//! The scan ledger: authoritative record collection with snapshot
//! persistence.

use crate::config::LedgerConfig;
use crate::error::CoreResult;
use crate::policy::ScanPolicy;
use crate::record::{Courier, RecordId, ScanRecord};
use crate::summary::{CourierCount, LedgerSummary};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use scanledger_storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;

/// Persisted snapshot shape: the whole collection plus the ordinal counter.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    records: Vec<ScanRecord>,
    next_ordinal: u64,
}

/// Mutable ledger state, guarded by one lock.
#[derive(Debug, Clone)]
struct LedgerInner {
    /// Records, most-recent-first.
    records: VecDeque<ScanRecord>,
    /// Next ordinal to assign. Starts at 1 and never decreases, including
    /// across `clear`.
    next_ordinal: u64,
}

impl Default for LedgerInner {
    fn default() -> Self {
        Self {
            records: VecDeque::new(),
            next_ordinal: 1,
        }
    }
}

impl LedgerInner {
    fn from_snapshot(snapshot: Snapshot) -> Self {
        // A hand-edited or stale snapshot may carry a counter behind its
        // own records; reconcile so ordinals are never reused.
        let max_ordinal = snapshot.records.iter().map(|r| r.ordinal).max();
        let floor = max_ordinal.map_or(1, |m| m + 1);
        Self {
            records: snapshot.records.into(),
            next_ordinal: snapshot.next_ordinal.max(floor),
        }
    }

    fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            records: self.records.iter().cloned().collect(),
            next_ordinal: self.next_ordinal,
        }
    }
}

/// The scan ledger.
///
/// `Ledger` owns the authoritative collection of [`ScanRecord`]s,
/// most-recent-first, and persists the whole collection to its storage
/// collaborator on every mutation, before the mutating call returns.
///
/// # Concurrency
///
/// All operations take `&self`; a single internal `RwLock` serializes
/// mutations, and classification, insertion, and persistence happen under
/// one write hold. The in-memory state advances only after the snapshot is
/// durable, so a failed persist leaves the ledger unchanged.
///
/// # Recovery
///
/// An unreadable snapshot yields an empty ledger with a warning rather
/// than a failed open. The accepted degraded mode is data loss, never a
/// crash loop.
///
/// # Example
///
/// ```rust
/// use scanledger_core::{Courier, Ledger, LedgerConfig};
/// use scanledger_storage::MemoryStore;
/// use std::sync::Arc;
///
/// let ledger = Ledger::open(Arc::new(MemoryStore::new()), LedgerConfig::default()).unwrap();
/// let record = ledger.scan("abc123", Courier::new("SHOPEE").unwrap()).unwrap();
/// assert_eq!(record.code, "ABC123");
/// assert_eq!(record.sequence, 1);
/// ```
pub struct Ledger {
    store: Arc<dyn KeyValueStore>,
    policy: ScanPolicy,
    snapshot_key: String,
    inner: RwLock<LedgerInner>,
}

impl Ledger {
    /// Opens a ledger over the given store, restoring the persisted
    /// snapshot when one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read. A snapshot that reads
    /// but does not parse is treated as absent (see Recovery above).
    pub fn open(store: Arc<dyn KeyValueStore>, config: LedgerConfig) -> CoreResult<Self> {
        let inner = match store.read(&config.snapshot_key)? {
            Some(bytes) => match serde_json::from_slice::<Snapshot>(&bytes) {
                Ok(snapshot) => LedgerInner::from_snapshot(snapshot),
                Err(err) => {
                    tracing::warn!(
                        key = %config.snapshot_key,
                        error = %err,
                        "ledger snapshot unreadable, starting empty"
                    );
                    LedgerInner::default()
                }
            },
            None => LedgerInner::default(),
        };

        tracing::debug!(
            records = inner.records.len(),
            next_ordinal = inner.next_ordinal,
            "ledger opened"
        );

        Ok(Self {
            store,
            policy: ScanPolicy::new(config.day_offset),
            snapshot_key: config.snapshot_key,
            inner: RwLock::new(inner),
        })
    }

    /// Returns the classification policy this ledger applies.
    #[must_use]
    pub fn policy(&self) -> &ScanPolicy {
        &self.policy
    }

    /// Records a scan captured now.
    ///
    /// Classification and insertion happen atomically under one write
    /// hold: no interleaving can observe the gap between them.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::EmptyCode`] for a blank code, or a
    /// storage error if the snapshot could not be persisted. Either way
    /// the ledger is unchanged.
    pub fn scan(&self, raw_code: &str, courier: Courier) -> CoreResult<ScanRecord> {
        self.scan_at(raw_code, courier, Utc::now())
    }

    /// Records a scan captured at an explicit timestamp.
    ///
    /// # Errors
    ///
    /// Same as [`Ledger::scan`].
    pub fn scan_at(
        &self,
        raw_code: &str,
        courier: Courier,
        now: DateTime<Utc>,
    ) -> CoreResult<ScanRecord> {
        let mut inner = self.inner.write();
        let record = self
            .policy
            .classify(raw_code, courier, now, inner.records.iter())?;
        self.commit_insert(&mut inner, record)
    }

    /// Inserts an already-classified record, assigning its ordinal.
    ///
    /// The record's `ordinal` field is overwritten with the next counter
    /// value; everything else is stored as given. Use [`Ledger::scan`] for
    /// the normal capture path.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the snapshot could not be persisted; the
    /// ledger is then unchanged.
    pub fn insert(&self, record: ScanRecord) -> CoreResult<ScanRecord> {
        let mut inner = self.inner.write();
        self.commit_insert(&mut inner, record)
    }

    /// Removes the record with the given id.
    ///
    /// Returns `false` without touching storage when the id is absent.
    /// Surviving records keep their sequence numbers.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the snapshot could not be persisted; the
    /// ledger is then unchanged.
    pub fn remove(&self, id: RecordId) -> CoreResult<bool> {
        let mut inner = self.inner.write();
        let Some(index) = inner.records.iter().position(|r| r.id == id) else {
            return Ok(false);
        };

        let mut next = inner.clone();
        next.records.remove(index);
        self.persist(&next)?;
        *inner = next;
        Ok(true)
    }

    /// Removes every record flagged as a duplicate.
    ///
    /// Returns the number of records removed. A second immediate call
    /// removes zero: originals are never flagged.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the snapshot could not be persisted; the
    /// ledger is then unchanged.
    pub fn remove_duplicates(&self) -> CoreResult<usize> {
        let mut inner = self.inner.write();
        let removed = inner.records.iter().filter(|r| r.duplicate).count();
        if removed == 0 {
            return Ok(0);
        }

        let mut next = inner.clone();
        next.records.retain(|r| !r.duplicate);
        self.persist(&next)?;
        *inner = next;
        Ok(removed)
    }

    /// Removes all records.
    ///
    /// The ordinal counter is preserved: ordinals are never reused, so
    /// the sync cursor stays meaningful across a clear.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the snapshot could not be persisted; the
    /// ledger is then unchanged.
    pub fn clear(&self) -> CoreResult<()> {
        let mut inner = self.inner.write();
        let mut next = inner.clone();
        next.records.clear();
        self.persist(&next)?;
        *inner = next;
        Ok(())
    }

    /// Rewrites the snapshot from the current state.
    ///
    /// Every mutation already persists synchronously; this exists for
    /// callers that want an explicit flush, e.g. after recovering from a
    /// corrupt snapshot warning.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails.
    pub fn save(&self) -> CoreResult<()> {
        let inner = self.inner.read();
        self.persist(&inner)
    }

    /// Returns all records, most-recent-first.
    #[must_use]
    pub fn records(&self) -> Vec<ScanRecord> {
        self.inner.read().records.iter().cloned().collect()
    }

    /// Returns the records for one courier, most-recent-first.
    #[must_use]
    pub fn records_for(&self, courier: &Courier) -> Vec<ScanRecord> {
        self.inner
            .read()
            .records
            .iter()
            .filter(|r| &r.courier == courier)
            .cloned()
            .collect()
    }

    /// Returns all records oldest-first, the order export surfaces
    /// consume.
    ///
    /// Sorted by capture time with the insertion ordinal as tie-breaker,
    /// so the order is total even when timestamps collide.
    #[must_use]
    pub fn chronological(&self) -> Vec<ScanRecord> {
        let mut all: Vec<ScanRecord> = self.inner.read().records.iter().cloned().collect();
        all.sort_by(|a, b| {
            a.observed_at
                .cmp(&b.observed_at)
                .then(a.ordinal.cmp(&b.ordinal))
        });
        all
    }

    /// Looks up a record by id.
    #[must_use]
    pub fn find(&self, id: RecordId) -> Option<ScanRecord> {
        self.inner.read().records.iter().find(|r| r.id == id).cloned()
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    /// Returns `true` if the ledger holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().records.is_empty()
    }

    /// Returns the next ordinal that will be assigned.
    #[must_use]
    pub fn next_ordinal(&self) -> u64 {
        self.inner.read().next_ordinal
    }

    /// Returns aggregate counts for summary and status surfaces.
    ///
    /// Couriers appear in first-seen (oldest-first) order.
    #[must_use]
    pub fn summary(&self) -> LedgerSummary {
        let inner = self.inner.read();
        let mut couriers: Vec<CourierCount> = Vec::new();
        let mut duplicates = 0usize;

        for record in inner.records.iter().rev() {
            if record.duplicate {
                duplicates += 1;
            }
            match couriers.iter_mut().find(|c| c.courier == record.courier) {
                Some(count) => {
                    count.records += 1;
                    if record.duplicate {
                        count.duplicates += 1;
                    }
                }
                None => couriers.push(CourierCount {
                    courier: record.courier.clone(),
                    records: 1,
                    duplicates: usize::from(record.duplicate),
                }),
            }
        }

        LedgerSummary {
            total: inner.records.len(),
            duplicates,
            couriers,
        }
    }

    /// Assigns the next ordinal, prepends, and persists.
    ///
    /// Commits to memory only after the snapshot write succeeded.
    fn commit_insert(
        &self,
        inner: &mut LedgerInner,
        mut record: ScanRecord,
    ) -> CoreResult<ScanRecord> {
        let mut next = inner.clone();
        record.ordinal = next.next_ordinal;
        next.next_ordinal += 1;
        next.records.push_front(record.clone());

        self.persist(&next)?;
        *inner = next;

        tracing::debug!(
            id = %record.id,
            code = %record.code,
            sequence = record.sequence,
            ordinal = record.ordinal,
            duplicate = record.duplicate,
            "record inserted"
        );
        Ok(record)
    }

    fn persist(&self, inner: &LedgerInner) -> CoreResult<()> {
        let bytes = serde_json::to_vec(&inner.to_snapshot())?;
        self.store.write(&self.snapshot_key, &bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use chrono::{FixedOffset, TimeZone};
    use scanledger_storage::{FileStore, MemoryStore, StorageError, StorageResult};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn utc_config() -> LedgerConfig {
        LedgerConfig::new().day_offset(FixedOffset::east_opt(0).unwrap())
    }

    fn open_mem() -> (Arc<MemoryStore>, Ledger) {
        let store = Arc::new(MemoryStore::new());
        let ledger = Ledger::open(store.clone(), utc_config()).unwrap();
        (store, ledger)
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    fn courier(label: &str) -> Courier {
        Courier::new(label).unwrap()
    }

    #[test]
    fn scan_assigns_sequence_and_ordinal() {
        let (_, ledger) = open_mem();

        let first = ledger.scan_at("one", courier("A"), at(4, 8)).unwrap();
        let second = ledger.scan_at("two", courier("B"), at(4, 9)).unwrap();

        assert_eq!(first.sequence, 1);
        assert_eq!(first.ordinal, 1);
        assert_eq!(second.sequence, 2);
        assert_eq!(second.ordinal, 2);

        // Most recent first.
        let records = ledger.records();
        assert_eq!(records[0].id, second.id);
        assert_eq!(records[1].id, first.id);
    }

    #[test]
    fn duplicate_scenario_with_deletion() {
        let (_, ledger) = open_mem();

        let first = ledger.scan_at("abc123", courier("A"), at(4, 8)).unwrap();
        assert_eq!(first.code, "ABC123");
        assert!(!first.duplicate);
        assert_eq!(first.sequence, 1);

        let rescan = ledger.scan_at(" ABC123 ", courier("B"), at(4, 9)).unwrap();
        assert!(rescan.duplicate);
        assert_eq!(rescan.sequence, 2);

        // Deleting the original neither renumbers the survivor nor clears
        // its flag.
        assert!(ledger.remove(first.id).unwrap());
        let survivor = ledger.find(rescan.id).unwrap();
        assert_eq!(survivor.sequence, 2);
        assert!(survivor.duplicate);

        let next = ledger.scan_at("xyz", courier("A"), at(4, 10)).unwrap();
        assert_eq!(next.sequence, 3);
    }

    #[test]
    fn blank_code_leaves_ledger_untouched() {
        let (store, ledger) = open_mem();

        let result = ledger.scan_at("   ", courier("A"), at(4, 8));
        assert!(matches!(result, Err(CoreError::EmptyCode)));
        assert!(ledger.is_empty());
        assert_eq!(ledger.next_ordinal(), 1);
        // Nothing was persisted either.
        assert_eq!(store.read("ledger.json").unwrap(), None);
    }

    #[test]
    fn remove_absent_id_is_noop() {
        let (store, ledger) = open_mem();
        assert!(!ledger.remove(RecordId::new()).unwrap());
        assert_eq!(store.read("ledger.json").unwrap(), None);
    }

    #[test]
    fn remove_duplicates_removes_exactly_the_flagged() {
        let (_, ledger) = open_mem();

        let keep1 = ledger.scan_at("aaa", courier("A"), at(4, 8)).unwrap();
        let dup1 = ledger.scan_at("aaa", courier("A"), at(4, 9)).unwrap();
        let keep2 = ledger.scan_at("bbb", courier("B"), at(4, 10)).unwrap();
        let dup2 = ledger.scan_at("bbb", courier("A"), at(4, 11)).unwrap();

        assert_eq!(ledger.remove_duplicates().unwrap(), 2);
        assert!(ledger.find(keep1.id).is_some());
        assert!(ledger.find(keep2.id).is_some());
        assert!(ledger.find(dup1.id).is_none());
        assert!(ledger.find(dup2.id).is_none());

        // Second pass finds nothing: originals are never flagged.
        assert_eq!(ledger.remove_duplicates().unwrap(), 0);
    }

    #[test]
    fn clear_preserves_ordinal_counter() {
        let (_, ledger) = open_mem();

        ledger.scan_at("one", courier("A"), at(4, 8)).unwrap();
        ledger.scan_at("two", courier("A"), at(4, 9)).unwrap();
        ledger.clear().unwrap();

        assert!(ledger.is_empty());
        assert_eq!(ledger.next_ordinal(), 3);

        // Sequences restart with the empty day, ordinals do not.
        let record = ledger.scan_at("three", courier("A"), at(4, 10)).unwrap();
        assert_eq!(record.sequence, 1);
        assert_eq!(record.ordinal, 3);
    }

    #[test]
    fn reopen_restores_records_and_counter() {
        let store = Arc::new(MemoryStore::new());
        {
            let ledger = Ledger::open(store.clone(), utc_config()).unwrap();
            ledger.scan_at("one", courier("A"), at(4, 8)).unwrap();
            ledger.scan_at("two", courier("B"), at(4, 9)).unwrap();
        }

        let reopened = Ledger::open(store, utc_config()).unwrap();
        let records = reopened.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].code, "TWO");
        assert_eq!(records[1].code, "ONE");
        assert_eq!(reopened.next_ordinal(), 3);
    }

    #[test]
    fn corrupt_snapshot_recovers_empty() {
        let store = Arc::new(MemoryStore::new());
        store.write("ledger.json", b"{ this is not json").unwrap();

        let ledger = Ledger::open(store.clone(), utc_config()).unwrap();
        assert!(ledger.is_empty());
        assert_eq!(ledger.next_ordinal(), 1);

        // The next scan overwrites the corrupt snapshot.
        ledger.scan_at("fresh", courier("A"), at(4, 8)).unwrap();
        let reopened = Ledger::open(store, utc_config()).unwrap();
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn stale_counter_in_snapshot_is_reconciled() {
        let store = Arc::new(MemoryStore::new());
        let snapshot = serde_json::json!({
            "records": [{
                "id": "11111111-1111-1111-1111-111111111111",
                "code": "OLD",
                "courier": "A",
                "observedAt": "2024-05-04T08:00:00Z",
                "duplicate": false,
                "sequence": 1,
                "ordinal": 7
            }],
            "nextOrdinal": 2
        });
        store
            .write("ledger.json", snapshot.to_string().as_bytes())
            .unwrap();

        let ledger = Ledger::open(store, utc_config()).unwrap();
        assert_eq!(ledger.next_ordinal(), 8);
    }

    #[test]
    fn records_for_filters_by_courier() {
        let (_, ledger) = open_mem();

        ledger.scan_at("one", courier("A"), at(4, 8)).unwrap();
        ledger.scan_at("two", courier("B"), at(4, 9)).unwrap();
        ledger.scan_at("three", courier("a"), at(4, 10)).unwrap();

        let for_a = ledger.records_for(&courier("A"));
        assert_eq!(for_a.len(), 2);
        assert_eq!(for_a[0].code, "THREE");
        assert_eq!(for_a[1].code, "ONE");
    }

    #[test]
    fn chronological_sorts_oldest_first() {
        let (_, ledger) = open_mem();

        // Wall clock moving backwards between scans must not break the
        // view's ordering.
        ledger.scan_at("late", courier("A"), at(4, 12)).unwrap();
        ledger.scan_at("early", courier("A"), at(4, 8)).unwrap();
        ledger.scan_at("middle", courier("A"), at(4, 10)).unwrap();

        let codes: Vec<_> = ledger
            .chronological()
            .into_iter()
            .map(|r| r.code)
            .collect();
        assert_eq!(codes, vec!["EARLY", "MIDDLE", "LATE"]);
    }

    #[test]
    fn chronological_breaks_timestamp_ties_by_ordinal() {
        let (_, ledger) = open_mem();

        let now = at(4, 8);
        let a = ledger.scan_at("a", courier("A"), now).unwrap();
        let b = ledger.scan_at("b", courier("A"), now).unwrap();

        let ordered = ledger.chronological();
        assert_eq!(ordered[0].id, a.id);
        assert_eq!(ordered[1].id, b.id);
    }

    #[test]
    fn summary_counts_by_courier_in_first_seen_order() {
        let (_, ledger) = open_mem();

        ledger.scan_at("one", courier("B"), at(4, 8)).unwrap();
        ledger.scan_at("two", courier("A"), at(4, 9)).unwrap();
        ledger.scan_at("one", courier("A"), at(4, 10)).unwrap();

        let summary = ledger.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.couriers.len(), 2);
        assert_eq!(summary.couriers[0].courier.as_str(), "B");
        assert_eq!(summary.couriers[0].records, 1);
        assert_eq!(summary.couriers[0].duplicates, 0);
        assert_eq!(summary.couriers[1].courier.as_str(), "A");
        assert_eq!(summary.couriers[1].records, 2);
        assert_eq!(summary.couriers[1].duplicates, 1);
    }

    #[test]
    fn save_rewrites_snapshot() {
        let (store, ledger) = open_mem();

        ledger.scan_at("one", courier("A"), at(4, 8)).unwrap();
        store.remove("ledger.json").unwrap();

        ledger.save().unwrap();
        let bytes = store.read("ledger.json").unwrap().unwrap();
        let snapshot: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(snapshot["records"].as_array().unwrap().len(), 1);
        assert_eq!(snapshot["nextOrdinal"], 2);
    }

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();

        {
            let store = Arc::new(FileStore::open(dir.path()).unwrap());
            let ledger = Ledger::open(store, utc_config()).unwrap();
            ledger.scan_at("abc123", courier("SHOPEE"), at(4, 8)).unwrap();
            ledger.scan_at("abc123", courier("J&T"), at(4, 9)).unwrap();
        }

        let store = Arc::new(FileStore::open(dir.path()).unwrap());
        let ledger = Ledger::open(store, utc_config()).unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.summary().duplicates, 1);
        assert_eq!(ledger.next_ordinal(), 3);
    }

    /// Store wrapper that fails writes on demand.
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: AtomicBool,
    }

    impl FlakyStore {
        fn new() -> Self {
            Self {
                inner: MemoryStore::new(),
                fail_writes: AtomicBool::new(false),
            }
        }

        fn fail_next_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }
    }

    impl KeyValueStore for FlakyStore {
        fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
            self.inner.read(key)
        }

        fn write(&self, key: &str, value: &[u8]) -> StorageResult<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StorageError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "injected write failure",
                )));
            }
            self.inner.write(key, value)
        }

        fn remove(&self, key: &str) -> StorageResult<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn failed_persist_leaves_ledger_unchanged() {
        let store = Arc::new(FlakyStore::new());
        let ledger = Ledger::open(store.clone(), utc_config()).unwrap();

        ledger.scan_at("one", courier("A"), at(4, 8)).unwrap();

        store.fail_next_writes(true);
        assert!(ledger.scan_at("two", courier("A"), at(4, 9)).is_err());
        assert!(ledger.clear().is_err());

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.next_ordinal(), 2);

        // Once storage recovers, the ordinal that was never committed is
        // handed out cleanly.
        store.fail_next_writes(false);
        let record = ledger.scan_at("two", courier("A"), at(4, 10)).unwrap();
        assert_eq!(record.ordinal, 2);
        assert_eq!(record.sequence, 2);
    }
}
