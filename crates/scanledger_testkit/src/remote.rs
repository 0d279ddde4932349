//! In-process reference implementation of the remote store contract.
//!
//! `MemoryRemote` behaves the way the real webhook must: it ingests batches
//! keyed by record id, stays idempotent under redelivery, and reports added
//! versus skipped counts. Integration tests drive the whole sync path
//! against it without a network.

use parking_lot::Mutex;
use scanledger_sync_protocol::{Acknowledgment, BatchRecord, SyncBatch};
use uuid::Uuid;

/// Scripted misbehavior for the next request.
#[derive(Debug, Clone)]
enum Breakage {
    /// Answer with this HTTP status and an empty body.
    Status(u16),
    /// Answer 200 with a rejection acknowledgment.
    Reject(String),
    /// Answer 200 with bytes that do not parse as an acknowledgment.
    Garble,
    /// Ingest the batch normally, then lose the acknowledgment.
    DropAck,
}

/// An in-memory remote store honoring the webhook contract.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    records: Mutex<Vec<BatchRecord>>,
    known: Mutex<std::collections::HashSet<Uuid>>,
    requests: Mutex<u64>,
    breakage: Mutex<Option<Breakage>>,
}

impl MemoryRemote {
    /// Creates an empty remote.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next request fail with `status` before ingesting anything.
    pub fn fail_once_with_status(&self, status: u16) {
        *self.breakage.lock() = Some(Breakage::Status(status));
    }

    /// Makes the next request answer a rejection without ingesting anything.
    pub fn reject_once(&self, message: impl Into<String>) {
        *self.breakage.lock() = Some(Breakage::Reject(message.into()));
    }

    /// Makes the next request answer unparsable bytes without ingesting.
    pub fn garble_once(&self) {
        *self.breakage.lock() = Some(Breakage::Garble);
    }

    /// Makes the next request ingest normally but lose its acknowledgment.
    ///
    /// This is the interesting at-least-once case: the remote has the
    /// records, the sender does not know it, and the redelivery must come
    /// back entirely as skips.
    pub fn drop_ack_once(&self) {
        *self.breakage.lock() = Some(Breakage::DropAck);
    }

    /// Handles one POSTed batch, returning the HTTP status and body.
    pub fn handle_post(&self, body: &[u8]) -> (u16, Vec<u8>) {
        *self.requests.lock() += 1;

        let mut drop_ack = false;
        if let Some(breakage) = self.breakage.lock().take() {
            match breakage {
                Breakage::Status(status) => return (status, Vec::new()),
                Breakage::Reject(message) => {
                    let ack = Acknowledgment::rejected(message)
                        .encode()
                        .expect("acknowledgment encodes");
                    return (200, ack);
                }
                Breakage::Garble => return (200, b"<garbage>".to_vec()),
                Breakage::DropAck => drop_ack = true,
            }
        }

        let Ok(batch) = SyncBatch::decode(body) else {
            let ack = Acknowledgment::rejected("unreadable batch")
                .encode()
                .expect("acknowledgment encodes");
            return (400, ack);
        };

        let mut added = 0u64;
        let mut skipped = 0u64;
        {
            let mut known = self.known.lock();
            let mut records = self.records.lock();
            for record in batch.records {
                if known.insert(record.id) {
                    records.push(record);
                    added += 1;
                } else {
                    skipped += 1;
                }
            }
        }

        if drop_ack {
            return (200, b"<garbage>".to_vec());
        }
        let ack = Acknowledgment::accepted(added, skipped)
            .encode()
            .expect("acknowledgment encodes");
        (200, ack)
    }

    /// Returns every ingested record, oldest first.
    pub fn records(&self) -> Vec<BatchRecord> {
        self.records.lock().clone()
    }

    /// Returns whether a record id has been ingested.
    pub fn contains(&self, id: Uuid) -> bool {
        self.known.lock().contains(&id)
    }

    /// Returns the number of ingested records.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns `true` when nothing has been ingested.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Returns how many requests were handled, including failed ones.
    pub fn request_count(&self) -> u64 {
        *self.requests.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(code: &str) -> BatchRecord {
        BatchRecord {
            id: Uuid::new_v4(),
            sequence: 1,
            code: code.to_string(),
            courier: "SHOPEE".to_string(),
            observed_at: Utc::now(),
            duplicate: false,
        }
    }

    fn post(remote: &MemoryRemote, batch: &SyncBatch) -> Acknowledgment {
        let (status, body) = remote.handle_post(&batch.encode().unwrap());
        assert_eq!(status, 200);
        Acknowledgment::decode(&body).unwrap()
    }

    #[test]
    fn ingests_new_records() {
        let remote = MemoryRemote::new();
        let batch = SyncBatch::new(vec![record("AAA"), record("BBB")]);

        let ack = post(&remote, &batch);
        assert!(ack.success);
        assert_eq!(ack.added, Some(2));
        assert_eq!(ack.skipped, Some(0));
        assert_eq!(remote.len(), 2);
    }

    #[test]
    fn redelivery_is_idempotent() {
        let remote = MemoryRemote::new();
        let batch = SyncBatch::new(vec![record("AAA")]);

        post(&remote, &batch);
        let ack = post(&remote, &batch);

        assert!(ack.success);
        assert_eq!(ack.added, Some(0));
        assert_eq!(ack.skipped, Some(1));
        assert_eq!(remote.len(), 1);
        assert_eq!(remote.request_count(), 2);
    }

    #[test]
    fn partial_overlap_counts_both_ways() {
        let remote = MemoryRemote::new();
        let shared = record("AAA");
        post(&remote, &SyncBatch::new(vec![shared.clone()]));

        let ack = post(&remote, &SyncBatch::new(vec![shared, record("BBB")]));
        assert_eq!(ack.added, Some(1));
        assert_eq!(ack.skipped, Some(1));
        assert_eq!(remote.len(), 2);
    }

    #[test]
    fn unreadable_body_is_a_400() {
        let remote = MemoryRemote::new();
        let (status, body) = remote.handle_post(b"{not a batch");
        assert_eq!(status, 400);
        let ack = Acknowledgment::decode(&body).unwrap();
        assert!(!ack.success);
        assert!(remote.is_empty());
    }

    #[test]
    fn scripted_status_fires_once() {
        let remote = MemoryRemote::new();
        remote.fail_once_with_status(503);

        let batch = SyncBatch::new(vec![record("AAA")]);
        let (status, _) = remote.handle_post(&batch.encode().unwrap());
        assert_eq!(status, 503);
        assert!(remote.is_empty());

        let ack = post(&remote, &batch);
        assert_eq!(ack.added, Some(1));
    }

    #[test]
    fn scripted_rejection_does_not_ingest() {
        let remote = MemoryRemote::new();
        remote.reject_once("maintenance window");

        let batch = SyncBatch::new(vec![record("AAA")]);
        let ack = post(&remote, &batch);
        assert!(!ack.success);
        assert_eq!(ack.message.as_deref(), Some("maintenance window"));
        assert!(remote.is_empty());
    }

    #[test]
    fn garbled_reply_is_unparsable() {
        let remote = MemoryRemote::new();
        remote.garble_once();

        let batch = SyncBatch::new(vec![record("AAA")]);
        let (status, body) = remote.handle_post(&batch.encode().unwrap());
        assert_eq!(status, 200);
        assert!(Acknowledgment::decode(&body).is_err());
        assert!(remote.is_empty());
    }

    #[test]
    fn dropped_ack_ingests_and_redelivery_skips() {
        let remote = MemoryRemote::new();
        remote.drop_ack_once();

        let batch = SyncBatch::new(vec![record("AAA"), record("BBB")]);
        let (status, body) = remote.handle_post(&batch.encode().unwrap());
        assert_eq!(status, 200);
        assert!(Acknowledgment::decode(&body).is_err());
        assert_eq!(remote.len(), 2);

        let ack = post(&remote, &batch);
        assert!(ack.success);
        assert_eq!(ack.added, Some(0));
        assert_eq!(ack.skipped, Some(2));
        assert_eq!(remote.len(), 2);
    }
}
