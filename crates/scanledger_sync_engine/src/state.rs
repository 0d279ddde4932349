//! Sync engine state machine.

use crate::config::SyncConfig;
use crate::cursor::{SyncCursor, Watermark};
use crate::error::{SyncError, SyncResult};
use crate::transport::SyncTransport;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use scanledger_core::{Ledger, ScanRecord};
use scanledger_storage::KeyValueStore;
use scanledger_sync_protocol::{BatchRecord, SyncBatch};
use std::sync::Arc;

/// The current state of the sync engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Engine is idle, no cycle has run since it was created.
    Idle,
    /// Engine is computing the pending delta.
    Preparing,
    /// Engine is delivering a batch to the remote.
    Transmitting,
    /// Engine is persisting the advanced cursor.
    Committing,
    /// The last cycle finished with nothing left to push.
    Synced,
    /// The last cycle failed.
    Error,
}

impl SyncState {
    /// Returns true while a cycle is running.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SyncState::Preparing | SyncState::Transmitting | SyncState::Committing
        )
    }

    /// Returns true if a new cycle may start.
    pub fn can_start(&self) -> bool {
        matches!(self, SyncState::Idle | SyncState::Synced | SyncState::Error)
    }
}

/// Statistics about sync cycles.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Cycles that committed a batch.
    pub cycles_completed: u64,
    /// Cycles that ended in an error.
    pub cycles_failed: u64,
    /// Total records in acknowledged batches.
    pub records_sent: u64,
    /// When the last batch was acknowledged.
    pub last_synced_at: Option<DateTime<Utc>>,
    /// Last cycle's error message, cleared by the next clean cycle.
    pub last_error: Option<String>,
}

/// What a committed cycle delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitSummary {
    /// Records in the delivered batch.
    pub sent: usize,
    /// Records the remote reported as newly ingested.
    pub added: u64,
    /// Records the remote reported as already known.
    pub skipped: u64,
    /// Cursor position after the commit.
    pub watermark: Watermark,
}

/// Terminal outcome of a sync cycle that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A batch was delivered, acknowledged, and the cursor advanced.
    Committed(CommitSummary),
    /// Every record was already acknowledged; nothing was sent.
    UpToDate,
    /// The ledger holds no records at all.
    Empty,
    /// No endpoint is configured; the transport was never touched.
    NotConfigured,
}

/// The sync engine pushes unacknowledged records to the remote store.
///
/// One-way and at-least-once: the cursor advances only after the remote
/// confirms a batch, so any failure leaves the whole delta in place to be
/// recomputed and resent by the next cycle. The remote deduplicates
/// redelivered records by id.
pub struct SyncEngine<T: SyncTransport> {
    config: SyncConfig,
    ledger: Arc<Ledger>,
    transport: Arc<T>,
    cursor: SyncCursor,
    state: RwLock<SyncState>,
    stats: RwLock<SyncStats>,
}

impl<T: SyncTransport> SyncEngine<T> {
    /// Creates an engine over `ledger`, persisting its cursor in `store`.
    ///
    /// The store is usually the same one backing the ledger, so the cursor
    /// lives next to the snapshot it tracks.
    pub fn new(
        ledger: Arc<Ledger>,
        store: Arc<dyn KeyValueStore>,
        transport: Arc<T>,
        config: SyncConfig,
    ) -> Self {
        let cursor = SyncCursor::new(store, config.cursor_key.clone());
        Self {
            config,
            ledger,
            transport,
            cursor,
            state: RwLock::new(SyncState::Idle),
            stats: RwLock::new(SyncStats::default()),
        }
    }

    /// Gets the current state.
    pub fn state(&self) -> SyncState {
        *self.state.read()
    }

    /// Gets the current stats.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Reads the persisted watermark without running a cycle.
    ///
    /// # Errors
    ///
    /// Returns an error if the cursor store cannot be read.
    pub fn watermark(&self) -> SyncResult<Option<Watermark>> {
        self.cursor.load()
    }

    /// Runs one sync cycle: claim, prepare, transmit, commit.
    ///
    /// Returns an informational [`SyncOutcome`] for cycles with nothing to
    /// do. Any `Err` leaves the cursor exactly where it was.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::CycleInFlight`] when another cycle is running,
    /// otherwise whatever failed the cycle: transport faults, non-success
    /// HTTP statuses, unreadable acknowledgments, a remote rejection, or a
    /// cursor persistence failure.
    pub fn sync(&self) -> SyncResult<SyncOutcome> {
        self.claim()?;
        match self.run_cycle() {
            Ok(outcome) => {
                self.finish(&outcome);
                Ok(outcome)
            }
            Err(err) => {
                self.handle_error(&err);
                Err(err)
            }
        }
    }

    /// Claims the engine for one cycle.
    ///
    /// Check and transition happen under a single write hold, so two racing
    /// callers cannot both pass the guard.
    fn claim(&self) -> SyncResult<()> {
        let mut state = self.state.write();
        if !state.can_start() {
            return Err(SyncError::CycleInFlight);
        }
        *state = SyncState::Preparing;
        Ok(())
    }

    fn run_cycle(&self) -> SyncResult<SyncOutcome> {
        if self.ledger.is_empty() {
            return Ok(SyncOutcome::Empty);
        }
        let Some(endpoint) = self.config.endpoint.as_deref() else {
            return Ok(SyncOutcome::NotConfigured);
        };

        let since = self.effective_cursor()?;
        let pending = self.collect_delta(since);
        let Some(top) = pending.iter().max_by_key(|record| record.ordinal) else {
            return Ok(SyncOutcome::UpToDate);
        };
        let mark = Watermark::new(top.ordinal, top.observed_at);

        tracing::debug!(records = pending.len(), endpoint, "pushing delta");
        self.set_state(SyncState::Transmitting);
        let ack = self.transport.send(endpoint, &to_batch(&pending))?;
        if !ack.success {
            let message = ack
                .message
                .unwrap_or_else(|| "no reason given".to_string());
            return Err(SyncError::rejected(message));
        }

        self.set_state(SyncState::Committing);
        self.cursor.advance(mark)?;
        let summary = CommitSummary {
            sent: pending.len(),
            added: ack.added.unwrap_or(0),
            skipped: ack.skipped.unwrap_or(0),
            watermark: mark,
        };
        tracing::info!(
            sent = summary.sent,
            added = summary.added,
            skipped = summary.skipped,
            ordinal = mark.ordinal,
            "batch acknowledged"
        );
        Ok(SyncOutcome::Committed(summary))
    }

    /// Loads the cursor, discarding one that is ahead of the ledger.
    ///
    /// A watermark past the ordinal counter can only mean the snapshot it
    /// was tracking is gone. Resending from the start is safe because the
    /// remote deduplicates by id; never syncing again would not be.
    fn effective_cursor(&self) -> SyncResult<Option<Watermark>> {
        let Some(mark) = self.cursor.load()? else {
            return Ok(None);
        };
        let next = self.ledger.next_ordinal();
        if mark.ordinal >= next {
            tracing::warn!(
                cursor = mark.ordinal,
                next_ordinal = next,
                "cursor is ahead of the ledger, resending from the start"
            );
            return Ok(None);
        }
        Ok(Some(mark))
    }

    /// Collects records above the watermark, in transmission order.
    fn collect_delta(&self, since: Option<Watermark>) -> Vec<ScanRecord> {
        let floor = since.map_or(0, |mark| mark.ordinal);
        let mut pending: Vec<ScanRecord> = self
            .ledger
            .records()
            .into_iter()
            .filter(|record| record.ordinal > floor)
            .collect();
        pending.sort_by_key(|record| (record.sequence, record.observed_at));
        pending
    }

    fn set_state(&self, state: SyncState) {
        *self.state.write() = state;
    }

    fn finish(&self, outcome: &SyncOutcome) {
        {
            let mut stats = self.stats.write();
            stats.last_error = None;
            if let SyncOutcome::Committed(summary) = outcome {
                stats.cycles_completed += 1;
                stats.records_sent += summary.sent as u64;
                stats.last_synced_at = Some(Utc::now());
            }
        }
        let state = match outcome {
            SyncOutcome::Committed(_) | SyncOutcome::UpToDate => SyncState::Synced,
            SyncOutcome::Empty | SyncOutcome::NotConfigured => SyncState::Idle,
        };
        self.set_state(state);
    }

    /// Handles an error by updating state and stats.
    fn handle_error(&self, error: &SyncError) {
        self.set_state(SyncState::Error);
        let mut stats = self.stats.write();
        stats.cycles_failed += 1;
        stats.last_error = Some(error.to_string());
    }
}

/// Converts ledger records to their wire shape, preserving order.
fn to_batch(records: &[ScanRecord]) -> SyncBatch {
    let records = records
        .iter()
        .map(|record| BatchRecord {
            id: record.id.to_uuid(),
            sequence: record.sequence,
            code: record.code.clone(),
            courier: record.courier.as_str().to_string(),
            observed_at: record.observed_at,
            duplicate: record.duplicate,
        })
        .collect();
    SyncBatch::new(records)
}
