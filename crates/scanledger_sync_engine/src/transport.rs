//! Transport layer abstraction for sync operations.

use crate::error::{SyncError, SyncResult};
use parking_lot::Mutex;
use scanledger_sync_protocol::{Acknowledgment, SyncBatch};

/// A sync transport delivers one batch to the remote store and returns the
/// remote's acknowledgment.
///
/// This trait abstracts the network layer, allowing different
/// implementations (HTTP, in-process remotes, mocks for testing). The
/// webhook exchange is stateless, so there is no connection lifecycle.
pub trait SyncTransport: Send + Sync {
    /// Delivers `batch` to `endpoint` and returns the parsed acknowledgment.
    ///
    /// Returning `Ok` says nothing about acceptance: the caller must still
    /// inspect [`Acknowledgment::success`].
    ///
    /// # Errors
    ///
    /// Returns an error when delivery fails or the reply is not a readable
    /// acknowledgment.
    fn send(&self, endpoint: &str, batch: &SyncBatch) -> SyncResult<Acknowledgment>;
}

/// What the mock answers on the next send.
#[derive(Debug, Default)]
enum Script {
    /// Accept every batch, reporting all records as newly added.
    #[default]
    AcceptAll,
    /// Answer with a fixed acknowledgment.
    Reply(Acknowledgment),
    /// Fail at the transport level.
    Fail(String),
    /// Answer with a non-success HTTP status.
    Status(u16),
}

/// A mock transport for testing.
///
/// Accepts every batch by default and records everything it was asked to
/// send, including batches whose delivery was scripted to fail.
#[derive(Debug, Default)]
pub struct MockTransport {
    script: Mutex<Script>,
    sent: Mutex<Vec<SyncBatch>>,
}

impl MockTransport {
    /// Creates a mock that acknowledges every batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a fixed acknowledgment for subsequent sends.
    pub fn respond_with(&self, ack: Acknowledgment) {
        *self.script.lock() = Script::Reply(ack);
    }

    /// Scripts a transport-level failure for subsequent sends.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.script.lock() = Script::Fail(message.into());
    }

    /// Scripts a non-success HTTP status for subsequent sends.
    pub fn fail_with_status(&self, status: u16) {
        *self.script.lock() = Script::Status(status);
    }

    /// Restores the default accept-everything behavior.
    pub fn recover(&self) {
        *self.script.lock() = Script::AcceptAll;
    }

    /// Returns every batch handed to [`SyncTransport::send`], oldest first.
    pub fn sent(&self) -> Vec<SyncBatch> {
        self.sent.lock().clone()
    }

    /// Returns how many sends were attempted.
    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }
}

impl SyncTransport for MockTransport {
    fn send(&self, _endpoint: &str, batch: &SyncBatch) -> SyncResult<Acknowledgment> {
        self.sent.lock().push(batch.clone());
        match &*self.script.lock() {
            Script::AcceptAll => Ok(Acknowledgment::accepted(batch.len() as u64, 0)),
            Script::Reply(ack) => Ok(ack.clone()),
            Script::Fail(message) => Err(SyncError::transport(message.clone())),
            Script::Status(status) => Err(SyncError::HttpStatus { status: *status }),
        }
    }
}
