//! HTTP transport implementation.
//!
//! The actual HTTP client is abstracted via a trait so different libraries
//! (ureq, reqwest, test doubles) can sit underneath the same transport.

use crate::error::{SyncError, SyncResult};
use crate::transport::SyncTransport;
use scanledger_sync_protocol::{Acknowledgment, SyncBatch};

/// A raw HTTP reply: status line plus body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    /// HTTP status code.
    pub status: u16,
    /// Response body, possibly empty.
    pub body: Vec<u8>,
}

impl HttpReply {
    /// Creates a reply.
    #[must_use]
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client abstraction.
///
/// Implementations POST `body` as `application/json` to `url` and return
/// whatever the server answered, including non-success statuses. Only
/// failures that produced no HTTP response at all (DNS, refused connection,
/// timeout) are reported as `Err`.
pub trait HttpClient: Send + Sync {
    /// Sends a POST request and returns the status and body.
    fn post(&self, url: &str, body: Vec<u8>) -> Result<HttpReply, String>;
}

/// HTTP-based sync transport.
///
/// Encodes batches as JSON, POSTs them to the endpoint given per send, and
/// parses the reply body as an [`Acknowledgment`].
pub struct HttpTransport<C: HttpClient> {
    client: C,
}

impl<C: HttpClient> HttpTransport<C> {
    /// Creates a transport over `client`.
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

impl<C: HttpClient> SyncTransport for HttpTransport<C> {
    fn send(&self, endpoint: &str, batch: &SyncBatch) -> SyncResult<Acknowledgment> {
        let body = batch.encode()?;
        let reply = self
            .client
            .post(endpoint, body)
            .map_err(SyncError::transport)?;
        if !reply.is_success() {
            return Err(SyncError::HttpStatus {
                status: reply.status,
            });
        }
        Acknowledgment::decode(&reply.body).map_err(|err| SyncError::malformed_ack(err.to_string()))
    }
}
