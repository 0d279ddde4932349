//! `ureq`-backed HTTP client for the sync engine.

use scanledger_sync_engine::{HttpClient, HttpReply};
use std::io::Read;
use std::time::Duration;

/// Blocking HTTP client with a bounded per-request timeout.
///
/// Non-2xx responses come back as replies, not errors; the engine decides
/// what a status means. Only failures without a response at all (connect
/// errors, timeouts) map to `Err`.
pub struct UreqClient {
    agent: ureq::Agent,
}

impl UreqClient {
    /// Creates a client whose requests time out after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent }
    }
}

impl HttpClient for UreqClient {
    fn post(&self, url: &str, body: Vec<u8>) -> Result<HttpReply, String> {
        let result = self
            .agent
            .post(url)
            .set("Content-Type", "application/json")
            .send_bytes(&body);
        match result {
            Ok(response) => read_reply(response),
            Err(ureq::Error::Status(_, response)) => read_reply(response),
            Err(err) => Err(err.to_string()),
        }
    }
}

fn read_reply(response: ureq::Response) -> Result<HttpReply, String> {
    let status = response.status();
    let mut body = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut body)
        .map_err(|err| format!("reading response body: {err}"))?;
    Ok(HttpReply::new(status, body))
}
