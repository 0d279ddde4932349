//! Configuration for the sync engine.

/// Default storage key for the persisted cursor.
pub const DEFAULT_CURSOR_KEY: &str = "cursor.json";

/// Configuration for sync cycles.
///
/// The endpoint is optional: a ledger can run local-only indefinitely, and
/// a cycle started without an endpoint reports that instead of failing.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Remote webhook URL, or `None` for local-only operation.
    pub endpoint: Option<String>,
    /// Storage key the cursor watermark is persisted under.
    pub cursor_key: String,
}

impl SyncConfig {
    /// Creates a configuration with no endpoint and the default cursor key.
    pub fn new() -> Self {
        Self {
            endpoint: None,
            cursor_key: DEFAULT_CURSOR_KEY.to_string(),
        }
    }

    /// Sets the remote endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the cursor storage key.
    #[must_use]
    pub fn with_cursor_key(mut self, key: impl Into<String>) -> Self {
        self.cursor_key = key.into();
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}
