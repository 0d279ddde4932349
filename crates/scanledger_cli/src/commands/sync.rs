//! Sync command implementation.

use crate::config::{CliConfig, ENDPOINT_ENV};
use crate::http::UreqClient;
use scanledger_sync_engine::{HttpTransport, SyncConfig, SyncEngine, SyncOutcome};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Runs the sync command: one push cycle against the configured endpoint.
pub fn run(
    data_dir: &Path,
    config: &CliConfig,
    endpoint: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (store, ledger) = super::open_ledger(data_dir)?;

    let mut sync_config = SyncConfig::new();
    if let Some(endpoint) = endpoint {
        info!("Syncing to {endpoint}");
        sync_config = sync_config.with_endpoint(endpoint);
    }

    let transport = HttpTransport::new(UreqClient::new(config.timeout()));
    let engine = SyncEngine::new(ledger, store, Arc::new(transport), sync_config);

    match engine.sync() {
        Ok(SyncOutcome::Committed(commit)) => {
            println!(
                "✓ pushed {} record(s): {} added, {} already present",
                commit.sent, commit.added, commit.skipped
            );
            println!("  cursor at ordinal {}", commit.watermark.ordinal);
            Ok(())
        }
        Ok(SyncOutcome::UpToDate) => {
            println!("✓ up to date; nothing to push");
            Ok(())
        }
        Ok(SyncOutcome::Empty) => {
            println!("Ledger is empty; nothing to sync.");
            Ok(())
        }
        Ok(SyncOutcome::NotConfigured) => Err(format!(
            "no endpoint configured; pass --endpoint, set {ENDPOINT_ENV}, \
             or add \"endpoint\" to the config file"
        )
        .into()),
        Err(err) => {
            println!("✗ sync failed: {err}");
            if err.is_retryable() {
                println!("  nothing was lost; run sync again to resend the batch");
            }
            Err("sync failed".into())
        }
    }
}
