//! Status command implementation.

use scanledger_core::{Ledger, LedgerSummary};
use scanledger_sync_engine::{SyncCursor, Watermark, DEFAULT_CURSOR_KEY};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Ledger and sync state as one report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    /// Store directory.
    pub path: String,
    /// Aggregate record counts.
    pub summary: LedgerSummary,
    /// Next ordinal the ledger will assign.
    pub next_ordinal: u64,
    /// Persisted cursor position, if any cycle ever committed.
    pub cursor: Option<Watermark>,
    /// Records a sync cycle would push right now.
    pub pending: usize,
}

/// Runs the status command.
pub fn run(data_dir: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (store, ledger) = super::open_ledger(data_dir)?;

    let cursor = SyncCursor::new(Arc::clone(&store), DEFAULT_CURSOR_KEY).load()?;
    let report = StatusReport {
        path: data_dir.display().to_string(),
        summary: ledger.summary(),
        next_ordinal: ledger.next_ordinal(),
        cursor,
        pending: pending_count(&ledger, cursor),
    };

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print_text(&report),
    }

    Ok(())
}

/// Counts records a sync cycle would push right now.
///
/// Mirrors the engine's delta rule, including the clamp: a cursor at or
/// past the ledger's own counter means the snapshot was reset, and the
/// next cycle starts over from nothing.
fn pending_count(ledger: &Ledger, cursor: Option<Watermark>) -> usize {
    let floor = match cursor {
        Some(mark) if mark.ordinal >= ledger.next_ordinal() => 0,
        Some(mark) => mark.ordinal,
        None => 0,
    };
    ledger
        .records()
        .iter()
        .filter(|record| record.ordinal > floor)
        .count()
}

fn print_text(report: &StatusReport) {
    println!("Scan Ledger Status");
    println!("==================");
    println!();
    println!("Ledger:");
    println!("  Path:       {}", report.path);
    println!(
        "  Records:    {} ({} duplicates)",
        report.summary.total, report.summary.duplicates
    );
    for count in &report.summary.couriers {
        println!("  {:<11} {}", format!("{}:", count.courier), count.records);
    }
    println!();
    println!("Sync:");
    match &report.cursor {
        Some(mark) => println!(
            "  Cursor:     ordinal {} (through {})",
            mark.ordinal,
            mark.observed_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        None => println!("  Cursor:     never synced"),
    }
    println!("  Pending:    {} record(s)", report.pending);
}
