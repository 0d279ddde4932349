//! Remove command implementation.

use scanledger_core::RecordId;
use std::path::Path;

/// Runs the remove command.
pub fn run(data_dir: &Path, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let record_id: RecordId = id.parse()?;
    let (_store, ledger) = super::open_ledger(data_dir)?;

    // Captured before removal so the confirmation can name the record.
    let record = ledger.find(record_id);
    if ledger.remove(record_id)? {
        match record {
            Some(record) => println!(
                "✓ removed {} #{} ({})",
                record.code, record.sequence, record.courier
            ),
            None => println!("✓ removed {record_id}"),
        }
        Ok(())
    } else {
        Err(format!("no record with id {record_id}").into())
    }
}
