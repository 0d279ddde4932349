//! Clear command implementation.

use std::path::Path;

/// Runs the clear command.
pub fn run(data_dir: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (_store, ledger) = super::open_ledger(data_dir)?;

    let count = ledger.len();
    if count == 0 {
        println!("Ledger is already empty.");
        return Ok(());
    }
    if !force {
        return Err(format!(
            "refusing to remove {count} record(s); pass --force to clear the ledger"
        )
        .into());
    }

    ledger.clear()?;
    println!("✓ cleared {count} record(s)");

    Ok(())
}
