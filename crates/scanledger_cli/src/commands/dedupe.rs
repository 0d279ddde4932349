//! Dedupe command implementation.

use std::path::Path;

/// Runs the dedupe command.
pub fn run(data_dir: &Path, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (_store, ledger) = super::open_ledger(data_dir)?;

    if dry_run {
        let doomed: Vec<_> = ledger
            .records()
            .into_iter()
            .filter(|record| record.duplicate)
            .collect();
        if doomed.is_empty() {
            println!("No duplicates to remove.");
        } else {
            println!("Would remove {} duplicate(s):", doomed.len());
            for record in &doomed {
                println!("  {} #{} ({})", record.code, record.sequence, record.courier);
            }
        }
        return Ok(());
    }

    let removed = ledger.remove_duplicates()?;
    if removed == 0 {
        println!("No duplicates to remove.");
    } else {
        println!("✓ removed {removed} duplicate(s)");
    }

    Ok(())
}
