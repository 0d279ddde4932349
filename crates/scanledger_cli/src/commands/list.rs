//! List command implementation.

use crate::config::CliConfig;
use scanledger_core::{Ledger, ScanRecord};
use std::path::Path;

/// Runs the list command.
pub fn run(
    data_dir: &Path,
    config: &CliConfig,
    courier_label: Option<&str>,
    oldest_first: bool,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let (_store, ledger) = super::open_ledger(data_dir)?;

    let records = match (courier_label, oldest_first) {
        (Some(label), _) => {
            let courier = config.courier(label)?;
            let mut records = ledger.records_for(&courier);
            if oldest_first {
                records.reverse();
            }
            records
        }
        (None, true) => ledger.chronological(),
        (None, false) => ledger.records(),
    };

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&records)?),
        _ => print_table(&ledger, &records, oldest_first),
    }

    Ok(())
}

fn print_table(ledger: &Ledger, records: &[ScanRecord], oldest_first: bool) {
    if records.is_empty() {
        println!("No records.");
        return;
    }

    let order = if oldest_first {
        "oldest first"
    } else {
        "newest first"
    };
    println!("{} record(s), {order}:", records.len());

    // Timestamps render in the same offset the day numbering uses.
    let offset = ledger.policy().day_offset();
    for record in records {
        let observed = record.observed_at.with_timezone(&offset);
        let marker = if record.duplicate { "  (duplicate)" } else { "" };
        println!(
            "  #{:<4} {}  {:<10} {:<18} {}{marker}",
            record.sequence,
            observed.format("%Y-%m-%d %H:%M:%S"),
            record.courier,
            record.code,
            record.id,
        );
    }
}
