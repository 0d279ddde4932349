//! Summary command implementation.

use scanledger_core::LedgerSummary;
use std::path::Path;

/// Runs the summary command.
pub fn run(data_dir: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (_store, ledger) = super::open_ledger(data_dir)?;
    let summary = ledger.summary();

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        _ => print_text(&summary),
    }

    Ok(())
}

fn print_text(summary: &LedgerSummary) {
    println!("Scan Ledger Summary");
    println!("===================");
    println!();
    println!("  Records:    {}", summary.total);
    println!("  Duplicates: {}", summary.duplicates);

    if !summary.couriers.is_empty() {
        println!();
        println!("Couriers:");
        for count in &summary.couriers {
            if count.duplicates > 0 {
                println!(
                    "  {:<10} {} record(s), {} duplicate(s)",
                    count.courier, count.records, count.duplicates
                );
            } else {
                println!("  {:<10} {} record(s)", count.courier, count.records);
            }
        }
    }
}
