//! Scan command implementation.

use crate::config::CliConfig;
use std::io::{self, BufRead};
use std::path::Path;

/// Runs the scan command.
///
/// With codes on the command line each one is recorded in order. Without
/// codes the command becomes a scan loop, one code per stdin line until
/// EOF, which is what a keyboard-wedge barcode scanner feeds.
pub fn run(
    data_dir: &Path,
    config: &CliConfig,
    courier_label: &str,
    codes: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let courier = config.courier(courier_label)?;
    let (_store, ledger) = super::open_ledger(data_dir)?;

    let mut recorded = 0usize;
    let mut duplicates = 0usize;
    let mut failed = 0usize;

    let mut record_one = |raw: &str| match ledger.scan(raw, courier.clone()) {
        Ok(record) => {
            recorded += 1;
            if record.duplicate {
                duplicates += 1;
                println!("⚠ {} assigned #{} (duplicate)", record.code, record.sequence);
            } else {
                println!("✓ {} assigned #{}", record.code, record.sequence);
            }
        }
        Err(err) => {
            failed += 1;
            println!("✗ {raw:?} not recorded: {err}");
        }
    };

    if codes.is_empty() {
        println!("Scanning for {courier}. One code per line, Ctrl-D to finish.");
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = line?;
            // A stray Enter between scans is not a scan.
            if line.trim().is_empty() {
                continue;
            }
            record_one(&line);
        }
    } else {
        for code in &codes {
            record_one(code);
        }
    }

    if recorded + failed > 1 {
        println!();
        println!("{recorded} recorded, {duplicates} duplicate(s), {failed} failed");
    }

    if failed > 0 {
        return Err(format!("{failed} code(s) not recorded").into());
    }
    Ok(())
}
