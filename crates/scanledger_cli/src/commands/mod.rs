//! CLI command implementations.

pub mod clear;
pub mod dedupe;
pub mod list;
pub mod remove;
pub mod scan;
pub mod status;
pub mod summary;
pub mod sync;

use scanledger_core::{Ledger, LedgerConfig};
use scanledger_storage::{FileStore, KeyValueStore};
use std::path::Path;
use std::sync::Arc;

/// Opens the on-disk store and the ledger over it.
///
/// Returned as a pair because sync and status also read the cursor from
/// the same store. The store handle holds the process lock for the life
/// of the command.
fn open_ledger(
    data_dir: &Path,
) -> Result<(Arc<dyn KeyValueStore>, Arc<Ledger>), Box<dyn std::error::Error>> {
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(data_dir)?);
    let ledger = Arc::new(Ledger::open(Arc::clone(&store), LedgerConfig::default())?);
    Ok((store, ledger))
}
