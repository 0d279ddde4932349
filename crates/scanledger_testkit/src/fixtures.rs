//! Test fixtures and ledger helpers.
//!
//! Provides convenience functions for setting up test ledgers and common
//! scenarios.

use scanledger_core::{Courier, Ledger, LedgerConfig};
use scanledger_storage::{FileStore, KeyValueStore, MemoryStore};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// A test ledger with automatic cleanup.
///
/// Keeps the backing store accessible so engines and cursors can share it,
/// the way production code shares one store directory.
pub struct TestLedger {
    /// The ledger instance.
    pub ledger: Arc<Ledger>,
    /// The store backing it.
    pub store: Arc<dyn KeyValueStore>,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestLedger {
    /// Creates an in-memory test ledger.
    pub fn memory() -> Self {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let ledger =
            Ledger::open(store.clone(), LedgerConfig::default()).expect("open memory ledger");
        Self {
            ledger: Arc::new(ledger),
            store,
            _temp_dir: None,
        }
    }

    /// Creates a file-backed test ledger in a temporary directory.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("create temp directory");
        let store: Arc<dyn KeyValueStore> =
            Arc::new(FileStore::open(temp_dir.path()).expect("open file store"));
        let ledger =
            Ledger::open(store.clone(), LedgerConfig::default()).expect("open file ledger");
        Self {
            ledger: Arc::new(ledger),
            store,
            _temp_dir: Some(temp_dir),
        }
    }

    /// Returns the store directory if file-backed, `None` if in-memory.
    pub fn path(&self) -> Option<&Path> {
        self._temp_dir.as_ref().map(TempDir::path)
    }

    /// Drops the ledger (and, for file stores, the directory lock) and
    /// opens a fresh one over the same data.
    ///
    /// Reopens with the default configuration; what survives is whatever
    /// the snapshot persisted.
    pub fn reopen(self) -> Self {
        let Self {
            ledger,
            store,
            _temp_dir,
        } = self;
        drop(ledger);
        match _temp_dir {
            Some(temp_dir) => {
                drop(store);
                let store: Arc<dyn KeyValueStore> =
                    Arc::new(FileStore::open(temp_dir.path()).expect("reopen file store"));
                let ledger = Ledger::open(store.clone(), LedgerConfig::default())
                    .expect("reopen file ledger");
                Self {
                    ledger: Arc::new(ledger),
                    store,
                    _temp_dir: Some(temp_dir),
                }
            }
            None => {
                let ledger = Ledger::open(store.clone(), LedgerConfig::default())
                    .expect("reopen memory ledger");
                Self {
                    ledger: Arc::new(ledger),
                    store,
                    _temp_dir: None,
                }
            }
        }
    }
}

impl std::ops::Deref for TestLedger {
    type Target = Ledger;

    fn deref(&self) -> &Self::Target {
        &self.ledger
    }
}

/// Runs a test with a temporary in-memory ledger.
///
/// # Example
///
/// ```rust,ignore
/// use scanledger_testkit::with_temp_ledger;
///
/// #[test]
/// fn my_test() {
///     with_temp_ledger(|ledger| {
///         ledger.scan("PKG001", test_courier("SHOPEE")).unwrap();
///         assert_eq!(ledger.len(), 1);
///     });
/// }
/// ```
pub fn with_temp_ledger<F, R>(f: F) -> R
where
    F: FnOnce(&Ledger) -> R,
{
    let test = TestLedger::memory();
    f(&test.ledger)
}

/// Runs a test with a temporary file-backed ledger.
pub fn with_file_ledger<F, R>(f: F) -> R
where
    F: FnOnce(&Ledger, &Path) -> R,
{
    let test = TestLedger::file();
    let path = test.path().expect("file ledger has a path").to_path_buf();
    f(&test.ledger, &path)
}

/// Builds a courier label, panicking on invalid input.
pub fn test_courier(label: &str) -> Courier {
    Courier::new(label).expect("valid courier label")
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates a ledger with `count` distinct codes scanned for one courier.
    pub fn populated_ledger(count: usize) -> TestLedger {
        let test = TestLedger::memory();
        for i in 0..count {
            test.ledger
                .scan(&format!("PKG{i:04}"), test_courier("SHOPEE"))
                .expect("scan fixture code");
        }
        test
    }

    /// Creates a ledger where every code in `codes` was scanned twice,
    /// so the second capture of each pair carries the duplicate flag.
    pub fn duplicated_ledger(codes: &[&str]) -> TestLedger {
        let test = TestLedger::memory();
        for code in codes {
            test.ledger
                .scan(code, test_courier("SHOPEE"))
                .expect("scan fixture code");
        }
        for code in codes {
            test.ledger
                .scan(code, test_courier("FLASH"))
                .expect("rescan fixture code");
        }
        test
    }
}
