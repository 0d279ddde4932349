//! File-based key-value store for persistent storage.
//!
//! Layout of a store directory:
//!
//! ```text
//! <store_path>/
//! ├─ LOCK          # Advisory lock for single-writer
//! ├─ ledger.json   # One file per key
//! └─ cursor.json
//! ```
//!
//! The LOCK file ensures only one process writes the store at a time.
//! Each `write` goes through a hidden temp file and an atomic rename so a
//! crash never leaves a torn value under a key.

use crate::error::{StorageError, StorageResult};
use crate::store::{validate_key, KeyValueStore};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = "LOCK";

/// A file-based key-value store.
///
/// Each key is stored as one file inside a locked directory. Values survive
/// process restarts.
///
/// # Durability
///
/// Writes follow the write-then-rename pattern:
/// 1. Write the value to a hidden temp file
/// 2. Sync the temp file to disk
/// 3. Rename the temp file over the key file
/// 4. Fsync the directory so the rename itself is durable
///
/// # Thread Safety
///
/// The store is thread-safe within a process; across processes the LOCK
/// file enforces a single writer. Only one `FileStore` instance can exist
/// per directory at a time.
///
/// # Example
///
/// ```no_run
/// use scanledger_storage::{KeyValueStore, FileStore};
/// use std::path::Path;
///
/// let store = FileStore::open(Path::new("scan_data")).unwrap();
/// store.write("ledger.json", b"[]").unwrap();
/// ```
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Lock file handle (held for exclusive access).
    _lock_file: File,
}

impl FileStore {
    /// Opens or creates a store directory, acquiring its exclusive lock.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path exists but is not a directory
    /// - Another process holds the lock (returns [`StorageError::Locked`])
    /// - I/O errors occur
    pub fn open(path: &Path) -> StorageResult<Self> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        if !path.is_dir() {
            return Err(StorageError::Io(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("store path is not a directory: {}", path.display()),
            )));
        }

        let lock_path = path.join(LOCK_FILE);
        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        // Non-blocking: a second opener fails immediately.
        if lock_file.try_lock_exclusive().is_err() {
            return Err(StorageError::Locked);
        }

        Ok(Self {
            path: path.to_path_buf(),
            _lock_file: lock_file,
        })
    }

    /// Returns the path to the store directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.path.join(key)
    }

    /// Temp names start with '.' so they can never collide with a valid key.
    fn temp_path(&self, key: &str) -> PathBuf {
        self.path.join(format!(".tmp-{key}"))
    }

    /// Fsyncs the store directory so renames and removals are durable.
    ///
    /// On Windows directory fsync is not supported; the NTFS journal
    /// provides equivalent metadata durability, so it is skipped there.
    #[cfg(unix)]
    fn sync_directory(&self) -> StorageResult<()> {
        let dir = File::open(&self.path)?;
        dir.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_directory(&self) -> StorageResult<()> {
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        validate_key(key)?;
        match fs::read(self.key_path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        validate_key(key)?;
        let temp = self.temp_path(key);

        let mut file = File::create(&temp)?;
        file.write_all(value)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp, self.key_path(key))?;
        self.sync_directory()?;

        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        match fs::remove_file(self.key_path(key)) {
            Ok(()) => self.sync_directory(),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_open_creates_directory() {
        let temp = tempdir().unwrap();
        let store_path = temp.path().join("new_store");

        assert!(!store_path.exists());

        let store = FileStore::open(&store_path).unwrap();
        assert!(store_path.is_dir());
        assert_eq!(store.path(), store_path);
    }

    #[test]
    fn file_open_fails_on_non_directory() {
        let temp = tempdir().unwrap();
        let file_path = temp.path().join("plain_file");
        fs::write(&file_path, b"not a dir").unwrap();

        assert!(FileStore::open(&file_path).is_err());
    }

    #[test]
    fn file_write_then_read() {
        let temp = tempdir().unwrap();
        let store = FileStore::open(temp.path()).unwrap();

        store.write("ledger.json", b"[1,2,3]").unwrap();
        assert_eq!(
            store.read("ledger.json").unwrap().as_deref(),
            Some(&b"[1,2,3]"[..])
        );
    }

    #[test]
    fn file_read_missing_key_is_none() {
        let temp = tempdir().unwrap();
        let store = FileStore::open(temp.path()).unwrap();

        assert_eq!(store.read("absent").unwrap(), None);
    }

    #[test]
    fn file_write_replaces_value() {
        let temp = tempdir().unwrap();
        let store = FileStore::open(temp.path()).unwrap();

        store.write("ledger.json", b"old").unwrap();
        store.write("ledger.json", b"new value").unwrap();
        assert_eq!(
            store.read("ledger.json").unwrap().as_deref(),
            Some(&b"new value"[..])
        );
    }

    #[test]
    fn file_write_leaves_no_temp_file() {
        let temp = tempdir().unwrap();
        let store = FileStore::open(temp.path()).unwrap();

        store.write("ledger.json", b"data").unwrap();

        let leftovers: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".tmp-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn file_remove_deletes_key() {
        let temp = tempdir().unwrap();
        let store = FileStore::open(temp.path()).unwrap();

        store.write("cursor.json", b"42").unwrap();
        store.remove("cursor.json").unwrap();
        assert_eq!(store.read("cursor.json").unwrap(), None);
    }

    #[test]
    fn file_remove_absent_key_is_noop() {
        let temp = tempdir().unwrap();
        let store = FileStore::open(temp.path()).unwrap();

        assert!(store.remove("never-written").is_ok());
    }

    #[test]
    fn file_persistence_across_reopen() {
        let temp = tempdir().unwrap();
        let store_path = temp.path().join("persist");

        {
            let store = FileStore::open(&store_path).unwrap();
            store.write("ledger.json", b"persistent data").unwrap();
        }

        {
            let store = FileStore::open(&store_path).unwrap();
            assert_eq!(
                store.read("ledger.json").unwrap().as_deref(),
                Some(&b"persistent data"[..])
            );
        }
    }

    #[test]
    fn file_lock_prevents_second_open() {
        let temp = tempdir().unwrap();
        let store_path = temp.path().join("locked");

        let _store = FileStore::open(&store_path).unwrap();

        let result = FileStore::open(&store_path);
        assert!(matches!(result, Err(StorageError::Locked)));
    }

    #[test]
    fn file_lock_released_on_drop() {
        let temp = tempdir().unwrap();
        let store_path = temp.path().join("reopen");

        {
            let _store = FileStore::open(&store_path).unwrap();
        }

        let _store2 = FileStore::open(&store_path).unwrap();
    }

    #[test]
    fn file_invalid_key_is_rejected() {
        let temp = tempdir().unwrap();
        let store = FileStore::open(temp.path()).unwrap();

        assert!(store.write("../escape", b"x").is_err());
        assert!(store.read(".hidden").is_err());
    }
}
