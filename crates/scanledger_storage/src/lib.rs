//! # Scanledger Storage
//!
//! Key-value snapshot storage for the scanledger workspace.
//!
//! This crate provides the lowest-level persistence abstraction for the
//! scan ledger. Stores are **opaque byte stores** keyed by name - they do
//! not interpret the data they hold.
//!
//! ## Design Principles
//!
//! - Stores are simple named-key byte stores (read, write, remove)
//! - No knowledge of ledger snapshots, cursors, or wire formats
//! - Writes replace whole values atomically
//! - Must be `Send + Sync` for concurrent access
//!
//! ## Available Stores
//!
//! - [`MemoryStore`] - For testing and ephemeral ledgers
//! - [`FileStore`] - For persistent storage in a locked directory
//!
//! ## Example
//!
//! ```rust
//! use scanledger_storage::{KeyValueStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store.write("ledger", b"snapshot").unwrap();
//! assert_eq!(store.read("ledger").unwrap().as_deref(), Some(&b"snapshot"[..]));
//! store.remove("ledger").unwrap();
//! assert_eq!(store.read("ledger").unwrap(), None);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod memory;
mod store;

pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::KeyValueStore;
