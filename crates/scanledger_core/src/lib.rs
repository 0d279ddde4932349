//! # Scanledger Core
//!
//! Core engine for the scan ledger: a local-first record of scanned parcel
//! receipt codes with duplicate detection and per-day numbering.
//!
//! This crate provides:
//! - [`ScanRecord`], [`RecordId`] and [`Courier`] - the data model
//! - [`ScanPolicy`] - normalization, duplicate detection, day numbering
//! - [`Ledger`] - the authoritative collection with snapshot persistence
//! - Read-only views for summary, filtered, and export surfaces
//!
//! ## Design Principles
//!
//! - One local writer: a single lock serializes mutations, and each
//!   mutation persists the whole snapshot before returning
//! - Records are immutable once captured; duplicate flags and sequence
//!   numbers are derived at capture time and never recomputed
//! - Corruption degrades to an empty ledger, never a failed open
//!
//! ## Example
//!
//! ```rust
//! use scanledger_core::{Courier, Ledger, LedgerConfig};
//! use scanledger_storage::MemoryStore;
//! use std::sync::Arc;
//!
//! let ledger = Ledger::open(Arc::new(MemoryStore::new()), LedgerConfig::default()).unwrap();
//!
//! let first = ledger.scan(" abc123 ", Courier::new("SHOPEE").unwrap()).unwrap();
//! assert_eq!(first.code, "ABC123");
//! assert!(!first.duplicate);
//!
//! let again = ledger.scan("abc123", Courier::new("J&T").unwrap()).unwrap();
//! assert!(again.duplicate);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod ledger;
mod policy;
mod record;
mod summary;

pub use config::{local_day_offset, LedgerConfig};
pub use error::{CoreError, CoreResult};
pub use ledger::Ledger;
pub use policy::ScanPolicy;
pub use record::{Courier, RecordId, ScanRecord};
pub use summary::{CourierCount, LedgerSummary};

/// Crate version, surfaced by operator tooling.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
