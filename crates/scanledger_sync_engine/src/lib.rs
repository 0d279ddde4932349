//! # Scanledger Sync Engine
//!
//! Delta-sync state machine for the scan ledger.
//!
//! This crate provides:
//! - Sync state machine (idle → preparing → transmitting → committing)
//! - Persistent cursor management
//! - HTTP transport abstraction over a pluggable client
//! - Mock transport for testing
//!
//! ## Architecture
//!
//! The engine implements a **one-way push** model: records the remote has
//! not yet acknowledged are collected into a single batch, POSTed to a JSON
//! webhook, and the cursor advances only after the remote confirms.
//!
//! ## Key Invariants
//!
//! - The remote store is authoritative once a record is acknowledged
//! - The cursor never advances past an unconfirmed record
//! - Delivery is at-least-once; the remote deduplicates by record id
//! - One cycle in flight at a time; a concurrent start is rejected
//! - No retry loop inside the engine: a failed cycle leaves the delta
//!   intact and the caller decides when to run the next one

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod cursor;
mod error;
mod http;
mod state;
mod transport;

pub use config::{SyncConfig, DEFAULT_CURSOR_KEY};
pub use cursor::{SyncCursor, Watermark};
pub use error::{SyncError, SyncResult};
pub use http::{HttpClient, HttpReply, HttpTransport};
pub use state::{CommitSummary, SyncEngine, SyncOutcome, SyncState, SyncStats};
pub use transport::{MockTransport, SyncTransport};
