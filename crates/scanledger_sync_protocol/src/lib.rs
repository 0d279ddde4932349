//! # Scanledger Sync Protocol
//!
//! Wire types for the scanledger delta-sync exchange.
//!
//! The protocol is deliberately narrow: per sync cycle the sender POSTs one
//! [`SyncBatch`] (a JSON array of [`BatchRecord`]s in sequence order) and
//! the remote replies with one [`Acknowledgment`]. The remote contract is
//! id-keyed and idempotent: redelivered records are skipped, not
//! duplicated, and the acknowledgment reports added vs skipped counts.
//!
//! This crate owns only the message shapes and their JSON codecs; cursor
//! handling and transport live in the sync engine.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod messages;

pub use error::{ProtocolError, ProtocolResult};
pub use messages::{Acknowledgment, BatchRecord, SyncBatch};
