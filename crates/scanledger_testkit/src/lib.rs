//! # Scanledger Testkit
//!
//! Test utilities for the scan ledger.
//!
//! This crate provides:
//! - Test fixtures and ledger helpers
//! - Property-based test generators using proptest
//! - An in-process reference remote honoring the webhook contract
//! - Invariant checkers for randomized workloads
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scanledger_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_ledger() {
//!     with_temp_ledger(|ledger| {
//!         ledger.scan("PKG001", test_courier("SHOPEE")).unwrap();
//!         assert_eq!(ledger.len(), 1);
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod invariants;
pub mod remote;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::invariants::*;
    pub use crate::remote::*;
}

pub use fixtures::*;
pub use generators::*;
pub use invariants::*;
pub use remote::*;
