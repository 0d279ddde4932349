//! Property-based test generators using proptest.
//!
//! Provides strategies for generating scan workloads that stay within the
//! ledger's input contract.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use scanledger_core::Courier;

/// Fixed base instant for generated timestamps.
///
/// Deterministic so day-bucket assertions in property tests are stable.
pub fn timestamp_base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0)
        .single()
        .expect("valid base timestamp")
}

/// Strategy for normalized receipt codes.
pub fn code_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Z0-9]{6,14}").expect("valid code regex")
}

/// Strategy for raw operator input: a valid code wrapped in the noise a
/// barcode scanner or keyboard produces (padding, lowercase).
pub fn raw_code_strategy() -> impl Strategy<Value = String> {
    (code_strategy(), any::<bool>(), any::<bool>()).prop_map(|(code, pad, lower)| {
        let code = if lower { code.to_lowercase() } else { code };
        if pad {
            format!("  {code} ")
        } else {
            code
        }
    })
}

/// Strategy for courier labels drawn from a realistic roster.
pub fn courier_strategy() -> impl Strategy<Value = Courier> {
    prop_oneof![
        Just("SHOPEE"),
        Just("LAZADA"),
        Just("J&T"),
        Just("FLASH"),
        Just("NINJAVAN"),
        Just("KERRY"),
    ]
    .prop_map(|label| Courier::new(label).expect("roster labels are valid"))
}

/// Strategy for capture timestamps spread over a four-day window.
pub fn timestamp_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4, 0i64..86_400).prop_map(|(day, secs)| {
        timestamp_base() + Duration::days(day) + Duration::seconds(secs)
    })
}

/// One step of a randomized ledger workload.
#[derive(Debug, Clone)]
pub enum ScanOp {
    /// Capture a scan.
    Scan {
        /// Raw operator input.
        raw_code: String,
        /// Courier the code is scanned under.
        courier: Courier,
        /// Capture instant.
        at: DateTime<Utc>,
    },
    /// Remove the nth live record, if it exists.
    RemoveNth(usize),
    /// Remove all duplicate-flagged records.
    Dedupe,
    /// Remove everything.
    Clear,
}

/// Strategy for single workload steps, weighted towards captures.
pub fn scan_op_strategy() -> impl Strategy<Value = ScanOp> {
    prop_oneof![
        6 => (raw_code_strategy(), courier_strategy(), timestamp_strategy())
            .prop_map(|(raw_code, courier, at)| ScanOp::Scan { raw_code, courier, at }),
        2 => (0usize..32).prop_map(ScanOp::RemoveNth),
        1 => Just(ScanOp::Dedupe),
        1 => Just(ScanOp::Clear),
    ]
}

/// Strategy for a sequence of workload steps.
pub fn op_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<ScanOp>> {
    prop::collection::vec(scan_op_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
