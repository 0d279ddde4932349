//! Ledger invariant checking over randomized workloads.
//!
//! The checker asserts everything that must hold after *any* sequence of
//! operations: id and ordinal uniqueness, day-bucket sequence uniqueness,
//! and agreement between the in-memory state and what a reopen restores.

use crate::generators::ScanOp;
use chrono::NaiveDate;
use scanledger_core::{Ledger, RecordId};
use std::collections::{HashMap, HashSet};

/// Applies a workload to a ledger, resolving indices against live records.
///
/// Scans that classify cleanly are expected to succeed; removals of
/// out-of-range indices are skipped.
pub fn apply_ops(ledger: &Ledger, ops: &[ScanOp]) {
    for op in ops {
        match op {
            ScanOp::Scan {
                raw_code,
                courier,
                at,
            } => {
                ledger
                    .scan_at(raw_code, courier.clone(), *at)
                    .expect("generated scans are valid");
            }
            ScanOp::RemoveNth(n) => {
                if let Some(record) = ledger.records().get(*n) {
                    ledger.remove(record.id).expect("remove live record");
                }
            }
            ScanOp::Dedupe => {
                ledger.remove_duplicates().expect("dedupe");
            }
            ScanOp::Clear => {
                ledger.clear().expect("clear");
            }
        }
    }
}

/// Panics unless the ledger's structural invariants hold.
pub fn check_ledger_invariants(ledger: &Ledger) {
    let records = ledger.records();
    let next_ordinal = ledger.next_ordinal();
    let offset = ledger.policy().day_offset();

    assert_eq!(records.len(), ledger.len(), "len agrees with records()");
    assert_eq!(records.is_empty(), ledger.is_empty());

    let mut ids: HashSet<RecordId> = HashSet::new();
    let mut ordinals: HashSet<u64> = HashSet::new();
    let mut day_sequences: HashMap<NaiveDate, HashSet<u32>> = HashMap::new();

    for record in &records {
        assert!(ids.insert(record.id), "duplicate id {}", record.id);
        assert!(record.ordinal > 0, "stored records carry a positive ordinal");
        assert!(
            record.ordinal < next_ordinal,
            "ordinal {} not below counter {next_ordinal}",
            record.ordinal
        );
        assert!(
            ordinals.insert(record.ordinal),
            "duplicate ordinal {}",
            record.ordinal
        );
        assert!(record.sequence > 0, "sequence numbering starts at 1");
        assert!(
            day_sequences
                .entry(record.day(offset))
                .or_default()
                .insert(record.sequence),
            "sequence {} repeated within one day",
            record.sequence
        );
        assert!(!record.code.is_empty(), "stored codes are never empty");
        assert_eq!(
            record.code.trim().to_uppercase(),
            record.code,
            "stored codes are normalized"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{test_courier, TestLedger};
    use crate::generators::{
        code_strategy, op_sequence_strategy, raw_code_strategy, timestamp_base, timestamp_strategy,
        PropTestConfig,
    };
    use proptest::prelude::*;
    use scanledger_core::ScanPolicy;

    #[test]
    fn checker_accepts_a_clean_ledger() {
        let test = TestLedger::memory();
        test.scan("PKG001", test_courier("SHOPEE")).unwrap();
        test.scan("PKG002", test_courier("FLASH")).unwrap();
        check_ledger_invariants(&test);
    }

    proptest! {
        #![proptest_config(PropTestConfig::default().to_proptest_config())]

        #[test]
        fn random_workloads_preserve_invariants(ops in op_sequence_strategy(1, 40)) {
            let test = TestLedger::memory();
            apply_ops(&test, &ops);
            check_ledger_invariants(&test);

            // Whatever the workload did, a reopen restores it exactly.
            let before = test.records();
            let counter = test.next_ordinal();
            let test = test.reopen();
            prop_assert_eq!(test.records(), before);
            prop_assert_eq!(test.next_ordinal(), counter);
            check_ledger_invariants(&test);
        }

        #[test]
        fn same_day_scans_number_contiguously(
            codes in prop::collection::hash_set(code_strategy(), 1..20),
        ) {
            let test = TestLedger::memory();
            let at = timestamp_base();
            for code in &codes {
                test.scan_at(code, test_courier("SHOPEE"), at).unwrap();
            }

            let mut sequences: Vec<u32> =
                test.records().iter().map(|r| r.sequence).collect();
            sequences.sort_unstable();
            let expected: Vec<u32> = (1..=codes.len() as u32).collect();
            prop_assert_eq!(sequences, expected);
        }

        #[test]
        fn duplicate_flag_matches_live_codes(
            scans in prop::collection::vec(
                (raw_code_strategy(), timestamp_strategy()),
                1..25,
            ),
        ) {
            let test = TestLedger::memory();
            let mut live: HashSet<String> = HashSet::new();

            for (raw, at) in scans {
                let normalized = ScanPolicy::normalize_code(&raw);
                let expected = live.contains(&normalized);
                let record = test.scan_at(&raw, test_courier("SHOPEE"), at).unwrap();
                prop_assert_eq!(record.duplicate, expected);
                prop_assert_eq!(&record.code, &normalized);
                live.insert(normalized);
            }
        }
    }
}
