//! Ledger summary counts.

use crate::record::Courier;
use serde::Serialize;

/// Aggregate counts over the ledger, for summary and status surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    /// Total number of records.
    pub total: usize,

    /// Number of records flagged as duplicates.
    pub duplicates: usize,

    /// Per-courier counts, in first-seen (oldest-first) order.
    pub couriers: Vec<CourierCount>,
}

/// Counts for one courier category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourierCount {
    /// The courier label.
    pub courier: Courier,

    /// Number of records scanned under this courier.
    pub records: usize,

    /// Number of those records flagged as duplicates.
    pub duplicates: usize,
}
