use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One line of a TVL snapshot report.
///
/// Field names match the report columns:
/// `user, vault, block, position, lpvalue, lpvalueusd`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub user: String,
    /// Pool or vault identifier.
    pub vault: String,
    pub block: u64,
    /// Position identifier, or the number of positions folded into the row.
    pub position: String,
    /// Value in native LP units.
    pub lpvalue: Decimal,
    /// Value in USD.
    pub lpvalueusd: Decimal,
}
