//! Run outcome and failure records.

use lp_tvl_data::SourceError;
use lp_tvl_domain::entities::SnapshotRow;
use lp_tvl_domain::error::ValuationError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors surfaced by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// The source failed for a block; the block produced no rows.
    #[error("source unavailable at block {block}: {source}")]
    SourceUnavailable {
        block: u64,
        #[source]
        source: SourceError,
    },
    /// The source returned a record it could not decode.
    #[error("position {position_id} could not be decoded: {source}")]
    Undecodable {
        position_id: String,
        #[source]
        source: SourceError,
    },
    /// Single-position lookup found nothing.
    #[error("position {position_id} not found at block {block}")]
    PositionNotFound { block: u64, position_id: String },
    #[error(transparent)]
    Valuation(#[from] ValuationError),
}

/// A block skipped because its positions could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockFailure {
    pub block: u64,
    pub error: SnapshotError,
}

/// A position left out of the report because it could not be decoded or
/// valued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionFailure {
    pub block: u64,
    pub position_id: String,
    pub reason: SnapshotError,
}

/// An `(owner, pool)` row left out of an aggregated report because its
/// summed liquidity does not fit a decimal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationFailure {
    pub block: u64,
    pub owner: String,
    pub pool_id: String,
    /// Positions folded into the dropped row.
    pub positions: usize,
}

/// Per-block counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSummary {
    pub block: u64,
    /// Records returned by the source.
    pub positions_fetched: usize,
    /// Rows emitted for the block.
    pub rows: usize,
    /// Sum of `lpvalueusd` over the block's rows.
    pub usd_total: Decimal,
}

/// Everything a snapshot run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotOutcome {
    /// Rows in generation order.
    pub rows: Vec<SnapshotRow>,
    pub block_failures: Vec<BlockFailure>,
    pub position_failures: Vec<PositionFailure>,
    pub aggregation_failures: Vec<AggregationFailure>,
    /// Set when the run stopped before the last block.
    pub cancelled: bool,
    /// One entry per block that was fetched successfully.
    pub summaries: Vec<BlockSummary>,
}

impl SnapshotOutcome {
    /// Total USD over all rows.
    #[must_use]
    pub fn total_usd(&self) -> Decimal {
        self.rows.iter().map(|r| r.lpvalueusd).sum()
    }

    /// True when the run finished and nothing was left out of the report.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        !self.cancelled
            && self.block_failures.is_empty()
            && self.position_failures.is_empty()
            && self.aggregation_failures.is_empty()
    }

    pub(crate) fn record_block(&mut self, block: u64, positions_fetched: usize, rows: Vec<SnapshotRow>) {
        self.summaries.push(BlockSummary {
            block,
            positions_fetched,
            rows: rows.len(),
            usd_total: rows.iter().map(|r| r.lpvalueusd).sum(),
        });
        self.rows.extend(rows);
    }
}
