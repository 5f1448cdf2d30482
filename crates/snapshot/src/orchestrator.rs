//! Snapshot orchestrator.
//!
//! Walks a list of blocks, pulls positions for each one, values them and
//! turns them into report rows. Blocks are processed one at a time and in
//! the caller's order; nothing is carried from one block to the next.

use crate::cancel::CancelFlag;
use crate::outcome::{
    AggregationFailure, BlockFailure, PositionFailure, SnapshotError, SnapshotOutcome,
};
use lp_tvl_data::{
    Listing, PositionQuery, PositionSource, SkippedRecord, SourceError, VaultPosition, VaultSource,
};
use lp_tvl_domain::aggregation::{AggregatedHoldings, aggregate};
use lp_tvl_domain::entities::{Position, PositionWithUsdValue, SnapshotRow};
use lp_tvl_domain::error::ValuationError;
use lp_tvl_domain::valuation::value_position;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive as _;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Row layout of a position snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// One row per position: `position` is its id, `lpvalue` its liquidity.
    #[default]
    PerPosition,
    /// One row per owner and pool: `position` is the number of positions,
    /// `lpvalue` the summed liquidity.
    Aggregated,
}

/// Drives position and vault sources over a list of blocks.
#[derive(Debug, Clone, Default)]
pub struct SnapshotOrchestrator {
    positions: Option<Arc<dyn PositionSource>>,
    vaults: Option<Arc<dyn VaultSource>>,
    query: PositionQuery,
    mode: OutputMode,
    cancel: CancelFlag,
}

impl SnapshotOrchestrator {
    /// Creates an orchestrator over a position source.
    pub fn new(source: Arc<dyn PositionSource>) -> Self {
        Self {
            positions: Some(source),
            ..Default::default()
        }
    }

    /// Creates an orchestrator over a pre-valued vault source only.
    pub fn for_vaults(source: Arc<dyn VaultSource>) -> Self {
        Self {
            vaults: Some(source),
            ..Default::default()
        }
    }

    /// Owner/pool filters applied at every block. The query's own block is
    /// ignored.
    #[must_use]
    pub fn with_query(mut self, query: PositionQuery) -> Self {
        self.query = query;
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    /// Handle that stops the run at the next block boundary.
    #[must_use]
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    fn position_source(&self) -> Result<&Arc<dyn PositionSource>, SourceError> {
        self.positions
            .as_ref()
            .ok_or_else(|| SourceError::NotConfigured("position source".to_string()))
    }

    fn vault_source(&self) -> Result<&Arc<dyn VaultSource>, SourceError> {
        self.vaults
            .as_ref()
            .ok_or_else(|| SourceError::NotConfigured("vault source".to_string()))
    }

    /// Builds position snapshot rows for `blocks`.
    ///
    /// A block whose positions cannot be fetched is recorded in
    /// [`SnapshotOutcome::block_failures`] and contributes no rows; a
    /// position that cannot be decoded or valued is recorded in
    /// [`SnapshotOutcome::position_failures`]. An aggregated row whose
    /// liquidity overflows goes to [`SnapshotOutcome::aggregation_failures`].
    /// None of these stops the run.
    pub async fn build_snapshot(&self, blocks: &[u64]) -> SnapshotOutcome {
        info!(blocks = blocks.len(), mode = ?self.mode, "Starting snapshot");
        let mut outcome = SnapshotOutcome::default();

        for &block in blocks {
            if self.cancel.is_cancelled() {
                warn!(block, "Snapshot cancelled");
                outcome.cancelled = true;
                break;
            }

            let listing = match self.fetch_block(block).await {
                Ok(listing) => listing,
                Err(e) => {
                    error!(block, error = %e, "Skipping block, source unavailable");
                    outcome.block_failures.push(BlockFailure {
                        block,
                        error: SnapshotError::SourceUnavailable { block, source: e },
                    });
                    continue;
                }
            };

            let fetched = listing.records.len() + listing.skipped.len();
            outcome
                .position_failures
                .extend(skipped_failures(block, listing.skipped));
            let valued = value_block(block, listing.records);
            outcome.position_failures.extend(valued.failures);

            let rows = match self.mode {
                OutputMode::PerPosition => valued.rows,
                OutputMode::Aggregated => {
                    let (rows, failures) = aggregated_rows(block, &aggregate(&valued.positions));
                    outcome.aggregation_failures.extend(failures);
                    rows
                }
            };
            info!(block, positions = fetched, rows = rows.len(), "Block processed");
            outcome.record_block(block, fetched, rows);
        }

        log_outcome(&outcome);
        outcome
    }

    /// Range positions followed by limit positions, owners lowercased.
    async fn fetch_block(&self, block: u64) -> Result<Listing<Position>, SourceError> {
        let source = self.position_source()?;
        let query = self.query.for_block(block);

        let mut listing = source.fetch_range_positions(&query).await?;
        let range = listing.records.len();
        listing.extend(source.fetch_limit_positions(&query).await?);
        debug!(
            block,
            range,
            limit = listing.records.len() - range,
            skipped = listing.skipped.len(),
            "Fetched positions"
        );

        listing.records = listing
            .records
            .into_iter()
            .map(Position::normalized)
            .collect();
        Ok(listing)
    }

    /// Builds rows from a pre-valued vault source.
    ///
    /// Values are passed through unchanged; failures are handled as in
    /// [`build_snapshot`](Self::build_snapshot).
    pub async fn build_vault_snapshot(&self, blocks: &[u64]) -> SnapshotOutcome {
        info!(blocks = blocks.len(), "Starting vault snapshot");
        let mut outcome = SnapshotOutcome::default();

        for &block in blocks {
            if self.cancel.is_cancelled() {
                warn!(block, "Vault snapshot cancelled");
                outcome.cancelled = true;
                break;
            }

            let fetched = match self.vault_source() {
                Ok(source) => source.fetch_vault_positions(block).await,
                Err(e) => Err(e),
            };
            match fetched {
                Ok(listing) => {
                    let fetched = listing.records.len() + listing.skipped.len();
                    outcome
                        .position_failures
                        .extend(skipped_failures(block, listing.skipped));
                    let rows: Vec<SnapshotRow> = listing
                        .records
                        .into_iter()
                        .map(|p| vault_row(block, p))
                        .collect();
                    info!(block, rows = rows.len(), "Vault block processed");
                    outcome.record_block(block, fetched, rows);
                }
                Err(e) => {
                    error!(block, error = %e, "Skipping block, vault source unavailable");
                    outcome.block_failures.push(BlockFailure {
                        block,
                        error: SnapshotError::SourceUnavailable { block, source: e },
                    });
                }
            }
        }

        log_outcome(&outcome);
        outcome
    }

    /// Fetches and values a single position.
    ///
    /// # Errors
    /// * [`SnapshotError::SourceUnavailable`] if the lookup fails.
    /// * [`SnapshotError::PositionNotFound`] if the source has no such id.
    /// * [`SnapshotError::Valuation`] if the position cannot be valued.
    pub async fn lookup_position(
        &self,
        block: u64,
        position_id: &str,
    ) -> Result<PositionWithUsdValue, SnapshotError> {
        let unavailable = |source| SnapshotError::SourceUnavailable { block, source };
        let position = self
            .position_source()
            .map_err(unavailable)?
            .fetch_position(block, position_id)
            .await
            .map_err(unavailable)?
            .ok_or_else(|| SnapshotError::PositionNotFound {
                block,
                position_id: position_id.to_string(),
            })?;

        Ok(value_position(&position.normalized())?)
    }
}

/// Records the source could not decode, as position failures.
fn skipped_failures(
    block: u64,
    skipped: Vec<SkippedRecord>,
) -> impl Iterator<Item = PositionFailure> {
    skipped.into_iter().map(move |record| {
        warn!(block, position_id = %record.id, error = %record.error, "Skipping undecodable position");
        PositionFailure {
            block,
            position_id: record.id.clone(),
            reason: SnapshotError::Undecodable {
                position_id: record.id,
                source: record.error,
            },
        }
    })
}

/// Valued positions of one block with their per-position rows.
#[derive(Debug, Default)]
struct ValuedBlock {
    positions: Vec<PositionWithUsdValue>,
    rows: Vec<SnapshotRow>,
    failures: Vec<PositionFailure>,
}

/// Values every position of a block, splitting off the failures.
fn value_block(block: u64, positions: Vec<Position>) -> ValuedBlock {
    let mut valued = ValuedBlock::default();

    for position in positions {
        let result = value_position(&position)
            .and_then(|v| position_row(block, &v).map(|row| (v, row)));
        match result {
            Ok((v, row)) => {
                valued.positions.push(v);
                valued.rows.push(row);
            }
            Err(reason) => {
                warn!(block, position_id = %position.id, error = %reason, "Skipping position");
                valued.failures.push(PositionFailure {
                    block,
                    position_id: position.id.to_string(),
                    reason: reason.into(),
                });
            }
        }
    }
    valued
}

fn position_row(block: u64, valued: &PositionWithUsdValue) -> Result<SnapshotRow, ValuationError> {
    // lpvalue carries liquidity as a decimal
    let lpvalue =
        Decimal::from_u128(valued.position.liquidity).ok_or_else(|| ValuationError::Overflow {
            position_id: valued.position.id.to_string(),
        })?;
    Ok(SnapshotRow {
        user: valued.owner().to_string(),
        vault: valued.pool_id().to_string(),
        block,
        position: valued.position.id.to_string(),
        lpvalue,
        lpvalueusd: valued.total_usd(),
    })
}

fn aggregated_rows(
    block: u64,
    holdings: &AggregatedHoldings,
) -> (Vec<SnapshotRow>, Vec<AggregationFailure>) {
    let mut rows = Vec::with_capacity(holdings.len());
    let mut failures = Vec::new();

    for (owner, pool, holding) in holdings.iter() {
        match holding.total_liquidity() {
            Some(lpvalue) => rows.push(SnapshotRow {
                user: owner.to_string(),
                vault: pool.to_string(),
                block,
                position: holding.positions.to_string(),
                lpvalue,
                lpvalueusd: holding.usd_value,
            }),
            None => {
                warn!(block, owner, pool, positions = holding.positions, "Dropping row, summed liquidity overflows");
                failures.push(AggregationFailure {
                    block,
                    owner: owner.to_string(),
                    pool_id: pool.to_string(),
                    positions: holding.positions,
                });
            }
        }
    }
    (rows, failures)
}

fn vault_row(block: u64, position: VaultPosition) -> SnapshotRow {
    SnapshotRow {
        user: position.user,
        vault: position.vault,
        block,
        position: position.position,
        lpvalue: position.lp_value,
        lpvalueusd: position.lp_value_usd,
    }
}

fn log_outcome(outcome: &SnapshotOutcome) {
    info!(
        rows = outcome.rows.len(),
        blocks = outcome.summaries.len(),
        failed_blocks = outcome.block_failures.len(),
        failed_positions = outcome.position_failures.len(),
        failed_rows = outcome.aggregation_failures.len(),
        cancelled = outcome.cancelled,
        "Snapshot completed"
    );
}
