//! Groups valued positions by owner and pool.

use crate::entities::{Position, PositionWithUsdValue};
use crate::error::ValuationError;
use crate::valuation::value_position;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive as _;
use serde::Serialize;

/// Running totals for one `(owner, pool)` pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Holding {
    /// Sum of both legs' USD values, unrounded.
    pub usd_value: Decimal,
    /// Sum of position liquidity; meaningless once `liquidity_overflow` is set.
    pub liquidity: Decimal,
    /// Set when the liquidity sum no longer fits a `Decimal`.
    pub liquidity_overflow: bool,
    /// Number of positions folded in.
    pub positions: usize,
}

impl Holding {
    /// Summed liquidity, or `None` if it overflowed.
    #[must_use]
    pub fn total_liquidity(&self) -> Option<Decimal> {
        (!self.liquidity_overflow).then_some(self.liquidity)
    }

    fn add_liquidity(&mut self, liquidity: u128) {
        let sum = Decimal::from_u128(liquidity).and_then(|l| self.liquidity.checked_add(l));
        match sum {
            Some(sum) if !self.liquidity_overflow => self.liquidity = sum,
            _ => self.liquidity_overflow = true,
        }
    }
}

/// owner -> pool -> holding, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregatedHoldings {
    by_owner: IndexMap<String, IndexMap<String, Holding>>,
}

impl AggregatedHoldings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one valued position to its `(owner, pool)` total.
    pub fn add(&mut self, position: &PositionWithUsdValue) {
        let holding = self
            .by_owner
            .entry(position.owner().to_string())
            .or_default()
            .entry(position.pool_id().to_string())
            .or_default();
        holding.usd_value += position.total_usd();
        holding.add_liquidity(position.position.liquidity);
        holding.positions += 1;
    }

    #[must_use]
    pub fn holding(&self, owner: &str, pool_id: &str) -> Option<&Holding> {
        self.by_owner.get(owner)?.get(pool_id)
    }

    /// Cumulative USD value for a pair.
    #[must_use]
    pub fn total_for(&self, owner: &str, pool_id: &str) -> Option<Decimal> {
        self.holding(owner, pool_id).map(|h| h.usd_value)
    }

    /// Flattened `(owner, pool, holding)` triples in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &Holding)> {
        self.by_owner.iter().flat_map(|(owner, pools)| {
            pools
                .iter()
                .map(move |(pool, holding)| (owner.as_str(), pool.as_str(), holding))
        })
    }

    /// The owner -> pool -> USD mapping.
    #[must_use]
    pub fn usd_by_owner_and_pool(&self) -> IndexMap<String, IndexMap<String, Decimal>> {
        self.by_owner
            .iter()
            .map(|(owner, pools)| {
                let pools = pools
                    .iter()
                    .map(|(pool, holding)| (pool.clone(), holding.usd_value))
                    .collect();
                (owner.clone(), pools)
            })
            .collect()
    }

    /// Number of `(owner, pool)` pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_owner.values().map(IndexMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_owner.is_empty()
    }
}

/// Sums `token0_usd_value + token1_usd_value` per `(owner, pool)`.
///
/// Owner and pool identifiers are used as given; callers normalise case.
#[must_use]
pub fn aggregate(positions: &[PositionWithUsdValue]) -> AggregatedHoldings {
    let mut holdings = AggregatedHoldings::new();
    for position in positions {
        holdings.add(position);
    }
    holdings
}

/// Values then aggregates raw positions.
///
/// Positions that fail valuation are left out of the totals and returned
/// alongside them.
pub fn aggregate_positions(positions: &[Position]) -> (AggregatedHoldings, Vec<ValuationError>) {
    let mut holdings = AggregatedHoldings::new();
    let mut failures = Vec::new();
    for position in positions {
        match value_position(position) {
            Ok(valued) => holdings.add(&valued),
            Err(e) => failures.push(e),
        }
    }
    (holdings, failures)
}
