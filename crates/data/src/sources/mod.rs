//! Position and vault source abstractions.
//!
//! A [`PositionSource`] returns raw positions that still need valuing; a
//! [`VaultSource`] returns records that the upstream already priced.

pub mod mock;
mod records;
pub mod subgraph;
#[cfg(test)]
mod test_server;
pub mod vault;

pub use mock::{MockPositionSource, MockVaultSource};
pub use subgraph::{GraphQlClient, SubgraphPositionSource};
pub use vault::SubgraphVaultSource;

use crate::error::SourceError;
use async_trait::async_trait;
use lp_tvl_domain::entities::Position;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Records requested per page.
pub const PAGE_SIZE: usize = 1000;

/// Filters for a position listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionQuery {
    /// Block to read at; `0` means the latest indexed block.
    pub block: u64,
    /// Restrict to one owner address.
    pub owner: Option<String>,
    /// Restrict to one pool.
    pub pool_id: Option<String>,
}

impl PositionQuery {
    #[must_use]
    pub fn at_block(block: u64) -> Self {
        Self {
            block,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into().to_lowercase());
        self
    }

    #[must_use]
    pub fn with_pool(mut self, pool_id: impl Into<String>) -> Self {
        self.pool_id = Some(pool_id.into().to_lowercase());
        self
    }

    /// Same filters at another block.
    #[must_use]
    pub fn for_block(&self, block: u64) -> Self {
        Self {
            block,
            ..self.clone()
        }
    }
}

/// A record the source returned but could not decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// The record's `id`, or `"<unknown>"` when it has none.
    pub id: String,
    pub error: SourceError,
}

/// One listing: decoded records in source order plus the records that
/// failed to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<T> {
    pub records: Vec<T>,
    pub skipped: Vec<SkippedRecord>,
}

impl<T> Listing<T> {
    #[must_use]
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records,
            skipped: Vec::new(),
        }
    }

    /// Appends another listing, keeping order.
    pub fn extend(&mut self, other: Listing<T>) {
        self.records.extend(other.records);
        self.skipped.extend(other.skipped);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.skipped.is_empty()
    }
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Source of raw positions at historical blocks.
///
/// Implementations page through results in creation order. Range and limit
/// positions are separate listings; callers merge them.
#[async_trait]
pub trait PositionSource: Send + Sync + fmt::Debug {
    /// Lists range (liquidity) positions matching `query`.
    async fn fetch_range_positions(
        &self,
        query: &PositionQuery,
    ) -> Result<Listing<Position>, SourceError>;

    /// Lists limit positions matching `query`.
    ///
    /// AMMs without limit positions keep the default empty listing.
    async fn fetch_limit_positions(
        &self,
        _query: &PositionQuery,
    ) -> Result<Listing<Position>, SourceError> {
        Ok(Listing::default())
    }

    /// Looks up a single position, owner included.
    async fn fetch_position(
        &self,
        block: u64,
        position_id: &str,
    ) -> Result<Option<Position>, SourceError>;
}

/// A position already valued by the upstream source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultPosition {
    pub user: String,
    pub vault: String,
    pub position: String,
    /// Value in native LP units.
    pub lp_value: Decimal,
    /// Value in USD.
    pub lp_value_usd: Decimal,
}

/// Source of pre-valued vault positions.
#[async_trait]
pub trait VaultSource: Send + Sync + fmt::Debug {
    /// Lists every vault position at `block`.
    async fn fetch_vault_positions(&self, block: u64)
    -> Result<Listing<VaultPosition>, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_filters_are_lowercased() {
        let q = PositionQuery::at_block(10)
            .with_owner("0xABCdef")
            .with_pool("0xPOOL");
        assert_eq!(q.owner.as_deref(), Some("0xabcdef"));
        assert_eq!(q.pool_id.as_deref(), Some("0xpool"));
    }

    #[test]
    fn test_listing_extend_keeps_order() {
        let mut listing = Listing::new(vec![1, 2]);
        listing.extend(Listing {
            records: vec![3],
            skipped: vec![SkippedRecord {
                id: "9".to_string(),
                error: SourceError::Decode("position 9: missing owner".to_string()),
            }],
        });
        assert_eq!(listing.records, vec![1, 2, 3]);
        assert_eq!(listing.skipped[0].id, "9");
        assert!(Listing::<u8>::default().is_empty());
    }

    #[test]
    fn test_for_block_keeps_filters() {
        let q = PositionQuery::at_block(1).with_owner("0xa");
        let moved = q.for_block(99);
        assert_eq!(moved.block, 99);
        assert_eq!(moved.owner, q.owner);
    }
}
