//! In-memory sources for tests and dry runs.

use super::{Listing, PositionQuery, PositionSource, SkippedRecord, VaultPosition, VaultSource};
use crate::error::SourceError;
use async_trait::async_trait;
use lp_tvl_domain::entities::Position;
use std::collections::{BTreeMap, HashMap};

fn matches(position: &Position, query: &PositionQuery) -> bool {
    let owner_ok = query
        .owner
        .as_deref()
        .is_none_or(|o| position.owner.eq_ignore_ascii_case(o));
    let pool_ok = query
        .pool_id
        .as_deref()
        .is_none_or(|p| position.pool.id.eq_ignore_ascii_case(p));
    owner_ok && pool_ok
}

/// Resolves block `0` to the highest block with data.
fn resolve<T>(history: &BTreeMap<u64, T>, block: u64) -> u64 {
    if block == 0 {
        history.keys().next_back().copied().unwrap_or(0)
    } else {
        block
    }
}

/// Mock position source holding a fixed history per block.
#[derive(Debug, Clone, Default)]
pub struct MockPositionSource {
    range: BTreeMap<u64, Vec<Position>>,
    limit: BTreeMap<u64, Vec<Position>>,
    skipped: BTreeMap<u64, Vec<SkippedRecord>>,
    failures: HashMap<u64, SourceError>,
}

impl MockPositionSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds range positions visible at `block`.
    pub fn with_range_positions(mut self, block: u64, positions: Vec<Position>) -> Self {
        self.range.entry(block).or_default().extend(positions);
        self
    }

    /// Adds limit positions visible at `block`.
    pub fn with_limit_positions(mut self, block: u64, positions: Vec<Position>) -> Self {
        self.limit.entry(block).or_default().extend(positions);
        self
    }

    /// Adds a record the range listing at `block` reports as undecodable.
    pub fn with_skipped_record(mut self, block: u64, id: &str, error: SourceError) -> Self {
        self.skipped.entry(block).or_default().push(SkippedRecord {
            id: id.to_string(),
            error,
        });
        self
    }

    /// Makes every listing at `block` fail with `error`.
    pub fn with_failure(mut self, block: u64, error: SourceError) -> Self {
        self.failures.insert(block, error);
        self
    }

    fn list(
        &self,
        history: &BTreeMap<u64, Vec<Position>>,
        query: &PositionQuery,
    ) -> Result<Listing<Position>, SourceError> {
        if let Some(error) = self.failures.get(&query.block) {
            return Err(error.clone());
        }
        let records = history
            .get(&resolve(history, query.block))
            .map(|positions| {
                positions
                    .iter()
                    .filter(|p| matches(p, query))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(Listing::new(records))
    }
}

#[async_trait]
impl PositionSource for MockPositionSource {
    async fn fetch_range_positions(
        &self,
        query: &PositionQuery,
    ) -> Result<Listing<Position>, SourceError> {
        let mut listing = self.list(&self.range, query)?;
        if let Some(skipped) = self.skipped.get(&resolve(&self.range, query.block)) {
            listing.skipped.extend(skipped.iter().cloned());
        }
        Ok(listing)
    }

    async fn fetch_limit_positions(
        &self,
        query: &PositionQuery,
    ) -> Result<Listing<Position>, SourceError> {
        self.list(&self.limit, query)
    }

    async fn fetch_position(
        &self,
        block: u64,
        position_id: &str,
    ) -> Result<Option<Position>, SourceError> {
        if let Some(error) = self.failures.get(&block) {
            return Err(error.clone());
        }
        let found = [&self.range, &self.limit].into_iter().find_map(|history| {
            history
                .get(&resolve(history, block))?
                .iter()
                .find(|p| p.id.as_str() == position_id)
                .cloned()
        });
        Ok(found)
    }
}

/// Mock vault source.
#[derive(Debug, Clone, Default)]
pub struct MockVaultSource {
    positions: BTreeMap<u64, Vec<VaultPosition>>,
    failures: HashMap<u64, SourceError>,
}

impl MockVaultSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_positions(mut self, block: u64, positions: Vec<VaultPosition>) -> Self {
        self.positions.entry(block).or_default().extend(positions);
        self
    }

    pub fn with_failure(mut self, block: u64, error: SourceError) -> Self {
        self.failures.insert(block, error);
        self
    }
}

#[async_trait]
impl VaultSource for MockVaultSource {
    async fn fetch_vault_positions(
        &self,
        block: u64,
    ) -> Result<Listing<VaultPosition>, SourceError> {
        if let Some(error) = self.failures.get(&block) {
            return Err(error.clone());
        }
        let records = self
            .positions
            .get(&resolve(&self.positions, block))
            .cloned()
            .unwrap_or_default();
        Ok(Listing::new(records))
    }
}
