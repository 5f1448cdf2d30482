use crate::entities::pool::PoolSnapshot;
use crate::entities::token::Token;
use crate::enums::PositionKind;
use crate::value_objects::usd_value::UsdValue;
use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Opaque position identifier, unique within a protocol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PositionId(pub String);

impl PositionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PositionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A liquidity provider's stake in one pool at one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub owner: String,
    pub liquidity: u128,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub pool: PoolSnapshot,
    pub token0: Token,
    pub token1: Token,
    pub kind: PositionKind,
}

impl Position {
    /// Lowercases the owner address so that grouping is case-insensitive.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.owner = self.owner.to_lowercase();
        self
    }

    /// Whether the pool's current tick lies inside `[tick_lower, tick_upper)`.
    #[must_use]
    pub fn is_in_range(&self) -> bool {
        self.pool.tick >= self.tick_lower && self.pool.tick < self.tick_upper
    }
}

/// A position together with its derived token amounts and USD values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionWithUsdValue {
    pub position: Position,
    pub token0_amount_raw: U256,
    pub token1_amount_raw: U256,
    pub token0_decimal_value: Decimal,
    pub token1_decimal_value: Decimal,
    pub token0_usd_value: UsdValue,
    pub token1_usd_value: UsdValue,
}

impl PositionWithUsdValue {
    /// Combined USD value of both legs.
    #[must_use]
    pub fn total_usd(&self) -> Decimal {
        self.token0_usd_value.value() + self.token1_usd_value.value()
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.position.owner
    }

    #[must_use]
    pub fn pool_id(&self) -> &str {
        &self.position.pool.id
    }
}
