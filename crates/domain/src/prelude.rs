//! Prelude module for convenient imports.
//!
//! ```rust
//! use lp_tvl_domain::prelude::*;
//! ```

pub use crate::aggregation::{AggregatedHoldings, Holding, aggregate, aggregate_positions};
pub use crate::entities::{
    PoolSnapshot, Position, PositionId, PositionWithUsdValue, SnapshotRow, Token,
};
pub use crate::enums::{AmmType, Chain, PositionKind, Protocol, UnknownVariant};
pub use crate::error::{MathError, TokenField, ValuationError};
pub use crate::math::{get_sqrt_ratio_at_tick, get_token0_amount, get_token1_amount};
pub use crate::valuation::value_position;
pub use crate::value_objects::{Amount, UsdValue};
