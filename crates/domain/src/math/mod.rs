//! Integer fixed-point math for concentrated liquidity positions.
//!
//! Everything here operates on `U256`/`U512`; no floating point is involved.

pub mod concentrated_liquidity;
pub mod full_math;
pub mod tick_math;

pub use concentrated_liquidity::{
    get_amount0_delta, get_amount1_delta, get_token0_amount, get_token1_amount,
    get_token_amounts,
};
pub use tick_math::{MAX_TICK, MIN_TICK, Q96, get_sqrt_ratio_at_tick};
