use crate::error::MathError;
use crate::math::full_math::mul_div;
use crate::math::tick_math::{Q96, get_sqrt_ratio_at_tick};
use primitive_types::U256;

fn ordered(sqrt_price_a: U256, sqrt_price_b: U256) -> (U256, U256) {
    if sqrt_price_a < sqrt_price_b {
        (sqrt_price_a, sqrt_price_b)
    } else {
        (sqrt_price_b, sqrt_price_a)
    }
}

/// Calculates the amount of token0 (x) given liquidity and price range.
/// delta_x = L * (sqrt(P_b) - sqrt(P_a)) / (sqrt(P_a) * sqrt(P_b))
/// Prices are Q64.96; the result is rounded down.
pub fn get_amount0_delta(
    sqrt_price_a: U256,
    sqrt_price_b: U256,
    liquidity: u128,
) -> Result<U256, MathError> {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b);
    if lower.is_zero() {
        return Err(MathError::ZeroSqrtPrice);
    }

    let numerator1 = U256::from(liquidity) << 96;
    let numerator2 = upper - lower;

    Ok(mul_div(numerator1, numerator2, upper)? / lower)
}

/// Calculates the amount of token1 (y) given liquidity and price range.
/// delta_y = L * (sqrt(P_b) - sqrt(P_a))
/// Prices are Q64.96; the result is rounded down.
pub fn get_amount1_delta(
    sqrt_price_a: U256,
    sqrt_price_b: U256,
    liquidity: u128,
) -> Result<U256, MathError> {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b);
    mul_div(U256::from(liquidity), upper - lower, Q96)
}

/// Raw token0 and token1 amounts held by a position.
///
/// Below the range the position is entirely token0, at or above the upper
/// tick it is entirely token1, and in between the current sqrt price splits
/// it. The current price is clamped to the range bounds so a tick/price
/// rounding mismatch never produces a negative interval.
pub fn get_token_amounts(
    tick: i32,
    tick_lower: i32,
    tick_upper: i32,
    sqrt_price_x96: U256,
    liquidity: u128,
) -> Result<(U256, U256), MathError> {
    if tick_lower >= tick_upper {
        return Err(MathError::InvalidRange {
            lower: tick_lower,
            upper: tick_upper,
        });
    }

    let sqrt_lower = get_sqrt_ratio_at_tick(tick_lower)?;
    let sqrt_upper = get_sqrt_ratio_at_tick(tick_upper)?;

    if liquidity == 0 {
        return Ok((U256::zero(), U256::zero()));
    }

    if tick < tick_lower {
        let amount0 = get_amount0_delta(sqrt_lower, sqrt_upper, liquidity)?;
        Ok((amount0, U256::zero()))
    } else if tick >= tick_upper {
        let amount1 = get_amount1_delta(sqrt_lower, sqrt_upper, liquidity)?;
        Ok((U256::zero(), amount1))
    } else {
        let current = sqrt_price_x96.clamp(sqrt_lower, sqrt_upper);
        let amount0 = get_amount0_delta(current, sqrt_upper, liquidity)?;
        let amount1 = get_amount1_delta(sqrt_lower, current, liquidity)?;
        Ok((amount0, amount1))
    }
}

/// Raw token0 amount of a position. See [`get_token_amounts`].
pub fn get_token0_amount(
    tick: i32,
    tick_lower: i32,
    tick_upper: i32,
    sqrt_price_x96: U256,
    liquidity: u128,
) -> Result<U256, MathError> {
    get_token_amounts(tick, tick_lower, tick_upper, sqrt_price_x96, liquidity).map(|(a0, _)| a0)
}

/// Raw token1 amount of a position. See [`get_token_amounts`].
pub fn get_token1_amount(
    tick: i32,
    tick_lower: i32,
    tick_upper: i32,
    sqrt_price_x96: U256,
    liquidity: u128,
) -> Result<U256, MathError> {
    get_token_amounts(tick, tick_lower, tick_upper, sqrt_price_x96, liquidity).map(|(_, a1)| a1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqrt_at(tick: i32) -> U256 {
        get_sqrt_ratio_at_tick(tick).unwrap()
    }

    #[test]
    fn test_amount_deltas() {
        // sqrt prices 1 and 2 in Q64.96, liquidity 1000
        // delta_y = 1000 * (2 - 1) = 1000
        // delta_x = 1000 * (1/1 - 1/2) = 500
        let liquidity = 1000u128;
        let sqrt_p_a = Q96;
        let sqrt_p_b = Q96 * U256::from(2u8);

        let dy = get_amount1_delta(sqrt_p_a, sqrt_p_b, liquidity).unwrap();
        assert_eq!(dy, U256::from(1000u64));

        let dx = get_amount0_delta(sqrt_p_a, sqrt_p_b, liquidity).unwrap();
        assert_eq!(dx, U256::from(500u64));

        // argument order does not matter
        assert_eq!(get_amount0_delta(sqrt_p_b, sqrt_p_a, liquidity).unwrap(), dx);
    }

    #[test]
    fn test_in_range_split() {
        let (a0, a1) = get_token_amounts(100, 0, 200, sqrt_at(100), 1_000_000).unwrap();
        assert_eq!(a0, U256::from(4962u64));
        assert_eq!(a1, U256::from(5012u64));

        let zero = get_token_amounts(100, 0, 200, sqrt_at(100), 0).unwrap();
        assert_eq!(zero, (U256::zero(), U256::zero()));
    }

    #[test]
    fn test_below_range_is_all_token0() {
        for tick in [-500, -1, -200] {
            let a1 = get_token1_amount(tick, 0, 200, sqrt_at(tick), 1_000_000).unwrap();
            assert!(a1.is_zero());
        }
        let a0 = get_token0_amount(-1, 0, 200, sqrt_at(-1), 1_000_000).unwrap();
        assert_eq!(a0, U256::from(9949u64));
    }

    #[test]
    fn test_at_or_above_range_is_all_token1() {
        for tick in [200, 201, 5000] {
            let a0 = get_token0_amount(tick, 0, 200, sqrt_at(tick), 1_000_000).unwrap();
            assert!(a0.is_zero());
        }
        let a1 = get_token1_amount(200, 0, 200, sqrt_at(200), 1_000_000).unwrap();
        assert_eq!(a1, U256::from(10049u64));
    }

    #[test]
    fn test_zero_liquidity_any_tick() {
        for tick in [-10_000, 0, 150, 10_000] {
            let amounts = get_token_amounts(tick, 0, 200, sqrt_at(tick), 0).unwrap();
            assert_eq!(amounts, (U256::zero(), U256::zero()));
        }
    }

    #[test]
    fn test_invalid_ranges() {
        assert_eq!(
            get_token_amounts(0, 10, 10, Q96, 1),
            Err(MathError::InvalidRange {
                lower: 10,
                upper: 10
            })
        );
        assert_eq!(
            get_token0_amount(0, 20, 10, Q96, 1),
            Err(MathError::InvalidRange {
                lower: 20,
                upper: 10
            })
        );
        assert_eq!(
            get_token_amounts(0, -900_000, 10, Q96, 1),
            Err(MathError::TickOutOfBounds(-900_000))
        );
    }

    #[test]
    fn test_price_outside_bounds_is_clamped() {
        // tick says in range but price sits slightly below the lower bound
        let below = sqrt_at(0) - U256::one();
        let (a0, a1) = get_token_amounts(0, 0, 200, below, 1_000_000).unwrap();
        assert_eq!(a0, U256::from(9949u64));
        assert!(a1.is_zero());
    }

    #[test]
    fn test_large_liquidity_does_not_overflow() {
        let (a0, a1) =
            get_token_amounts(0, -887_220, 887_220, Q96, u128::MAX).unwrap();
        assert!(!a0.is_zero());
        assert!(!a1.is_zero());
    }
}
