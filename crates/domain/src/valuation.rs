//! Position valuation: raw on-chain state to token amounts and USD values.

use crate::entities::{Position, PositionWithUsdValue, Token};
use crate::error::{TokenField, ValuationError};
use crate::math::get_token_amounts;
use crate::value_objects::{Amount, UsdValue};
use primitive_types::U256;
use rust_decimal::Decimal;

/// Values a position at the pool state embedded in it.
///
/// Raw amounts come from the concentrated liquidity formulas. Each leg is
/// scaled by its own token's decimals and priced with that token's
/// `derived_usd`; USD values are rounded to four places, half away from zero.
///
/// # Errors
///
/// * [`ValuationError::InvalidRange`] when `tick_lower >= tick_upper`.
/// * [`ValuationError::MissingTokenMetadata`] when a token lacks usable
///   decimals or a USD price.
/// * [`ValuationError::Math`] / [`ValuationError::Overflow`] when a value
///   cannot be represented.
pub fn value_position(position: &Position) -> Result<PositionWithUsdValue, ValuationError> {
    let id = position.id.as_str();

    let decimals0 = token_decimals(id, &position.token0)?;
    let decimals1 = token_decimals(id, &position.token1)?;
    let price0 = token_price(id, &position.token0)?;
    let price1 = token_price(id, &position.token1)?;

    let (amount0, amount1) = get_token_amounts(
        position.pool.tick,
        position.tick_lower,
        position.tick_upper,
        position.pool.sqrt_price_x96,
        position.liquidity,
    )
    .map_err(|e| ValuationError::from_math(id, e))?;

    let token0_decimal_value = to_decimal(id, amount0, decimals0)?;
    let token1_decimal_value = to_decimal(id, amount1, decimals1)?;

    Ok(PositionWithUsdValue {
        position: position.clone(),
        token0_amount_raw: amount0,
        token1_amount_raw: amount1,
        token0_decimal_value,
        token1_decimal_value,
        token0_usd_value: usd_value(id, token0_decimal_value, price0)?,
        token1_usd_value: usd_value(id, token1_decimal_value, price1)?,
    })
}

fn token_decimals(position_id: &str, token: &Token) -> Result<u8, ValuationError> {
    token
        .decimals
        .filter(|d| *d <= 28)
        .ok_or_else(|| missing(position_id, token, TokenField::Decimals))
}

fn token_price(position_id: &str, token: &Token) -> Result<Decimal, ValuationError> {
    token
        .derived_usd
        .ok_or_else(|| missing(position_id, token, TokenField::DerivedUsd))
}

fn missing(position_id: &str, token: &Token, field: TokenField) -> ValuationError {
    ValuationError::MissingTokenMetadata {
        position_id: position_id.to_string(),
        token_id: token.address.clone(),
        field,
    }
}

fn to_decimal(position_id: &str, raw: U256, decimals: u8) -> Result<Decimal, ValuationError> {
    Amount::new(raw, decimals)
        .to_decimal()
        .ok_or_else(|| ValuationError::Overflow {
            position_id: position_id.to_string(),
        })
}

fn usd_value(
    position_id: &str,
    amount: Decimal,
    price: Decimal,
) -> Result<UsdValue, ValuationError> {
    amount
        .checked_mul(price)
        .map(UsdValue::from_decimal)
        .ok_or_else(|| ValuationError::Overflow {
            position_id: position_id.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{PoolSnapshot, PositionId};
    use crate::enums::PositionKind;
    use crate::math::get_sqrt_ratio_at_tick;
    use rust_decimal_macros::dec;

    fn position(tick: i32, lower: i32, upper: i32, liquidity: u128) -> Position {
        Position {
            id: PositionId::new("42"),
            owner: "0xowner".to_string(),
            liquidity,
            tick_lower: lower,
            tick_upper: upper,
            pool: PoolSnapshot::new("0xpool", get_sqrt_ratio_at_tick(tick).unwrap(), tick),
            token0: Token::new("0xt0", "WETH", 18, "Wrapped Ether").with_derived_usd(dec!(2.5)),
            token1: Token::new("0xt1", "USDC", 6, "USD Coin").with_derived_usd(dec!(1)),
            kind: PositionKind::Range,
        }
    }

    #[test]
    fn test_value_in_range_position() {
        let valued = value_position(&position(100, 0, 200, 1_000_000)).unwrap();
        assert_eq!(valued.token0_amount_raw, U256::from(4962u64));
        assert_eq!(valued.token1_amount_raw, U256::from(5012u64));
        assert_eq!(valued.token0_decimal_value, dec!(0.000000000000004962));
        assert_eq!(valued.token1_decimal_value, dec!(0.005012));
        assert_eq!(valued.token0_usd_value.to_string(), "0.0000");
        assert_eq!(valued.token1_usd_value.to_string(), "0.0050");
    }

    #[test]
    fn test_one_whole_token0() {
        // 10^18 raw units of an 18-decimal token priced at 2.5
        let amount = to_decimal("1", U256::exp10(18), 18).unwrap();
        assert_eq!(amount, dec!(1));
        let usd = usd_value("1", amount, dec!(2.5)).unwrap();
        assert_eq!(usd.to_string(), "2.5000");
    }

    #[test]
    fn test_per_token_decimals() {
        // Above range: entirely token1 with 6 decimals.
        let valued = value_position(&position(300, 0, 200, 10u128.pow(12))).unwrap();
        assert!(valued.token0_amount_raw.is_zero());
        assert_eq!(valued.token0_usd_value.to_string(), "0.0000");
        let expected = Decimal::from(valued.token1_amount_raw.as_u128()) / dec!(1000000);
        assert_eq!(valued.token1_decimal_value, expected);
    }

    #[test]
    fn test_deterministic_output() {
        let p = position(150, 0, 200, 123_456_789_000_000_000);
        let a = value_position(&p).unwrap();
        let b = value_position(&p).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.token0_usd_value.to_string(), b.token0_usd_value.to_string());
        assert_eq!(a.token1_usd_value.to_string(), b.token1_usd_value.to_string());
    }

    #[test]
    fn test_equal_ticks_rejected() {
        let err = value_position(&position(100, 100, 100, 1)).unwrap_err();
        assert!(matches!(err, ValuationError::InvalidRange { lower: 100, upper: 100, .. }));
    }

    #[test]
    fn test_missing_decimals_rejected() {
        let mut p = position(100, 0, 200, 1);
        p.token1.decimals = None;
        let err = value_position(&p).unwrap_err();
        assert_eq!(
            err,
            ValuationError::MissingTokenMetadata {
                position_id: "42".to_string(),
                token_id: "0xt1".to_string(),
                field: TokenField::Decimals,
            }
        );
    }

    #[test]
    fn test_missing_price_rejected() {
        let mut p = position(100, 0, 200, 1);
        p.token0.derived_usd = None;
        let err = value_position(&p).unwrap_err();
        assert!(matches!(
            err,
            ValuationError::MissingTokenMetadata {
                field: TokenField::DerivedUsd,
                ..
            }
        ));
    }

    #[test]
    fn test_zero_liquidity_values_to_zero() {
        let valued = value_position(&position(100, 0, 200, 0)).unwrap();
        assert!(valued.token0_amount_raw.is_zero());
        assert!(valued.token1_amount_raw.is_zero());
        assert_eq!(valued.total_usd(), Decimal::ZERO);
    }
}
