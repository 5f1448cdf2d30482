use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Significant digits a `Decimal` mantissa can always hold.
const MAX_PRECISION: u32 = 28;

/// A raw on-chain token amount together with its token's decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount {
    pub raw: U256,
    pub decimals: u8,
}

impl Amount {
    pub fn new(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    /// Converts to whole-token units, `raw / 10^decimals`.
    ///
    /// The integer part is kept exactly. Fractional digits beyond the 28
    /// significant digits a `Decimal` holds are rounded half away from zero.
    /// Returns `None` when `decimals` exceeds 28 or the integer part alone
    /// does not fit.
    #[must_use]
    pub fn to_decimal(&self) -> Option<Decimal> {
        let decimals = u32::from(self.decimals);
        if decimals > MAX_PRECISION {
            return None;
        }

        let divisor = U256::exp10(decimals as usize);
        let mut whole = self.raw / divisor;
        let frac = self.raw % divisor;

        let whole_digits = digit_count(whole);
        if whole_digits > MAX_PRECISION {
            return None;
        }
        let scale = decimals.min(MAX_PRECISION - whole_digits);

        let dropped = U256::exp10((decimals - scale) as usize);
        let mut frac_scaled = frac / dropped;
        let remainder = frac % dropped;
        if remainder * U256::from(2u8) >= dropped && !remainder.is_zero() {
            frac_scaled += U256::one();
        }

        let unit = U256::exp10(scale as usize);
        if frac_scaled >= unit {
            frac_scaled -= unit;
            whole += U256::one();
        }

        let mantissa = whole.checked_mul(unit)?.checked_add(frac_scaled)?;
        let mantissa = i128::try_from(u128::try_from(mantissa).ok()?).ok()?;
        Decimal::try_from_i128_with_scale(mantissa, scale).ok()
    }
}

fn digit_count(mut value: U256) -> u32 {
    let ten = U256::from(10u8);
    let mut digits = 0;
    while !value.is_zero() {
        value /= ten;
        digits += 1;
    }
    digits
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_to_decimal_exact() {
        let one_ether = Amount::new(U256::exp10(18), 18);
        assert_eq!(one_ether.to_decimal(), Some(dec!(1)));

        let usdc = Amount::new(U256::from(1_234_567u64), 6);
        assert_eq!(usdc.to_decimal(), Some(dec!(1.234567)));

        let zero_decimals = Amount::new(U256::from(42u8), 0);
        assert_eq!(zero_decimals.to_decimal(), Some(dec!(42)));
    }

    #[test]
    fn test_to_decimal_large_raw_amount() {
        // 2^100 wei, well above what a Decimal mantissa holds.
        let raw = U256::one() << 100;
        let amount = Amount::new(raw, 18).to_decimal().unwrap();
        assert_eq!(amount.trunc(), dec!(1267650600228));
        assert!(amount > dec!(1267650600228.229401));
        assert!(amount < dec!(1267650600228.229402));
    }

    #[test]
    fn test_to_decimal_rounds_half_away() {
        // 27 integer digits leave one fractional digit: 0.15 -> 0.2
        let raw = U256::exp10(26) * U256::from(100u8) + U256::from(15u8);
        let amount = Amount::new(raw, 2).to_decimal().unwrap();
        assert_eq!(amount.scale(), 1);
        assert_eq!(amount.to_string(), "100000000000000000000000000.2");
    }

    #[test]
    fn test_to_decimal_rejects_unrepresentable() {
        assert_eq!(Amount::new(U256::one(), 29).to_decimal(), None);
        assert_eq!(Amount::new(U256::exp10(30), 0).to_decimal(), None);
    }
}
