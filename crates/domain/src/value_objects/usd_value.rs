use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Decimal places kept for reported USD values.
pub const USD_DECIMAL_PLACES: u32 = 4;

/// A USD amount rounded to four decimal places, half away from zero.
///
/// Renders and serializes as a fixed four-decimal string such as `"2.5000"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UsdValue(Decimal);

impl UsdValue {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[must_use]
    pub fn from_decimal(value: Decimal) -> Self {
        Self(value.round_dp_with_strategy(
            USD_DECIMAL_PLACES,
            RoundingStrategy::MidpointAwayFromZero,
        ))
    }

    #[must_use]
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for UsdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

impl FromStr for UsdValue {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s).map(Self::from_decimal)
    }
}

impl Serialize for UsdValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for UsdValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
