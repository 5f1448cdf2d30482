use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chains with supported position sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chain {
    Mode,
    Linea,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    Poolshark,
    Supswap,
    Airpuff,
}

/// AMM flavour of a protocol deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmmType {
    UniswapV3,
    Poolshark,
}

impl AmmType {
    /// Whether the AMM's subgraph indexes `limitPositions` next to range positions.
    #[must_use]
    pub fn has_limit_positions(&self) -> bool {
        matches!(self, Self::Poolshark)
    }
}

/// Which query shape produced a position record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionKind {
    /// Range (liquidity provision) position.
    Range,
    /// Limit order position.
    Limit,
}

macro_rules! display_from_str {
    ($ty:ty { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let name = match self {
                    $(Self::$variant => $name,)+
                };
                f.write_str(name)
            }
        }

        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($name => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: stringify!($ty),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

display_from_str!(Chain { Mode => "mode", Linea => "linea" });
display_from_str!(Protocol {
    Poolshark => "poolshark",
    Supswap => "supswap",
    Airpuff => "airpuff",
});
display_from_str!(AmmType { UniswapV3 => "uniswapv3", Poolshark => "poolshark" });
display_from_str!(PositionKind { Range => "range", Limit => "limit" });

/// Returned when parsing an enum from an unrecognised name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    /// Enum being parsed.
    pub kind: &'static str,
    /// Rejected input.
    pub value: String,
}
