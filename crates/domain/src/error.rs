//! Error types for position math and valuation.

use thiserror::Error;

/// Errors raised by the fixed-point math layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    /// Tick range is empty or inverted.
    #[error("invalid tick range: lower {lower} must be below upper {upper}")]
    InvalidRange {
        /// Lower tick bound.
        lower: i32,
        /// Upper tick bound.
        upper: i32,
    },
    /// Tick outside the representable price domain.
    #[error("tick {0} out of bounds")]
    TickOutOfBounds(i32),
    /// Square root price must be non-zero.
    #[error("sqrt price is zero")]
    ZeroSqrtPrice,
    /// Intermediate result does not fit in 256 bits.
    #[error("arithmetic overflow")]
    Overflow,
}

/// Which token descriptor field is unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenField {
    Decimals,
    DerivedUsd,
}

impl std::fmt::Display for TokenField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decimals => f.write_str("decimals"),
            Self::DerivedUsd => f.write_str("derivedUSD"),
        }
    }
}

/// Errors raised while valuing a single position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValuationError {
    /// Position tick range is malformed.
    #[error("position {position_id}: invalid tick range [{lower}, {upper}]")]
    InvalidRange {
        /// Position identifier.
        position_id: String,
        /// Lower tick bound.
        lower: i32,
        /// Upper tick bound.
        upper: i32,
    },
    /// Token descriptor lacks a field needed for valuation.
    #[error("position {position_id}: token {token_id} has missing or invalid {field}")]
    MissingTokenMetadata {
        /// Position identifier.
        position_id: String,
        /// Token address.
        token_id: String,
        /// Offending field.
        field: TokenField,
    },
    /// Any other math failure.
    #[error("position {position_id}: {source}")]
    Math {
        /// Position identifier.
        position_id: String,
        /// Underlying error.
        #[source]
        source: MathError,
    },
    /// Decimal amount does not fit the decimal type.
    #[error("position {position_id}: decimal overflow")]
    Overflow {
        /// Position identifier.
        position_id: String,
    },
}

impl ValuationError {
    /// Wraps a math error with the position it belongs to.
    pub fn from_math(position_id: &str, err: MathError) -> Self {
        match err {
            MathError::InvalidRange { lower, upper } => Self::InvalidRange {
                position_id: position_id.to_string(),
                lower,
                upper,
            },
            source => Self::Math {
                position_id: position_id.to_string(),
                source,
            },
        }
    }

    /// Identifier of the position that failed.
    #[must_use]
    pub fn position_id(&self) -> &str {
        match self {
            Self::InvalidRange { position_id, .. }
            | Self::MissingTokenMetadata { position_id, .. }
            | Self::Math { position_id, .. }
            | Self::Overflow { position_id } => position_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_math_maps_invalid_range() {
        let err = ValuationError::from_math("7", MathError::InvalidRange { lower: 5, upper: 5 });
        assert_eq!(
            err,
            ValuationError::InvalidRange {
                position_id: "7".to_string(),
                lower: 5,
                upper: 5
            }
        );
        assert_eq!(err.position_id(), "7");
    }

    #[test]
    fn test_error_display() {
        let err = ValuationError::MissingTokenMetadata {
            position_id: "1".to_string(),
            token_id: "0xabc".to_string(),
            field: TokenField::Decimals,
        };
        assert_eq!(
            err.to_string(),
            "position 1: token 0xabc has missing or invalid decimals"
        );
    }
}
