//! Domain model and math for valuing concentrated liquidity LP positions.
//!
//! - Integer fixed-point tick and liquidity math
//! - Position valuation into token amounts and USD
//! - Aggregation of valued positions per owner and pool

/// Prelude module for convenient imports.
pub mod prelude;

/// Owner/pool aggregation.
pub mod aggregation;
/// Entities read from position sources.
pub mod entities;
/// Chain, protocol and AMM selectors.
pub mod enums;
/// Error types.
pub mod error;
/// Fixed-point math.
pub mod math;
/// Position valuation.
pub mod valuation;
/// Value objects.
pub mod value_objects;
