use crate::error::MathError;
use primitive_types::{U256, U512};

/// Computes `floor(a * b / denominator)` with a 512-bit intermediate product.
///
/// Fails when `denominator` is zero or the quotient does not fit in 256 bits.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::Overflow);
    }
    let product = a.full_mul(b);
    let quotient = product / U512::from(denominator);
    U256::try_from(quotient).map_err(|_| MathError::Overflow)
}
