use crate::error::MathError;
use primitive_types::U256;

/// Lowest tick whose sqrt price fits in Q64.96.
pub const MIN_TICK: i32 = -887_272;
/// Highest tick whose sqrt price fits in Q64.96.
pub const MAX_TICK: i32 = 887_272;

/// `2^96`, the Q64.96 unit.
pub const Q96: U256 = U256([0, 1 << 32, 0, 0]);

/// `sqrt(1.0001^-2^i) * 2^128` for `i` in `0..20`.
const RATIO_STEPS: [u128; 20] = [
    0xfffcb933bd6fad37aa2d162d1a594001,
    0xfff97272373d413259a46990580e213a,
    0xfff2e50f5f656932ef12357cf3c7fdcc,
    0xffe5caca7e10e4e61c3624eaa0941cd0,
    0xffcb9843d60f6159c9db58835c926644,
    0xff973b41fa98c081472e6896dfb254c0,
    0xff2ea16466c96a3843ec78b326b52861,
    0xfe5dee046a99a2a811c461f1969c3053,
    0xfcbe86c7900a88aedcffc83b479aa3a4,
    0xf987a7253ac413176f2b074cf7815e54,
    0xf3392b0822b70005940c7a398e4b70f3,
    0xe7159475a2c29b7443b29c7fa6e889d9,
    0xd097f3bdfd2022b8845ad8f792aa5825,
    0xa9f746462d870fdf8a65dc1f90e061e5,
    0x70d869a156d2a1b890bb3df62baf32f7,
    0x31be135f97d08fd981231505542fcfa6,
    0x09aa508b5b7a84e1c677de54f3e99bc9,
    0x005d6af8dedb81196699c329225ee604,
    0x00002216e584f5fa1ea926041bedfe98,
    0x00000000048a170391f7dc42444e8fa2,
];

/// Returns the Q64.96 sqrt price for a tick, `sqrt(1.0001^tick) * 2^96`.
///
/// Uses binary decomposition of `|tick|` over precomputed Q128.128 factors,
/// inverting for positive ticks and rounding the final shift up.
pub fn get_sqrt_ratio_at_tick(tick: i32) -> Result<U256, MathError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(MathError::TickOutOfBounds(tick));
    }

    let abs_tick = tick.unsigned_abs();
    let mut ratio = if abs_tick & 1 != 0 {
        U256::from(RATIO_STEPS[0])
    } else {
        U256::one() << 128
    };

    for (bit, step) in RATIO_STEPS.iter().enumerate().skip(1) {
        if abs_tick & (1 << bit) != 0 {
            ratio = (ratio * U256::from(*step)) >> 128;
        }
    }

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128.128 -> Q64.96, rounding up
    let rounded = if (ratio & U256::from(u32::MAX)).is_zero() {
        ratio >> 32
    } else {
        (ratio >> 32) + U256::one()
    };
    Ok(rounded)
}
