pub mod amount;
pub mod usd_value;

pub use amount::Amount;
pub use usd_value::{USD_DECIMAL_PLACES, UsdValue};
