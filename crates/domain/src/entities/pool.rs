use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Pool state embedded in a position record at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub id: String,
    /// Current sqrt price, Q64.96.
    pub sqrt_price_x96: U256,
    /// Current pool tick.
    pub tick: i32,
}

impl PoolSnapshot {
    pub fn new(id: impl Into<String>, sqrt_price_x96: U256, tick: i32) -> Self {
        Self {
            id: id.into(),
            sqrt_price_x96,
            tick,
        }
    }
}
