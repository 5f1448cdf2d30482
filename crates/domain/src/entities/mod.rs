pub mod pool;
pub mod position;
pub mod snapshot_row;
pub mod token;

// Re-export for easier access
pub use pool::PoolSnapshot;
pub use position::{Position, PositionId, PositionWithUsdValue};
pub use snapshot_row::SnapshotRow;
pub use token::Token;
