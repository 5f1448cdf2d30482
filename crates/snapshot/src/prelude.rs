//! Prelude module for convenient imports.
//!
//! ```rust
//! use lp_tvl_snapshot::prelude::*;
//! ```

pub use crate::cancel::CancelFlag;
pub use crate::orchestrator::{OutputMode, SnapshotOrchestrator};
pub use crate::outcome::{
    AggregationFailure, BlockFailure, BlockSummary, PositionFailure, SnapshotError,
    SnapshotOutcome,
};
