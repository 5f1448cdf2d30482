//! Historical TVL snapshots of LP positions.
//!
//! The [`orchestrator::SnapshotOrchestrator`] walks a block list, values each
//! block's positions and produces report rows along with a record of every
//! block or position it had to skip.

/// Prelude module for convenient imports.
pub mod prelude;

/// Cancellation flag.
pub mod cancel;
/// Snapshot orchestrator.
pub mod orchestrator;
/// Run outcome and failure records.
pub mod outcome;
