//! I/O collaborators for LP TVL snapshots.
//!
//! - Position and vault sources (GraphQL subgraphs, in-memory mocks)
//! - Source registry keyed by chain, protocol and AMM
//! - Block list reader and report sinks

/// Block list reader.
pub mod blocks;
/// Error types.
pub mod error;
/// Source dispatch table.
pub mod registry;
/// Report sinks.
pub mod report;
/// Position and vault sources.
pub mod sources;

pub use blocks::{BlockList, read_blocks, read_blocks_from_reader};
pub use error::{BlockListError, ReportError, SourceError};
pub use registry::{SourceKey, SourceRegistry};
pub use report::{CsvReportWriter, MemorySink, REPORT_HEADERS, ReportSink};
pub use sources::{
    Listing, MockPositionSource, MockVaultSource, PAGE_SIZE, PositionQuery, PositionSource,
    SkippedRecord, SubgraphPositionSource, SubgraphVaultSource, VaultPosition, VaultSource,
};
