//! Error types for position sources, block lists and reports.

use thiserror::Error;

/// Errors returned by position and vault sources.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Request could not be sent or the body could not be read.
    #[error("transport error: {0}")]
    Transport(String),
    /// Endpoint answered with a non-success status.
    #[error("HTTP error {status}: {message}")]
    Http {
        /// Status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },
    /// Payload lacks the expected entity, e.g. `data.rangePositions`.
    #[error("malformed payload: {entity} missing ({detail})")]
    MalformedPayload {
        /// Entity that was expected.
        entity: String,
        /// Extra context such as GraphQL error messages.
        detail: String,
    },
    /// Payload is present but a record could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
    /// No source is registered for the requested key.
    #[error("no source configured for {0}")]
    NotConfigured(String),
}

/// Errors raised while reading a block list.
#[derive(Debug, Error)]
pub enum BlockListError {
    /// File could not be opened.
    #[error("failed to open block list: {0}")]
    Io(#[from] std::io::Error),
    /// CSV structure could not be read.
    #[error("failed to read block list: {0}")]
    Csv(String),
    /// A cell does not hold a block number.
    #[error("line {line}: '{value}' is not a block number")]
    Malformed {
        /// 1-based line number.
        line: u64,
        /// Offending cell.
        value: String,
    },
}

/// Errors raised by report sinks.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to create report: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write report row: {0}")]
    Csv(#[from] csv::Error),
}
