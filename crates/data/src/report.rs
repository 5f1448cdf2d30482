//! Report sinks for snapshot rows.

use crate::error::ReportError;
use csv::WriterBuilder;
use lp_tvl_domain::entities::SnapshotRow;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Report column order.
pub const REPORT_HEADERS: [&str; 6] = ["user", "vault", "block", "position", "lpvalue", "lpvalueusd"];

/// Destination for snapshot rows.
pub trait ReportSink {
    /// Appends rows in the given order.
    fn write_rows(&mut self, rows: &[SnapshotRow]) -> Result<(), ReportError>;

    /// Flushes anything buffered.
    fn finish(&mut self) -> Result<(), ReportError>;
}

/// Writes rows as CSV with a header line.
#[derive(Debug)]
pub struct CsvReportWriter<W: Write> {
    writer: csv::Writer<W>,
    rows_written: usize,
}

impl CsvReportWriter<File> {
    /// Creates (or truncates) a CSV report at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        Self::from_writer(File::create(path)?)
    }
}

impl<W: Write> CsvReportWriter<W> {
    /// Wraps `inner` and writes the header line immediately.
    pub fn from_writer(inner: W) -> Result<Self, ReportError> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(inner);
        writer.write_record(REPORT_HEADERS)?;
        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W, ReportError> {
        self.writer
            .into_inner()
            .map_err(|e| ReportError::Io(e.into_error()))
    }
}

impl<W: Write> ReportSink for CsvReportWriter<W> {
    fn write_rows(&mut self, rows: &[SnapshotRow]) -> Result<(), ReportError> {
        for row in rows {
            self.writer.serialize(row)?;
            self.rows_written += 1;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ReportError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Collects rows in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub rows: Vec<SnapshotRow>,
    pub finished: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportSink for MemorySink {
    fn write_rows(&mut self, rows: &[SnapshotRow]) -> Result<(), ReportError> {
        self.rows.extend_from_slice(rows);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ReportError> {
        self.finished = true;
        Ok(())
    }
}
