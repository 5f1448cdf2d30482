//! Block list reader.

use crate::error::BlockListError;
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Block numbers read from a list, plus the entries that were rejected.
#[derive(Debug, Default)]
pub struct BlockList {
    /// Blocks in file order, duplicates kept.
    pub blocks: Vec<u64>,
    /// One [`BlockListError::Malformed`] per rejected cell.
    pub malformed: Vec<BlockListError>,
}

/// Reads block numbers from a CSV file. See [`read_blocks_from_reader`].
pub fn read_blocks(path: impl AsRef<Path>) -> Result<BlockList, BlockListError> {
    let file = File::open(path.as_ref())?;
    let list = read_blocks_from_reader(file)?;
    info!(
        path = %path.as_ref().display(),
        blocks = list.blocks.len(),
        malformed = list.malformed.len(),
        "Read block list"
    );
    Ok(list)
}

/// Reads block numbers from CSV data.
///
/// The first line is a header. Every non-empty cell of each later line is
/// parsed as a block number; cells that do not parse are recorded in
/// [`BlockList::malformed`] and skipped.
pub fn read_blocks_from_reader<R: Read>(reader: R) -> Result<BlockList, BlockListError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut list = BlockList::default();
    for record in rdr.records() {
        let record = record.map_err(|e| BlockListError::Csv(e.to_string()))?;
        let line = record.position().map_or(0, csv::Position::line);
        for cell in record.iter().filter(|c| !c.is_empty()) {
            match cell.parse::<u64>() {
                Ok(block) => list.blocks.push(block),
                Err(_) => {
                    warn!(line, value = cell, "Skipping malformed block entry");
                    list.malformed.push(BlockListError::Malformed {
                        line,
                        value: cell.to_string(),
                    });
                }
            }
        }
    }
    Ok(list)
}
