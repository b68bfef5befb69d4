//! Allow-list ingestion
//!
//! Reads `address,index,amount` rows from delimited text. Rows with a
//! missing or unparsable field are skipped and counted; only a failure of
//! the underlying reader aborts ingestion.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use crate::types::{parse_address, Entry};

#[derive(Error, Debug)]
pub enum AllowListError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of reading an allow-list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Well-formed entries in source order
    pub entries: Vec<Entry>,
    /// Number of malformed rows that were dropped
    pub skipped: usize,
}

/// Parse a single row. Returns `None` for anything malformed.
pub fn parse_row(line: &str) -> Option<Entry> {
    let mut fields = line
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|f| !f.is_empty());

    let address = parse_address(fields.next()?).ok()?;
    let index = fields.next()?.parse::<u64>().ok()?;
    let amount = fields.next()?.parse::<u128>().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some(Entry::new(address, index, amount))
}

/// Read every row from `reader`.
pub fn read_allow_list<R: BufRead>(reader: R) -> Result<IngestReport, AllowListError> {
    let mut report = IngestReport::default();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match parse_row(trimmed) {
            Some(entry) => report.entries.push(entry),
            None => {
                warn!("Skipping malformed allow-list row {}: {:?}", line_num + 1, trimmed);
                report.skipped += 1;
            }
        }
    }

    debug!(
        "Allow-list read: {} entries, {} skipped",
        report.entries.len(),
        report.skipped,
    );
    Ok(report)
}

/// Open and read an allow-list file.
pub fn load_allow_list(path: &Path) -> Result<IngestReport, AllowListError> {
    let file = File::open(path)?;
    read_allow_list(BufReader::new(file))
}
