//! Append-only CSV log.
//!
//! # Storage Format
//!
//! A single UTF-8 CSV file: one header row ([`COLUMNS`]) written when the
//! file is created, then one row per sample. Absent values are empty cells.
//! Existing content is never rewritten; a single writer at a time is assumed.

use std::fs::{self, OpenOptions};
use std::path::Path;

use crate::error::{Error, Result};
use crate::record::{COLUMNS, SampleRecord};

/// What [`append_record`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendOutcome {
    /// The file was new and received the header row.
    pub header_written: bool,
}

/// Create the log directory (and parents) if missing. Idempotent.
pub fn ensure_log_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))
}

/// Append `record` as one row, writing the header first if the file does
/// not exist yet.
pub fn append_record(path: &Path, record: &SampleRecord) -> Result<AppendOutcome> {
    let existed = path.exists();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::io(path, e))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(!existed)
        .from_writer(file);
    writer.serialize(record)?;
    writer.flush().map_err(|e| Error::io(path, e))?;

    log::debug!(
        "appended sample to {}{}",
        path.display(),
        if existed { "" } else { " (new file)" }
    );
    Ok(AppendOutcome {
        header_written: !existed,
    })
}

/// Read every row of the log back.
pub fn read_log(path: &Path) -> Result<Vec<SampleRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    if !headers.iter().eq(COLUMNS.iter().copied()) {
        log::warn!("unexpected log header in {}: {:?}", path.display(), headers);
    }
    reader
        .deserialize()
        .map(|row| row.map_err(Error::from))
        .collect()
}
