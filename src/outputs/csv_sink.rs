//! CSV output.
//!
//! The output file is truncated and given its header when the sink is
//! created, so every run starts from a clean file; each record written
//! afterwards is appended and flushed immediately.

use crate::models::{CSV_HEADER, Record};
use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Owned writer for the results file.
///
/// Dropping the sink flushes any buffered rows; call [`CsvSink::finish`] to
/// observe flush errors.
pub struct CsvSink {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows: usize,
}

impl CsvSink {
    /// Create (or truncate) `path` and write the header row.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn create(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let path = path.as_ref().to_path_buf();
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(CSV_HEADER)?;
        writer.flush()?;
        info!("Created CSV output with header");
        Ok(Self {
            path,
            writer,
            rows: 0,
        })
    }

    /// Append one record as a row.
    pub fn append(&mut self, record: &Record) -> Result<(), Box<dyn Error>> {
        self.writer.write_record(record.csv_row()?)?;
        self.writer.flush()?;
        self.rows += 1;
        debug!(path = %self.path.display(), rows = self.rows, "Appended CSV row");
        Ok(())
    }

    /// Flush and close the file, returning the number of rows written.
    pub fn finish(mut self) -> Result<usize, Box<dyn Error>> {
        self.writer.flush()?;
        info!(path = %self.path.display(), rows = self.rows, "Closed CSV output");
        Ok(self.rows)
    }
}
