//! CSV log of kept-frame timestamps.
//!
//! The log has the header `frame_number,timestamp_ms` followed by one row
//! per kept frame: the save index and the presentation timestamp in
//! milliseconds with three decimals.

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{Terminator, Writer, WriterBuilder};

use crate::error::SamplerError;

/// File name of the log inside the output directory.
pub const TIMESTAMP_FILE_NAME: &str = "timestamps.csv";

/// Header row of the log.
pub const TIMESTAMP_HEADER: &str = "frame_number,timestamp_ms";

const HEADER_FIELDS: [&str; 2] = ["frame_number", "timestamp_ms"];

/// Append-only writer for the timestamp log.
///
/// Rows are buffered by the CSV writer and flushed once by
/// [`finish`](TimestampLog::finish). Dropping the log without finishing
/// still flushes and closes the file, ignoring errors.
#[derive(Debug)]
pub struct TimestampLog {
    writer: Writer<File>,
    path: PathBuf,
    rows: u64,
}

impl TimestampLog {
    /// Create (or truncate) the log at `path` and write the header.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, SamplerError> {
        let path = path.as_ref().to_path_buf();
        let mut writer = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_writer(File::create(&path)?);
        writer.write_record(HEADER_FIELDS)?;
        Ok(Self {
            writer,
            path,
            rows: 0,
        })
    }

    pub fn append(&mut self, saved_index: u64, timestamp_ms: f64) -> Result<(), SamplerError> {
        self.writer
            .write_record([saved_index.to_string(), format!("{timestamp_ms:.3}")])?;
        self.rows += 1;
        Ok(())
    }

    /// Number of data rows written so far.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush and close the log, returning its path.
    pub fn finish(mut self) -> Result<PathBuf, SamplerError> {
        self.writer.flush()?;
        log::debug!("Wrote {} timestamp rows to {}", self.rows, self.path.display());
        Ok(self.path)
    }
}
