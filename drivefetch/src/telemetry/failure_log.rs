//! Append-only failure log.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

/// Durable, append-only record of every non-fatal failure in a run.
///
/// One line per call, flushed before returning so a crash mid-batch does not
/// lose earlier records. The pipeline never reads the log back; it exists
/// purely for operator triage, so a failed append degrades to a `warn!`
/// instead of failing the slot that was being recorded.
#[derive(Debug)]
pub struct FailureSink {
    file: File,
    path: PathBuf,
}

impl FailureSink {
    /// Opens (or creates) the log at `path` in append mode.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Appends one timestamped line and flushes it to disk.
    pub fn record(&mut self, message: &str) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let result = writeln!(self.file, "[{}] {}", timestamp, message)
            .and_then(|_| self.file.flush());
        if let Err(error) = result {
            warn!(
                path = %self.path.display(),
                %error,
                "could not append to failure log"
            );
        }
    }

    /// Location of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
