//! Append-only ingest log.

use crate::models::IngestLogEntry;
use crate::{Error, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Newline-delimited JSON audit trail of ingestion events.
///
/// Entries are appended one line at a time and never rewritten.
#[derive(Debug, Clone)]
pub struct IngestLog {
    path: PathBuf,
}

impl IngestLog {
    /// Creates a log writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the log path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one entry.
    pub fn append(&self, entry: &IngestLogEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::operation("create_log_dir", e))?;
        }

        let json = serde_json::to_string(entry).map_err(|e| Error::operation("serialize_log_entry", e))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::operation("open_ingest_log", format!("{}: {e}", self.path.display())))?;

        writeln!(file, "{json}").map_err(|e| Error::operation("append_ingest_log", e))
    }

    /// Reads every parseable entry, skipping malformed lines.
    ///
    /// A missing log reads as empty.
    pub fn read_all(&self) -> Result<Vec<IngestLogEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| Error::operation("read_ingest_log", e))?;
        Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed ingest log line");
                    None
                },
            })
            .collect())
    }
}
