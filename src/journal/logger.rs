//! Append-only operation journal
//!
//! Each entry is written as a single JSON line and flushed immediately.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use crate::error::{SnapvaultError, SnapvaultResult};

use super::entry::JournalEntry;

/// Writes journal entries to a JSONL file
#[derive(Debug, Clone)]
pub struct Journal {
    /// Path to the journal file
    path: PathBuf,
}

impl Journal {
    /// Create a Journal that writes to the specified path
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Append one entry
    ///
    /// Creates the parent directory if needed; a restore may have just
    /// replaced the logs directory.
    pub fn append(&self, entry: &JournalEntry) -> SnapvaultResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| SnapvaultError::Io(format!("Failed to create journal directory: {}", e)))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| SnapvaultError::Io(format!("Failed to open journal: {}", e)))?;

        let json = serde_json::to_string(entry)
            .map_err(|e| SnapvaultError::Json(format!("Failed to serialize journal entry: {}", e)))?;

        writeln!(file, "{}", json)
            .map_err(|e| SnapvaultError::Io(format!("Failed to write journal entry: {}", e)))?;

        file.flush()
            .map_err(|e| SnapvaultError::Io(format!("Failed to flush journal: {}", e)))?;

        Ok(())
    }

    /// Append an entry, logging instead of failing
    ///
    /// Used after the operation itself has succeeded. Returns the failure
    /// as a warning string.
    pub fn record(&self, entry: &JournalEntry) -> Option<String> {
        match self.append(entry) {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(error = %e, journal = %self.path.display(), "journal write failed");
                Some(format!("Journal not updated: {}", e))
            }
        }
    }

    /// Read all entries, oldest first
    pub fn read_all(&self) -> SnapvaultResult<Vec<JournalEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .map_err(|e| SnapvaultError::Io(format!("Failed to open journal: {}", e)))?;

        let mut entries = Vec::new();

        for (line_num, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                SnapvaultError::Io(format!("Failed to read journal line {}: {}", line_num + 1, e))
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: JournalEntry = serde_json::from_str(&line).map_err(|e| {
                SnapvaultError::Json(format!(
                    "Failed to parse journal entry at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            entries.push(entry);
        }

        Ok(entries)
    }

    /// Read the most recent N entries
    pub fn read_recent(&self, count: usize) -> SnapvaultResult<Vec<JournalEntry>> {
        let mut entries = self.read_all()?;
        let start = entries.len().saturating_sub(count);
        Ok(entries.split_off(start))
    }
}
