//! Custom error types for snapvault
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for snapvault operations
#[derive(Error, Debug)]
pub enum SnapvaultError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Invalid input from the caller (bad index, bad name)
    #[error("Validation error: {0}")]
    Validation(String),

    /// An archive could not be written
    #[error("Failed to create archive {}: {reason}", .destination.display())]
    ArchiveCreation { destination: PathBuf, reason: String },

    /// The archive to read does not exist
    #[error("Archive not found: {}", .0.display())]
    ArchiveNotFound(PathBuf),

    /// The archive exists but its gzip/tar stream cannot be parsed
    #[error("Archive is corrupt: {}: {reason}", .archive.display())]
    ArchiveCorrupt { archive: PathBuf, reason: String },

    /// A filesystem write failed while unpacking an archive
    #[error("Extraction of {} failed: {reason}", .archive.display())]
    Extraction { archive: PathBuf, reason: String },

    /// Restore stopped mid-way; files already overwritten stay overwritten
    #[error("Restore from '{snapshot}' only partially applied: {reason}")]
    PartialRestore { snapshot: String, reason: String },

    /// The snapshot store directory cannot be listed
    #[error("Snapshot store unavailable at {}: {reason}", .dir.display())]
    CatalogUnavailable {
        dir: PathBuf,
        reason: String,
        missing: bool,
    },

    /// No snapshot with the requested name
    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),

    /// A backup cycle failed before its archive was in place
    #[error("Backup '{snapshot}' failed: {source}")]
    BackupFailed {
        snapshot: String,
        #[source]
        source: Box<SnapvaultError>,
    },
}

impl SnapvaultError {
    /// Create a "snapshot not found" error
    pub fn snapshot_not_found(name: impl Into<String>) -> Self {
        Self::SnapshotNotFound(name.into())
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SnapshotNotFound(_) | Self::ArchiveNotFound(_))
    }

    /// Check if this error only means the snapshot store has not been created yet
    pub fn is_missing_store(&self) -> bool {
        matches!(self, Self::CatalogUnavailable { missing: true, .. })
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for SnapvaultError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SnapvaultError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for snapvault operations
pub type SnapvaultResult<T> = Result<T, SnapvaultError>;
