//! Snapshot restoration
//!
//! Overwrites the live store from a chosen snapshot. Restoring is
//! destructive and has no rollback: it does not take a safety snapshot of
//! the current state, and a failure part-way leaves already-written files in
//! place. Callers wanting a way back run a backup first.

use std::path::PathBuf;

use serde::Serialize;

use super::archive::ArchiveCodec;
use super::catalog::{Snapshot, SnapshotCatalog};
use super::selection::SelectionProvider;
use crate::config::{AppPaths, Settings};
use crate::error::{SnapvaultError, SnapvaultResult};
use crate::journal::{Journal, JournalEntry};

/// Result of a completed restore
#[derive(Debug, Clone, Serialize)]
pub struct RestoreReport {
    /// Snapshot the store was restored from
    pub snapshot: Snapshot,
    /// Directory the archive was extracted into
    pub restore_root: PathBuf,
    /// Number of archive entries written
    pub entries: usize,
    /// Uncompressed bytes written
    pub total_bytes: u64,
    /// Non-fatal problems (journal errors)
    pub warnings: Vec<String>,
}

/// How an interactive restore ended
#[derive(Debug, Clone)]
pub enum RestoreOutcome {
    /// The store was overwritten
    Restored(RestoreReport),
    /// The selection provider backed out; nothing was touched
    Cancelled { snapshot: Option<Snapshot> },
    /// The catalog is empty
    NothingToRestore,
}

/// Restores the live store from snapshots in a catalog
#[derive(Debug, Clone)]
pub struct RestoreExecutor {
    catalog: SnapshotCatalog,
    restore_root: PathBuf,
    journal: Option<Journal>,
}

impl RestoreExecutor {
    /// Create an executor that extracts snapshots from `catalog` into
    /// `restore_root`
    pub fn new(catalog: SnapshotCatalog, restore_root: impl Into<PathBuf>) -> Self {
        Self {
            catalog,
            restore_root: restore_root.into(),
            journal: None,
        }
    }

    /// Build an executor for the application layout described by `settings`
    pub fn from_settings(paths: &AppPaths, settings: &Settings) -> Self {
        Self::new(
            SnapshotCatalog::new(paths.backup_dir()),
            settings.restore_root(paths),
        )
        .with_journal(Journal::new(paths.journal_file()))
    }

    /// Record completed restores in `journal`
    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Snapshots available for restore, newest first
    pub fn selectable(&self) -> SnapvaultResult<Vec<Snapshot>> {
        let mut snapshots = self.catalog.list_or_empty()?;
        snapshots.reverse();
        Ok(snapshots)
    }

    /// Overwrite the live store from the snapshot called `name`
    ///
    /// # Errors
    ///
    /// - `SnapshotNotFound` if `name` is not in the catalog (nothing touched)
    /// - `ArchiveCorrupt` if the archive cannot be read (nothing touched)
    /// - `PartialRestore` if a write failed after extraction began
    pub fn restore(&self, name: &str) -> SnapvaultResult<RestoreReport> {
        let snapshot = self
            .catalog
            .get(name)?
            .ok_or_else(|| SnapvaultError::snapshot_not_found(name))?;

        tracing::info!(
            snapshot = %snapshot.name,
            restore_root = %self.restore_root.display(),
            "restoring snapshot"
        );

        let summary = match ArchiveCodec::extract(&snapshot.path, &self.restore_root) {
            Ok(summary) => summary,
            Err(SnapvaultError::Extraction { reason, .. }) => {
                tracing::error!(snapshot = %snapshot.name, %reason, "restore stopped part-way");
                return Err(SnapvaultError::PartialRestore {
                    snapshot: snapshot.name,
                    reason,
                });
            }
            Err(e) => return Err(e),
        };

        let mut report = RestoreReport {
            snapshot,
            restore_root: self.restore_root.clone(),
            entries: summary.entries,
            total_bytes: summary.total_bytes,
            warnings: Vec::new(),
        };

        tracing::info!(
            snapshot = %report.snapshot.name,
            entries = report.entries,
            "snapshot restored"
        );

        if let Some(journal) = &self.journal {
            if let Some(warning) = journal.record(&JournalEntry::restore(&report)) {
                report.warnings.push(warning);
            }
        }

        Ok(report)
    }

    /// Let `selector` pick a snapshot and confirm, then restore it
    pub fn restore_with(&self, selector: &mut dyn SelectionProvider) -> SnapvaultResult<RestoreOutcome> {
        let choices = self.selectable()?;
        if choices.is_empty() {
            return Ok(RestoreOutcome::NothingToRestore);
        }

        let Some(index) = selector.choose(&choices)? else {
            return Ok(RestoreOutcome::Cancelled { snapshot: None });
        };

        let snapshot = choices.get(index).cloned().ok_or_else(|| {
            SnapvaultError::Validation(format!(
                "snapshot index {} is out of range (1-{})",
                index + 1,
                choices.len()
            ))
        })?;

        if !selector.confirm(&snapshot)? {
            tracing::info!(snapshot = %snapshot.name, "restore cancelled");
            return Ok(RestoreOutcome::Cancelled {
                snapshot: Some(snapshot),
            });
        }

        self.restore(&snapshot.name).map(RestoreOutcome::Restored)
    }
}
