//! Snapshot writer
//!
//! Runs one backup cycle: pick a unique name, archive the live store into the
//! snapshot store, check the archive landed, then apply retention.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::archive::ArchiveCodec;
use super::catalog::{Snapshot, SnapshotCatalog};
use super::name::{snapshot_name, truncate_to_millis};
use super::retention::{PruneReport, RetentionManager};
use crate::config::{AppPaths, Settings};
use crate::error::{SnapvaultError, SnapvaultResult};
use crate::journal::{Journal, JournalEntry};

/// Result of a successful backup cycle
#[derive(Debug, Clone, Serialize)]
pub struct BackupReport {
    /// The snapshot just written
    pub snapshot: Snapshot,
    /// Number of archive entries
    pub entries: usize,
    /// What retention removed afterwards
    pub prune: PruneReport,
    /// Non-fatal problems: failed deletions, unreadable catalog, journal errors
    pub warnings: Vec<String>,
}

/// Orchestrates backup cycles
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    codec: ArchiveCodec,
    catalog: SnapshotCatalog,
    retention: RetentionManager,
    members: Vec<PathBuf>,
    journal: Option<Journal>,
}

impl SnapshotWriter {
    /// Create a writer that archives `members` (relative to the codec's
    /// source root) into the catalog's store
    pub fn new(
        codec: ArchiveCodec,
        catalog: SnapshotCatalog,
        retention: RetentionManager,
        members: Vec<PathBuf>,
    ) -> Self {
        Self {
            codec,
            catalog,
            retention,
            members,
            journal: None,
        }
    }

    /// Build a writer for the application layout described by `settings`
    pub fn from_settings(paths: &AppPaths, settings: &Settings) -> Self {
        Self::new(
            ArchiveCodec::new(paths.base_dir()),
            SnapshotCatalog::new(paths.backup_dir()),
            RetentionManager::new(settings.retention.keep),
            settings.backup_members(),
        )
        .with_journal(Journal::new(paths.journal_file()))
    }

    /// Record completed backups in `journal`
    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Override the number of snapshots retention keeps
    pub fn with_keep(mut self, keep: usize) -> Self {
        self.retention = RetentionManager::new(keep);
        self
    }

    /// Get the catalog this writer adds to
    pub fn catalog(&self) -> &SnapshotCatalog {
        &self.catalog
    }

    /// Take a snapshot now
    pub fn backup(&self) -> SnapvaultResult<BackupReport> {
        self.backup_at(Utc::now())
    }

    /// Take a snapshot stamped with `now`
    ///
    /// # Errors
    ///
    /// `BackupFailed` wrapping the store, catalog or archive error if the
    /// snapshot could not be written. Retention problems are reported in
    /// [`BackupReport::warnings`] instead.
    pub fn backup_at(&self, now: DateTime<Utc>) -> SnapvaultResult<BackupReport> {
        let store_dir = self.catalog.store_dir();
        fs::create_dir_all(store_dir).map_err(|e| {
            backup_failed(
                snapshot_name(truncate_to_millis(now)),
                SnapvaultError::Io(format!(
                    "Failed to create snapshot store {}: {}",
                    store_dir.display(),
                    e
                )),
            )
        })?;

        let (created_at, name) = self
            .unique_name(now)
            .map_err(|e| backup_failed(snapshot_name(truncate_to_millis(now)), e))?;
        let destination = store_dir.join(&name);

        let failed = |source: SnapvaultError| backup_failed(name.clone(), source);

        let handle = self
            .codec
            .create(&self.members, &destination)
            .map_err(failed)?;

        // Verify the archive is where the codec said it is
        let size_bytes = fs::metadata(&handle.path)
            .map(|m| m.len())
            .map_err(|e| {
                failed(SnapvaultError::ArchiveCreation {
                    destination: destination.clone(),
                    reason: format!("archive missing after write: {}", e),
                })
            })?;

        let snapshot = Snapshot {
            name: name.clone(),
            path: handle.path,
            created_at,
            size_bytes,
        };

        tracing::info!(
            snapshot = %snapshot.name,
            size_bytes,
            entries = handle.entries,
            "snapshot created"
        );

        let mut warnings = Vec::new();
        let prune = match self.catalog.list() {
            Ok(listing) => self.retention.prune(&listing),
            Err(e) => {
                tracing::warn!(error = %e, "retention skipped");
                warnings.push(format!("Retention skipped: {}", e));
                PruneReport::default()
            }
        };
        warnings.extend(prune.warnings());

        let mut report = BackupReport {
            snapshot,
            entries: handle.entries,
            prune,
            warnings,
        };

        if let Some(journal) = &self.journal {
            if let Some(warning) = journal.record(&JournalEntry::backup(&report)) {
                report.warnings.push(warning);
            }
        }

        Ok(report)
    }

    /// Pick a name that sorts after every existing snapshot and is not taken
    fn unique_name(&self, now: DateTime<Utc>) -> SnapvaultResult<(DateTime<Utc>, String)> {
        let mut at = truncate_to_millis(now);

        if let Some(latest) = self.catalog.latest()? {
            if latest.created_at >= at {
                at = latest.created_at + Duration::milliseconds(1);
            }
        }

        loop {
            let name = snapshot_name(at);
            if !self.catalog.store_dir().join(&name).exists() {
                return Ok((at, name));
            }
            at += Duration::milliseconds(1);
        }
    }
}

fn backup_failed(snapshot: String, source: SnapvaultError) -> SnapvaultError {
    SnapvaultError::BackupFailed {
        snapshot,
        source: Box::new(source),
    }
}
