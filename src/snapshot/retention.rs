//! Retention pruning
//!
//! Enforces a "keep the newest K" policy over an ascending catalog listing.
//! Deletions are independent: one failure never stops the rest, and failures
//! come back as warnings rather than errors.

use std::fs;

use serde::Serialize;

use super::catalog::Snapshot;

/// A snapshot that should have been deleted but could not be
#[derive(Debug, Clone, Serialize)]
pub struct PruneFailure {
    /// The snapshot that is still on disk
    pub snapshot: Snapshot,
    /// Why the delete failed
    pub reason: String,
}

/// Outcome of one prune pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct PruneReport {
    /// Snapshots removed from the store, oldest first
    pub deleted: Vec<Snapshot>,
    /// Snapshots that could not be removed
    pub failures: Vec<PruneFailure>,
}

impl PruneReport {
    /// Check if every eligible snapshot was removed
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable warnings, one per failed deletion
    pub fn warnings(&self) -> Vec<String> {
        self.failures
            .iter()
            .map(|f| format!("Could not delete {}: {}", f.snapshot.name, f.reason))
            .collect()
    }
}

/// Applies the keep-newest-K policy
#[derive(Debug, Clone, Copy)]
pub struct RetentionManager {
    keep: usize,
}

impl RetentionManager {
    /// Create a manager that keeps at most `keep` snapshots
    pub fn new(keep: usize) -> Self {
        Self { keep }
    }

    /// Snapshots a prune would delete: the oldest `len - keep` entries of an
    /// ascending catalog
    pub fn plan<'a>(&self, catalog: &'a [Snapshot]) -> &'a [Snapshot] {
        let excess = catalog.len().saturating_sub(self.keep);
        &catalog[..excess]
    }

    /// Delete everything but the newest `keep` snapshots
    ///
    /// `catalog` must be in ascending order, as returned by
    /// [`SnapshotCatalog::list`](super::SnapshotCatalog::list).
    pub fn prune(&self, catalog: &[Snapshot]) -> PruneReport {
        let mut report = PruneReport::default();

        for snapshot in self.plan(catalog) {
            match fs::remove_file(&snapshot.path) {
                Ok(()) => {
                    tracing::debug!(snapshot = %snapshot.name, "pruned snapshot");
                    report.deleted.push(snapshot.clone());
                }
                Err(e) => {
                    tracing::warn!(snapshot = %snapshot.name, error = %e, "failed to prune snapshot");
                    report.failures.push(PruneFailure {
                        snapshot: snapshot.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if !report.deleted.is_empty() || !report.failures.is_empty() {
            tracing::info!(
                keep = self.keep,
                deleted = report.deleted.len(),
                failed = report.failures.len(),
                "retention applied"
            );
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::catalog::SnapshotCatalog;
    use crate::snapshot::name::snapshot_name;
    use chrono::{Duration, TimeZone, Utc};
    use std::path::Path;
    use tempfile::TempDir;

    /// Write `count` snapshots one day apart starting 2024-01-01
    fn populate(dir: &Path, count: usize) -> SnapshotCatalog {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        for day in 0..count {
            let name = snapshot_name(start + Duration::days(day as i64));
            fs::write(dir.join(name), b"archive").unwrap();
        }
        SnapshotCatalog::new(dir)
    }

    #[test]
    fn test_prune_keeps_newest_ten_of_twelve() {
        let temp = TempDir::new().unwrap();
        let catalog = populate(temp.path(), 12);

        let report = RetentionManager::new(10).prune(&catalog.list().unwrap());

        let deleted: Vec<_> = report.deleted.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            deleted,
            vec![
                "backup-2024-01-01T00-00-00-000Z.tar.gz",
                "backup-2024-01-02T00-00-00-000Z.tar.gz",
            ]
        );
        assert!(report.is_clean());

        let remaining = catalog.list().unwrap();
        assert_eq!(remaining.len(), 10);
        assert_eq!(remaining[0].name, "backup-2024-01-03T00-00-00-000Z.tar.gz");
    }

    #[test]
    fn test_prune_under_limit_is_noop() {
        let temp = TempDir::new().unwrap();
        let catalog = populate(temp.path(), 3);

        let report = RetentionManager::new(10).prune(&catalog.list().unwrap());

        assert!(report.deleted.is_empty());
        assert_eq!(catalog.list().unwrap().len(), 3);
    }

    #[test]
    fn test_prune_result_size_is_min_of_n_and_k() {
        for n in 0..6 {
            for k in 0..7 {
                let temp = TempDir::new().unwrap();
                let catalog = populate(temp.path(), n);
                let before = catalog.list().unwrap();

                RetentionManager::new(k).prune(&before);

                let after = catalog.list().unwrap();
                assert_eq!(after.len(), n.min(k), "n={n} k={k}");
                assert_eq!(after[..], before[n - after.len()..], "n={n} k={k}");
            }
        }
    }

    #[test]
    fn test_prune_collects_failures_and_continues() {
        let temp = TempDir::new().unwrap();
        let catalog = populate(temp.path(), 4);
        let listing = catalog.list().unwrap();

        // The first eligible entry vanishes before the prune runs
        fs::remove_file(&listing[0].path).unwrap();

        let report = RetentionManager::new(1).prune(&listing);

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].snapshot.name, listing[0].name);
        assert_eq!(report.deleted.len(), 2);
        assert_eq!(report.warnings().len(), 1);
        assert_eq!(catalog.list().unwrap().len(), 1);
    }

    #[test]
    fn test_plan_does_not_delete() {
        let temp = TempDir::new().unwrap();
        let catalog = populate(temp.path(), 5);
        let listing = catalog.list().unwrap();

        let planned = RetentionManager::new(2).plan(&listing);

        assert_eq!(planned.len(), 3);
        assert_eq!(catalog.list().unwrap().len(), 5);
    }
}
