//! Snapshot catalog
//!
//! Enumerates the archives in the snapshot store. Ordering always comes from
//! the timestamp embedded in each name, never from filesystem mtimes, which
//! copies and restores can change.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::name::parse_snapshot_name;
use crate::error::{SnapvaultError, SnapvaultResult};

/// One archived copy of the live store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Archive file name, e.g. `backup-2024-01-12T08-30-00-000Z.tar.gz`
    pub name: String,
    /// Full path to the archive
    pub path: PathBuf,
    /// When the snapshot was taken (parsed from the name)
    pub created_at: DateTime<Utc>,
    /// Compressed size in bytes
    pub size_bytes: u64,
}

/// Ordered view over the snapshot store directory
#[derive(Debug, Clone)]
pub struct SnapshotCatalog {
    store_dir: PathBuf,
}

impl SnapshotCatalog {
    /// Create a catalog over `store_dir`
    pub fn new(store_dir: impl Into<PathBuf>) -> Self {
        Self {
            store_dir: store_dir.into(),
        }
    }

    /// Get the snapshot store directory
    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }

    /// List all snapshots, oldest first
    ///
    /// Entries that do not match the naming pattern are ignored. Identical
    /// timestamps fall back to lexical name order.
    ///
    /// # Errors
    ///
    /// `CatalogUnavailable` if the store cannot be listed. A store that does
    /// not exist yet is reported with `missing: true`.
    pub fn list(&self) -> SnapvaultResult<Vec<Snapshot>> {
        let unavailable = |e: io::Error| SnapvaultError::CatalogUnavailable {
            dir: self.store_dir.clone(),
            missing: e.kind() == io::ErrorKind::NotFound,
            reason: e.to_string(),
        };

        let mut snapshots = Vec::new();

        for entry in fs::read_dir(&self.store_dir).map_err(unavailable)? {
            let entry = entry.map_err(unavailable)?;

            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let Some(created_at) = parse_snapshot_name(name) else {
                continue;
            };

            let metadata = match entry.metadata() {
                Ok(metadata) if metadata.is_file() => metadata,
                Ok(_) => continue,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(unavailable(e)),
            };

            snapshots.push(Snapshot {
                name: name.to_string(),
                path: entry.path(),
                created_at,
                size_bytes: metadata.len(),
            });
        }

        sort_snapshots(&mut snapshots);
        Ok(snapshots)
    }

    /// Like [`list`](Self::list), but a store that does not exist yet is empty
    pub fn list_or_empty(&self) -> SnapvaultResult<Vec<Snapshot>> {
        match self.list() {
            Err(e) if e.is_missing_store() => Ok(Vec::new()),
            other => other,
        }
    }

    /// Check whether a snapshot with this exact name is in the catalog
    pub fn exists(&self, name: &str) -> SnapvaultResult<bool> {
        Ok(self.get(name)?.is_some())
    }

    /// Look up a snapshot by name
    pub fn get(&self, name: &str) -> SnapvaultResult<Option<Snapshot>> {
        Ok(self.list_or_empty()?.into_iter().find(|s| s.name == name))
    }

    /// Get the most recent snapshot
    pub fn latest(&self) -> SnapvaultResult<Option<Snapshot>> {
        Ok(self.list_or_empty()?.pop())
    }
}

/// Ascending by parsed timestamp, ties broken by name
pub fn sort_snapshots(snapshots: &mut [Snapshot]) {
    snapshots.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"archive").unwrap();
    }

    #[test]
    fn test_list_sorted_by_name_timestamp() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "backup-2024-03-01T00-00-00-000Z.tar.gz");
        touch(temp.path(), "backup-2024-01-01T00-00-00-000Z.tar.gz");
        touch(temp.path(), "backup-2024-02-01T12-00-00-500Z.tar.gz");

        let catalog = SnapshotCatalog::new(temp.path());
        let names: Vec<_> = catalog.list().unwrap().into_iter().map(|s| s.name).collect();

        assert_eq!(
            names,
            vec![
                "backup-2024-01-01T00-00-00-000Z.tar.gz",
                "backup-2024-02-01T12-00-00-500Z.tar.gz",
                "backup-2024-03-01T00-00-00-000Z.tar.gz",
            ]
        );
    }

    #[test]
    fn test_list_ignores_foreign_entries() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "backup-2024-01-01T00-00-00-000Z.tar.gz");
        touch(temp.path(), "notes.txt");
        touch(temp.path(), ".backup-abc123.partial");
        touch(temp.path(), "backup-latest.tar.gz");
        fs::create_dir(temp.path().join("backup-2024-05-01T00-00-00-000Z.tar.gz")).unwrap();

        let catalog = SnapshotCatalog::new(temp.path());
        let snapshots = catalog.list().unwrap();

        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].size_bytes, 7);
    }

    #[test]
    fn test_missing_store() {
        let temp = TempDir::new().unwrap();
        let catalog = SnapshotCatalog::new(temp.path().join("backups"));

        let err = catalog.list().unwrap_err();
        assert!(err.is_missing_store());

        assert!(catalog.list_or_empty().unwrap().is_empty());
        assert!(!catalog.exists("backup-2024-01-01T00-00-00-000Z.tar.gz").unwrap());
        assert!(catalog.latest().unwrap().is_none());
    }

    #[test]
    fn test_unlistable_store_is_not_treated_as_empty() {
        let temp = TempDir::new().unwrap();
        let store = temp.path().join("backups");
        fs::write(&store, b"not a directory").unwrap();
        let catalog = SnapshotCatalog::new(&store);

        let err = catalog.list().unwrap_err();
        assert!(matches!(
            err,
            SnapvaultError::CatalogUnavailable { missing: false, .. }
        ));
        assert!(!err.is_missing_store());

        assert!(catalog.list_or_empty().is_err());
        assert!(catalog.exists("backup-2024-01-01T00-00-00-000Z.tar.gz").is_err());
        assert!(catalog.latest().is_err());
    }

    #[test]
    fn test_exists_and_latest() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "backup-2024-01-01T00-00-00-000Z.tar.gz");
        touch(temp.path(), "backup-2024-01-02T00-00-00-000Z.tar.gz");

        let catalog = SnapshotCatalog::new(temp.path());
        assert!(catalog.exists("backup-2024-01-01T00-00-00-000Z.tar.gz").unwrap());
        assert!(!catalog.exists("backup-missing.tar.gz").unwrap());
        assert_eq!(
            catalog.latest().unwrap().unwrap().name,
            "backup-2024-01-02T00-00-00-000Z.tar.gz"
        );
    }

    #[test]
    fn test_sort_ties_break_by_name() {
        let at = parse_snapshot_name("backup-2024-01-01T00-00-00-000Z.tar.gz").unwrap();
        let snapshot = |name: &str| Snapshot {
            name: name.to_string(),
            path: PathBuf::from(name),
            created_at: at,
            size_bytes: 0,
        };

        let mut snapshots = vec![snapshot("b"), snapshot("a"), snapshot("c")];
        sort_snapshots(&mut snapshots);

        let names: Vec<_> = snapshots.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
