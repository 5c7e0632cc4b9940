//! Journal entry data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::snapshot::{BackupReport, PruneReport, RestoreReport};

/// Operations recorded in the journal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// A snapshot was written
    Backup,
    /// Old snapshots were deleted outside a backup cycle
    Prune,
    /// The live store was overwritten from a snapshot
    Restore,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Backup => write!(f, "BACKUP"),
            Operation::Prune => write!(f, "PRUNE"),
            Operation::Restore => write!(f, "RESTORE"),
        }
    }
}

/// A single journal line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// When the operation finished (UTC)
    pub timestamp: DateTime<Utc>,

    /// What was done
    pub operation: Operation,

    /// Snapshot written or restored from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<String>,

    /// Short human-readable result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Non-fatal problems (failed deletions)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl JournalEntry {
    /// Entry for a completed backup cycle
    pub fn backup(report: &BackupReport) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: Operation::Backup,
            snapshot: Some(report.snapshot.name.clone()),
            detail: Some(format!(
                "{} bytes, {} entries, pruned {}",
                report.snapshot.size_bytes,
                report.entries,
                report.prune.deleted.len()
            )),
            warnings: report.warnings.clone(),
        }
    }

    /// Entry for a standalone prune
    pub fn prune(report: &PruneReport) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: Operation::Prune,
            snapshot: None,
            detail: Some(format!("deleted {}", report.deleted.len())),
            warnings: report.warnings(),
        }
    }

    /// Entry for a completed restore
    pub fn restore(report: &RestoreReport) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: Operation::Restore,
            snapshot: Some(report.snapshot.name.clone()),
            detail: Some(format!(
                "{} entries into {}",
                report.entries,
                report.restore_root.display()
            )),
            warnings: Vec::new(),
        }
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation
        );

        if let Some(snapshot) = &self.snapshot {
            output.push_str(&format!(" {}", snapshot));
        }
        if let Some(detail) = &self.detail {
            output.push_str(&format!(" ({})", detail));
        }
        for warning in &self.warnings {
            output.push_str(&format!("\n  Warning: {}", warning));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{PruneFailure, Snapshot};
    use std::path::PathBuf;

    fn snapshot(name: &str) -> Snapshot {
        Snapshot {
            name: name.to_string(),
            path: PathBuf::from(name),
            created_at: Utc::now(),
            size_bytes: 128,
        }
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Backup.to_string(), "BACKUP");
        assert_eq!(Operation::Prune.to_string(), "PRUNE");
        assert_eq!(Operation::Restore.to_string(), "RESTORE");
    }

    #[test]
    fn test_prune_entry_carries_warnings() {
        let report = PruneReport {
            deleted: vec![snapshot("backup-2024-01-01T00-00-00-000Z.tar.gz")],
            failures: vec![PruneFailure {
                snapshot: snapshot("backup-2024-01-02T00-00-00-000Z.tar.gz"),
                reason: "Permission denied".into(),
            }],
        };

        let entry = JournalEntry::prune(&report);
        assert_eq!(entry.operation, Operation::Prune);
        assert_eq!(entry.detail.as_deref(), Some("deleted 1"));
        assert_eq!(entry.warnings.len(), 1);

        let formatted = entry.format_human_readable();
        assert!(formatted.contains("PRUNE"));
        assert!(formatted.contains("Permission denied"));
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let entry = JournalEntry::prune(&PruneReport::default());
        let json = serde_json::to_string(&entry).unwrap();

        assert!(!json.contains("warnings"));
        assert!(!json.contains("snapshot"));

        let parsed: JournalEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.operation, Operation::Prune);
    }
}
