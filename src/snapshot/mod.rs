//! Snapshot backup and restore
//!
//! # Architecture
//!
//! Leaves first:
//!
//! - `ArchiveCodec`: writes and expands `.tar.gz` archives
//! - `SnapshotCatalog`: lists the archives in the snapshot store, oldest first
//! - `RetentionManager`: deletes all but the newest K snapshots
//! - `SnapshotWriter`: one backup cycle (name, archive, verify, prune)
//! - `RestoreExecutor`: overwrites the live store from a chosen snapshot,
//!   with selection delegated to a `SelectionProvider`
//!
//! # Snapshot Names
//!
//! `backup-<timestamp>.tar.gz`, where the timestamp is ISO-8601 UTC with
//! millisecond precision and `:`/`.` replaced by `-`
//! (`backup-2024-01-12T08-30-00-000Z.tar.gz`). Lexical order of names is
//! chronological order; the catalog sorts on the parsed timestamp.
//!
//! # Example
//!
//! ```rust,ignore
//! use snapvault::config::{AppPaths, Settings};
//! use snapvault::snapshot::{PresetSelection, RestoreExecutor, SnapshotWriter};
//!
//! let paths = AppPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//!
//! let report = SnapshotWriter::from_settings(&paths, &settings).backup()?;
//! println!("wrote {}", report.snapshot.name);
//!
//! let executor = RestoreExecutor::from_settings(&paths, &settings);
//! executor.restore_with(&mut PresetSelection::new(0, true))?;
//! ```

pub mod archive;
pub mod catalog;
pub mod name;
pub mod restore;
pub mod retention;
pub mod selection;
pub mod writer;

pub use archive::{ArchiveCodec, ArchiveHandle, ArchiveSummary};
pub use catalog::{Snapshot, SnapshotCatalog};
pub use name::{is_snapshot_name, parse_snapshot_name, snapshot_name};
pub use restore::{RestoreExecutor, RestoreOutcome, RestoreReport};
pub use retention::{PruneFailure, PruneReport, RetentionManager};
pub use selection::{PresetSelection, SelectionProvider, TerminalSelector};
pub use writer::{BackupReport, SnapshotWriter};
