//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the snapshot subsystem.

pub mod snapshot;

pub use snapshot::{
    handle_snapshot_command, list_snapshots_newest_first, restore_by_index_with_confirmation,
    run_backup_once, SnapshotCommands,
};
