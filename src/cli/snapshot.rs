//! Snapshot CLI commands
//!
//! Bridges clap argument parsing to the snapshot writer and restore
//! executor. The three `pub fn` operations at the top are the whole surface
//! other front ends need.

use std::io;

use clap::Subcommand;

use crate::config::paths::AppPaths;
use crate::config::settings::Settings;
use crate::display::{format_size, format_snapshot_details, format_snapshot_list};
use crate::error::{SnapvaultError, SnapvaultResult};
use crate::journal::{Journal, JournalEntry};
use crate::snapshot::{
    ArchiveCodec, BackupReport, PresetSelection, RestoreExecutor, RestoreOutcome, RestoreReport,
    RetentionManager, Snapshot, SnapshotCatalog, SnapshotWriter, TerminalSelector,
};

/// Snapshot subcommands
#[derive(Subcommand)]
pub enum SnapshotCommands {
    /// Take a snapshot of the live store now
    Backup {
        /// Keep this many snapshots instead of the configured number
        #[arg(short, long)]
        keep: Option<usize>,
    },

    /// List snapshots, newest first
    List {
        /// Show full details for each snapshot
        #[arg(short, long)]
        long: bool,
    },

    /// Restore the live store from a snapshot
    Restore {
        /// Snapshot name (use 'latest' for most recent); omit to choose interactively
        snapshot: Option<String>,

        /// Number shown by `list` (1 = newest)
        #[arg(short, long, conflicts_with = "snapshot")]
        index: Option<usize>,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show information about a specific snapshot
    Info {
        /// Snapshot name (use 'latest' for most recent)
        snapshot: String,
    },

    /// Delete old snapshots according to retention policy
    Prune {
        /// Keep this many snapshots instead of the configured number
        #[arg(short, long)]
        keep: Option<usize>,

        /// Delete without asking for confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Show recent backup, prune and restore operations
    History {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },
}

/// Take one snapshot with the configured live store and retention
pub fn run_backup_once(paths: &AppPaths, settings: &Settings) -> SnapvaultResult<BackupReport> {
    SnapshotWriter::from_settings(paths, settings).backup()
}

/// All snapshots, most recent first
pub fn list_snapshots_newest_first(
    paths: &AppPaths,
    settings: &Settings,
) -> SnapvaultResult<Vec<Snapshot>> {
    RestoreExecutor::from_settings(paths, settings).selectable()
}

/// Restore the snapshot shown as number `index` (1 = newest) by
/// [`list_snapshots_newest_first`], if `confirmed`
pub fn restore_by_index_with_confirmation(
    paths: &AppPaths,
    settings: &Settings,
    index: usize,
    confirmed: bool,
) -> SnapvaultResult<RestoreOutcome> {
    let position = index
        .checked_sub(1)
        .ok_or_else(|| SnapvaultError::Validation("snapshot numbers start at 1".into()))?;

    RestoreExecutor::from_settings(paths, settings)
        .restore_with(&mut PresetSelection::new(position, confirmed))
}

/// Handle a snapshot command
pub fn handle_snapshot_command(
    paths: &AppPaths,
    settings: &Settings,
    cmd: SnapshotCommands,
) -> SnapvaultResult<()> {
    match cmd {
        SnapshotCommands::Backup { keep } => {
            println!("Creating snapshot...");
            let mut writer = SnapshotWriter::from_settings(paths, settings);
            if let Some(keep) = keep {
                writer = writer.with_keep(keep);
            }
            let report = writer.backup()?;

            println!("Snapshot created: {}", report.snapshot.name);
            println!("Location: {}", report.snapshot.path.display());
            println!(
                "Size: {} ({} entries)",
                format_size(report.snapshot.size_bytes),
                report.entries
            );
            if !report.prune.deleted.is_empty() {
                println!("Pruned {} old snapshot(s).", report.prune.deleted.len());
            }
            print_warnings(&report.warnings);
        }

        SnapshotCommands::List { long } => {
            let snapshots = list_snapshots_newest_first(paths, settings)?;

            if snapshots.is_empty() {
                println!("No snapshots found.");
                println!("Create one with: snapvault backup");
                return Ok(());
            }

            if long {
                for (i, snapshot) in snapshots.iter().enumerate() {
                    println!("{}.\n{}\n", i + 1, format_snapshot_details(snapshot));
                }
                println!("Total: {} snapshot(s)", snapshots.len());
            } else {
                println!("{}", format_snapshot_list(&snapshots, chrono::Utc::now()));
            }
        }

        SnapshotCommands::Restore {
            snapshot,
            index,
            yes,
        } => {
            let outcome = match (snapshot, index) {
                (_, Some(index)) => {
                    restore_by_index_with_confirmation(paths, settings, index, yes)?
                }
                (Some(name), None) => {
                    let executor = RestoreExecutor::from_settings(paths, settings);
                    let target = resolve_snapshot(paths, &name)?;
                    if yes {
                        RestoreOutcome::Restored(executor.restore(&target.name)?)
                    } else {
                        RestoreOutcome::Cancelled {
                            snapshot: Some(target),
                        }
                    }
                }
                (None, None) => {
                    let executor = RestoreExecutor::from_settings(paths, settings);
                    let stdin = io::stdin();
                    let mut selector = TerminalSelector::new(stdin.lock(), io::stdout());
                    executor.restore_with(&mut selector)?
                }
            };

            print_restore_outcome(outcome);
        }

        SnapshotCommands::Info { snapshot } => {
            let snapshot = resolve_snapshot(paths, &snapshot)?;
            let summary = ArchiveCodec::inspect(&snapshot.path)?;

            println!("Snapshot Details");
            println!("================");
            println!("{}", format_snapshot_details(&snapshot));
            println!("Entries: {}", summary.entries);
            println!("Content: {}", format_size(summary.total_bytes));
        }

        SnapshotCommands::Prune { keep, force } => {
            let keep = keep.unwrap_or(settings.retention.keep);
            let retention = RetentionManager::new(keep);
            let catalog = SnapshotCatalog::new(paths.backup_dir());
            let snapshots = catalog.list_or_empty()?;
            let planned = retention.plan(&snapshots);

            if planned.is_empty() {
                println!("No snapshots to prune.");
                println!(
                    "Keeping up to {} snapshot(s); you have {}.",
                    keep,
                    snapshots.len()
                );
                return Ok(());
            }

            println!("Prune Summary");
            println!("=============");
            println!("Retention policy: keep {}", keep);
            println!("Current snapshots: {}", snapshots.len());
            println!("To be deleted: {}", planned.len());
            for snapshot in planned {
                println!("  {}", snapshot.name);
            }
            println!();

            if !force {
                println!("To delete these snapshots, run again with --force flag:");
                println!("  snapvault prune --force");
                return Ok(());
            }

            let report = retention.prune(&snapshots);
            println!("Deleted {} snapshot(s).", report.deleted.len());

            let mut warnings = report.warnings();
            if let Some(warning) =
                Journal::new(paths.journal_file()).record(&JournalEntry::prune(&report))
            {
                warnings.push(warning);
            }
            print_warnings(&warnings);
        }

        SnapshotCommands::History { limit } => {
            let entries = Journal::new(paths.journal_file()).read_recent(limit)?;
            if entries.is_empty() {
                println!("No operations recorded yet.");
                return Ok(());
            }
            for entry in entries {
                println!("{}", entry.format_human_readable());
            }
        }
    }

    Ok(())
}

/// Resolve a snapshot name or the `latest` keyword
fn resolve_snapshot(paths: &AppPaths, name: &str) -> SnapvaultResult<Snapshot> {
    let catalog = SnapshotCatalog::new(paths.backup_dir());

    let found = if name.eq_ignore_ascii_case("latest") {
        catalog.latest()?
    } else {
        catalog.get(name)?
    };

    found.ok_or_else(|| SnapvaultError::snapshot_not_found(name))
}

fn print_restore_outcome(outcome: RestoreOutcome) {
    match outcome {
        RestoreOutcome::Restored(report) => print_restore_report(&report),
        RestoreOutcome::Cancelled {
            snapshot: Some(snapshot),
        } => {
            println!("{}", format_snapshot_details(&snapshot));
            println!();
            println!("WARNING: This will overwrite ALL current data!");
            println!("No safety snapshot is taken; run 'snapvault backup' first to keep one.");
            println!("To proceed, run again with --yes flag.");
        }
        RestoreOutcome::Cancelled { snapshot: None } => {
            println!("Restore cancelled.");
        }
        RestoreOutcome::NothingToRestore => {
            println!("No snapshots found.");
            println!("Create one with: snapvault backup");
        }
    }
}

fn print_restore_report(report: &RestoreReport) {
    println!("Restore complete!");
    println!("Restored from: {}", report.snapshot.name);
    println!("Target: {}", report.restore_root.display());
    println!(
        "Wrote {} entries ({})",
        report.entries,
        format_size(report.total_bytes)
    );
    print_warnings(&report.warnings);
}

fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }
}
