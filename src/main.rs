use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use snapvault::cli::{handle_snapshot_command, SnapshotCommands};
use snapvault::config::{paths::AppPaths, settings::Settings};

#[derive(Parser)]
#[command(
    name = "snapvault",
    author = "Kaylee Beyene",
    version,
    about = "Point-in-time snapshots for a JSON record store",
    long_about = "snapvault keeps timestamped .tar.gz snapshots of an application \
                  root (its data file, its snapshot history and its logs), prunes \
                  them to a retention limit, and restores the store from any of them."
)]
struct Cli {
    /// Application root (defaults to the platform data directory)
    #[arg(long, global = true, env = "SNAPVAULT_ROOT")]
    root: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the application root layout
    Init,

    /// Show current configuration and paths
    Config,

    #[command(flatten)]
    Snapshot(SnapshotCommands),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let paths = match cli.root {
        Some(root) => AppPaths::with_base_dir(root),
        None => AppPaths::new()?,
    };
    let settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Some(Commands::Init) => {
            println!("Initializing snapvault at: {}", paths.base_dir().display());
            snapvault::storage::initialize_storage(&paths)?;
            if !paths.is_initialized() {
                settings.save(&paths)?;
            }
            println!("Initialization complete!");
            println!();
            println!("Data file:       {}", paths.data_file().display());
            println!("Snapshot store:  {}", paths.backup_dir().display());
            println!("Logs:            {}", paths.logs_dir().display());
            println!();
            println!("Run 'snapvault backup' to take the first snapshot.");
        }
        Some(Commands::Config) => {
            println!("snapvault Configuration");
            println!("=======================");
            println!("Application root: {}", paths.base_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!("Snapshot store:   {}", paths.backup_dir().display());
            println!("Restore target:   {}", settings.restore_root(&paths).display());
            println!();
            println!("Settings:");
            println!("  Snapshots kept: {}", settings.retention.keep);
            println!("  Live store:");
            for member in &settings.live_store {
                let marker = if member.include { "included" } else { "excluded" };
                println!("    {} ({})", member.path.display(), marker);
            }
        }
        Some(Commands::Snapshot(cmd)) => {
            handle_snapshot_command(&paths, &settings, cmd)?;
        }
        None => {
            println!("snapvault - point-in-time snapshots for a JSON record store");
            println!();
            println!("Run 'snapvault --help' for usage information.");
        }
    }

    Ok(())
}
