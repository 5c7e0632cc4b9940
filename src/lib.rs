//! snapvault - point-in-time snapshots for a JSON record store
//!
//! This library keeps timestamped `.tar.gz` snapshots of an application
//! root (the primary data file, the snapshot store itself and the logs
//! directory), prunes them to a retention limit, and restores the store from
//! a chosen snapshot.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Application root resolution and persisted settings
//! - `error`: Custom error types
//! - `snapshot`: Archive codec, catalog, retention, backup and restore
//! - `journal`: Append-only record of backup, prune and restore operations
//! - `storage`: First-run layout of the live store
//! - `display`: Terminal formatting
//! - `cli`: Command handlers for the `snapvault` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use snapvault::config::{AppPaths, Settings};
//! use snapvault::cli::run_backup_once;
//!
//! let paths = AppPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let report = run_backup_once(&paths, &settings)?;
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod journal;
pub mod snapshot;
pub mod storage;

pub use error::{SnapvaultError, SnapvaultResult};
