//! Path management for snapvault
//!
//! Resolves the application root and the well-known paths beneath it: the
//! primary data file, the snapshot store and the logs directory.
//!
//! ## Path Resolution Order
//!
//! 1. `SNAPVAULT_ROOT` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_DATA_HOME/snapvault` or `~/.local/share/snapvault`
//! 3. Windows: `%APPDATA%\snapvault`

use std::path::{Path, PathBuf};

use crate::error::SnapvaultError;

/// Environment variable that overrides the application root
pub const ROOT_ENV_VAR: &str = "SNAPVAULT_ROOT";

/// Primary data file, relative to the application root
pub const DATA_FILE: &str = "data.json";

/// Snapshot store directory, relative to the application root
pub const BACKUP_DIR: &str = "backups";

/// Logs directory, relative to the application root
pub const LOGS_DIR: &str = "logs";

/// Manages all paths used by snapvault
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Application root; every live store member is relative to it
    base_dir: PathBuf,
}

impl AppPaths {
    /// Create a new AppPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, SnapvaultError> {
        let base_dir = match std::env::var(ROOT_ENV_VAR) {
            Ok(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create AppPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the application root
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the primary data file (`<root>/data.json`)
    pub fn data_file(&self) -> PathBuf {
        self.base_dir.join(DATA_FILE)
    }

    /// Get the snapshot store (`<root>/backups/`)
    pub fn backup_dir(&self) -> PathBuf {
        self.base_dir.join(BACKUP_DIR)
    }

    /// Get the logs directory (`<root>/logs/`)
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join(LOGS_DIR)
    }

    /// Get the operation journal (`<root>/logs/operations.jsonl`)
    pub fn journal_file(&self) -> PathBuf {
        self.logs_dir().join("operations.jsonl")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("snapvault.json")
    }

    /// Resolve a path relative to the application root
    ///
    /// Absolute paths are returned unchanged.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        let relative = relative.as_ref();
        if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            self.base_dir.join(relative)
        }
    }

    /// Ensure all required directories exist
    ///
    /// Creates the root, the snapshot store and the logs directory.
    pub fn ensure_directories(&self) -> Result<(), SnapvaultError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| SnapvaultError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.backup_dir())
            .map_err(|e| SnapvaultError::Io(format!("Failed to create backup directory: {}", e)))?;

        std::fs::create_dir_all(self.logs_dir())
            .map_err(|e| SnapvaultError::Io(format!("Failed to create logs directory: {}", e)))?;

        Ok(())
    }

    /// Check if snapvault has been initialized (settings file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

/// Resolve the default application root based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, SnapvaultError> {
    let data_base = match std::env::var("XDG_DATA_HOME") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let home = std::env::var("HOME").map_err(|_| {
                SnapvaultError::Config("Could not determine HOME directory".into())
            })?;
            PathBuf::from(home).join(".local").join("share")
        }
    };
    Ok(data_base.join("snapvault"))
}

/// Resolve the default application root based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, SnapvaultError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| SnapvaultError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("snapvault"))
}
