//! User settings for snapvault
//!
//! Holds the retention policy, the members of the live store that a backup
//! covers, and where restores are extracted to.

use std::io::Write;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::{AppPaths, BACKUP_DIR, DATA_FILE, LOGS_DIR};
use crate::error::SnapvaultError;

/// Number of snapshots kept when nothing else is configured
pub const DEFAULT_KEEP: usize = 10;

/// Backup retention settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionSettings {
    /// Maximum number of snapshots to keep after a backup cycle
    pub keep: usize,
}

impl Default for RetentionSettings {
    fn default() -> Self {
        Self { keep: DEFAULT_KEEP }
    }
}

/// One path that belongs to the live store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveStoreMember {
    /// Path relative to the application root
    pub path: PathBuf,
    /// Whether backups include this member
    #[serde(default = "default_include")]
    pub include: bool,
}

impl LiveStoreMember {
    fn included(path: &str) -> Self {
        Self {
            path: PathBuf::from(path),
            include: true,
        }
    }
}

fn default_include() -> bool {
    true
}

/// Default live store: data file, snapshot store and logs.
///
/// The snapshot store is listed, so each archive also contains every older
/// archive.
fn default_live_store() -> Vec<LiveStoreMember> {
    vec![
        LiveStoreMember::included(DATA_FILE),
        LiveStoreMember::included(BACKUP_DIR),
        LiveStoreMember::included(LOGS_DIR),
    ]
}

/// User settings for snapvault
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Backup retention policy
    #[serde(default)]
    pub retention: RetentionSettings,

    /// Paths that make up the live store, in archive order
    #[serde(default = "default_live_store")]
    pub live_store: Vec<LiveStoreMember>,

    /// Directory archives are extracted into (defaults to the application root)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restore_root: Option<PathBuf>,
}

fn default_schema_version() -> u32 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            retention: RetentionSettings::default(),
            live_store: default_live_store(),
            restore_root: None,
        }
    }
}

impl Settings {
    /// Relative paths of the live store members that backups include
    pub fn backup_members(&self) -> Vec<PathBuf> {
        self.live_store
            .iter()
            .filter(|m| m.include)
            .map(|m| m.path.clone())
            .collect()
    }

    /// Directory that restores extract into
    pub fn restore_root(&self, paths: &AppPaths) -> PathBuf {
        match &self.restore_root {
            Some(root) => paths.resolve(root),
            None => paths.base_dir().to_path_buf(),
        }
    }

    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &AppPaths) -> Result<Self, SnapvaultError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Don't save yet - let caller decide when to persist
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| SnapvaultError::Io(format!("Failed to read settings file: {}", e)))?;

        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| SnapvaultError::Config(format!("Failed to parse settings file: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Check that the settings describe a usable live store
    pub fn validate(&self) -> Result<(), SnapvaultError> {
        if self.backup_members().is_empty() {
            return Err(SnapvaultError::Config(
                "live_store has no included members; nothing would be backed up".into(),
            ));
        }
        Ok(())
    }

    /// Save settings to disk (write to temp, then rename)
    pub fn save(&self, paths: &AppPaths) -> Result<(), SnapvaultError> {
        std::fs::create_dir_all(paths.base_dir())
            .map_err(|e| SnapvaultError::Io(format!("Failed to create base directory: {}", e)))?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| SnapvaultError::Config(format!("Failed to serialize settings: {}", e)))?;

        let mut temp = tempfile::NamedTempFile::new_in(paths.base_dir())
            .map_err(|e| SnapvaultError::Io(format!("Failed to create temp file: {}", e)))?;
        temp.write_all(contents.as_bytes())
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| SnapvaultError::Io(format!("Failed to write settings file: {}", e)))?;
        temp.persist(paths.settings_file())
            .map_err(|e| SnapvaultError::Io(format!("Failed to write settings file: {}", e.error)))?;

        Ok(())
    }
}
