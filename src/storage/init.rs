//! Storage initialization
//!
//! Handles first-run setup of the application root.

use std::fs;

use crate::config::paths::AppPaths;
use crate::error::SnapvaultError;

/// Initialize the application root for a fresh installation
///
/// Creates the snapshot store and logs directories and an empty record
/// collection (`[]`) if no data file exists yet. Existing data is never
/// touched.
pub fn initialize_storage(paths: &AppPaths) -> Result<(), SnapvaultError> {
    paths.ensure_directories()?;

    let data_file = paths.data_file();
    if !data_file.exists() {
        fs::write(&data_file, "[]\n")
            .map_err(|e| SnapvaultError::Io(format!("Failed to create data file: {}", e)))?;
        tracing::info!(data_file = %data_file.display(), "created empty record collection");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_creates_layout() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AppPaths::with_base_dir(temp_dir.path().join("app"));

        initialize_storage(&paths).unwrap();

        assert!(paths.backup_dir().is_dir());
        assert!(paths.logs_dir().is_dir());
        let records: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(paths.data_file()).unwrap()).unwrap();
        assert_eq!(records, serde_json::json!([]));
    }

    #[test]
    fn test_initialize_keeps_existing_data() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AppPaths::with_base_dir(temp_dir.path().to_path_buf());
        fs::write(paths.data_file(), r#"[{"id":7}]"#).unwrap();

        initialize_storage(&paths).unwrap();

        assert_eq!(fs::read_to_string(paths.data_file()).unwrap(), r#"[{"id":7}]"#);
    }
}
