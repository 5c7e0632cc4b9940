//! Configuration module for snapvault
//!
//! This module provides configuration management including:
//! - Application root and live store path resolution
//! - Persisted settings (retention, live store membership, restore root)

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{LiveStoreMember, RetentionSettings, Settings};
