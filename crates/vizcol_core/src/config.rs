//! Store location configuration.
//!
//! # Responsibility
//! - Resolve where the single collection store file lives.
//!
//! # Invariants
//! - Resolution order: explicit path, then `VIZCOL_DB_PATH`, then the
//!   well-known file name in the working directory.
//! - Blank values are ignored at every step.

use std::path::PathBuf;

/// Environment variable overriding the store location.
pub const DB_PATH_ENV: &str = "VIZCOL_DB_PATH";
/// Well-known store file name.
pub const DEFAULT_DB_FILE_NAME: &str = "visual_collection.db";

/// Location settings for the collection store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
}

impl StoreConfig {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Resolves the store path from an optional explicit value and the
    /// process environment.
    pub fn resolve(explicit: Option<PathBuf>) -> Self {
        Self::resolve_with(explicit, std::env::var(DB_PATH_ENV).ok())
    }

    fn resolve_with(explicit: Option<PathBuf>, env_value: Option<String>) -> Self {
        if let Some(path) = explicit.filter(|path| !path.as_os_str().is_empty()) {
            return Self::new(path);
        }
        if let Some(raw) = env_value {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Self::new(trimmed);
            }
        }
        Self::new(DEFAULT_DB_FILE_NAME)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DB_FILE_NAME)
    }
}
