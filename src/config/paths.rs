//! Path management for pocket-ledger
//!
//! Resolves the storage directory that holds the backing files.
//!
//! ## Path Resolution Order
//!
//! 1. An explicit directory passed by the caller (`--data-dir`)
//! 2. `POCKET_LEDGER_DATA_DIR` environment variable (if set)
//! 3. The platform data directory (`~/.local/share/pocket-ledger` on Linux)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::PocketError;

/// Environment variable overriding the storage directory
pub const DATA_DIR_ENV: &str = "POCKET_LEDGER_DATA_DIR";

/// Manages all paths used by pocket-ledger
#[derive(Debug, Clone)]
pub struct PocketPaths {
    /// Base directory for all backing files
    base_dir: PathBuf,
}

impl PocketPaths {
    /// Resolve paths from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, PocketError> {
        let base_dir = if let Ok(custom) = std::env::var(DATA_DIR_ENV) {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create PocketPaths with a custom base directory
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Use `explicit` when given, otherwise fall back to [`PocketPaths::new`]
    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self, PocketError> {
        match explicit {
            Some(dir) => Ok(Self::with_base_dir(dir)),
            None => Self::new(),
        }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the ledger table
    pub fn ledger_file(&self) -> PathBuf {
        self.base_dir.join("data.csv")
    }

    /// Get the path to the task table
    pub fn tasks_file(&self) -> PathBuf {
        self.base_dir.join("todo_data.csv")
    }

    /// Get the path to the budget document
    pub fn budget_file(&self) -> PathBuf {
        self.base_dir.join("budget.json")
    }

    /// Ensure the storage directory exists
    pub fn ensure_directories(&self) -> Result<(), PocketError> {
        std::fs::create_dir_all(&self.base_dir).map_err(|e| {
            PocketError::Io(format!(
                "Failed to create storage directory {}: {}",
                self.base_dir.display(),
                e
            ))
        })
    }
}

fn resolve_default_path() -> Result<PathBuf, PocketError> {
    ProjectDirs::from("", "", "pocket-ledger")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| PocketError::Config("Could not determine a home directory".into()))
}
