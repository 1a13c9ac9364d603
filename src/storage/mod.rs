//! Storage layer for pocket-ledger
//!
//! Two CSV record tables and one JSON budget document, each guarded by its
//! own cross-process [`FileLock`], with atomic rewrites.

pub mod budget;
pub mod file_io;
pub mod init;
pub mod lock;
pub mod schema;
pub mod table;

pub use budget::{BudgetDocument, BudgetStore};
pub use file_io::{read_json, write_json_atomic, Row};
pub use init::initialize_storage;
pub use lock::{FileLock, LockGuard, LockStrategy};
pub use schema::{TableSchema, LEDGER_SCHEMA, TASK_SCHEMA};
pub use table::{Table, TableStore};

use std::path::Path;

use crate::config::{PocketPaths, Settings};
use crate::error::PocketError;

/// One long-lived store per backing file
///
/// Built once by the caller and passed to the services that need it.
pub struct Storage {
    paths: PocketPaths,
    pub ledger: TableStore,
    pub tasks: TableStore,
    pub budget: BudgetStore,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: PocketPaths, settings: &Settings) -> Result<Self, PocketError> {
        paths.ensure_directories()?;

        let lock_for = |data_file: &Path| {
            FileLock::for_data_file(data_file, settings.lock_timeout())
                .with_strategy(settings.lock_strategy)
        };

        Ok(Self {
            ledger: TableStore::with_lock(
                paths.ledger_file(),
                &LEDGER_SCHEMA,
                lock_for(&paths.ledger_file()),
            ),
            tasks: TableStore::with_lock(
                paths.tasks_file(),
                &TASK_SCHEMA,
                lock_for(&paths.tasks_file()),
            ),
            budget: BudgetStore::with_lock(paths.budget_file(), lock_for(&paths.budget_file())),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &PocketPaths {
        &self.paths
    }

    /// Create every backing file that does not exist yet
    pub fn ensure_initialized(&self) -> Result<(), PocketError> {
        self.ledger.ensure_initialized()?;
        self.tasks.ensure_initialized()?;
        self.budget.ensure_initialized()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("storage");
        let paths = PocketPaths::with_base_dir(base.clone());
        let storage = Storage::new(paths, &Settings::default()).unwrap();

        assert!(base.is_dir());
        assert!(!storage.paths().ledger_file().exists());

        storage.ensure_initialized().unwrap();
        assert!(storage.paths().ledger_file().exists());
        assert!(storage.paths().tasks_file().exists());
        assert!(storage.paths().budget_file().exists());
    }

    #[test]
    fn test_settings_reach_locks() {
        let temp_dir = TempDir::new().unwrap();
        let paths = PocketPaths::with_base_dir(temp_dir.path().to_path_buf());
        let settings = Settings {
            lock_timeout_ms: 300,
            lock_strategy: LockStrategy::CreateExclusive,
            ..Settings::default()
        };
        let storage = Storage::new(paths, &settings).unwrap();

        assert_eq!(storage.ledger.lock().timeout(), Duration::from_millis(300));
        assert_eq!(storage.tasks.lock().strategy(), LockStrategy::CreateExclusive);
        assert_eq!(
            storage.ledger.lock().path(),
            temp_dir.path().join("data.csv.lock")
        );
    }
}
