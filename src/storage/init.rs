//! Storage initialization
//!
//! Handles first-run setup: storage directory, settings file and empty
//! backing files.

use crate::config::{PocketPaths, Settings};
use crate::error::PocketError;

use super::Storage;

/// Initialize storage for a fresh installation
///
/// Existing files are left untouched.
pub fn initialize_storage(paths: &PocketPaths) -> Result<Settings, PocketError> {
    paths.ensure_directories()?;

    let settings = Settings::load_or_create(paths)?;
    if !paths.settings_file().exists() {
        settings.save(paths)?;
    }

    Storage::new(paths.clone(), &settings)?.ensure_initialized()?;
    Ok(settings)
}

/// Check if storage needs initialization
pub fn needs_initialization(paths: &PocketPaths) -> bool {
    !paths.settings_file().exists()
        || !paths.ledger_file().exists()
        || !paths.tasks_file().exists()
        || !paths.budget_file().exists()
}
