//! Configuration module for pocket-ledger
//!
//! - Storage directory resolution
//! - User settings persistence (lock timeout, lock strategy, defaults)

pub mod paths;
pub mod settings;

pub use paths::PocketPaths;
pub use settings::Settings;
