//! pocket-ledger - flat-file ledger, to-do list and monthly budgets
//!
//! This library keeps small structured records in plain files that several
//! processes may share: financial entries and to-do items in CSV tables, and
//! monthly spending limits in a JSON document. Every read and write of a
//! backing file happens under a lock that excludes both other threads of
//! the same process and other processes on the same filesystem.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Storage directory resolution and settings
//! - `error`: Custom error types
//! - `models`: Ledger entries, tasks, budgets and months
//! - `storage`: Cross-process lock, CSV table store and budget store
//! - `services`: Validation and model conversion on top of the stores
//! - `reports`: Monthly summary
//! - `display`: Terminal formatting
//! - `cli`: Command handlers for the `pocket` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use pocket_ledger::config::{PocketPaths, Settings};
//! use pocket_ledger::services::LedgerService;
//! use pocket_ledger::storage::Storage;
//!
//! let paths = PocketPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::new(paths, &settings)?;
//! let entries = LedgerService::new(&storage).list()?;
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{PocketError, PocketResult};
