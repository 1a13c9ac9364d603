//! Monthly budget document
//!
//! `budget.json` maps a year (as a decimal string) to the list of monthly
//! limits set for that year:
//!
//! ```json
//! { "budget": { "2024": [ { "month": 5, "monthlyLimit": 1000.0 } ] } }
//! ```
//!
//! Each load/modify/persist cycle runs under the same kind of
//! [`FileLock`] that guards the record tables.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{PocketError, PocketResult};
use crate::models::MonthlyBudget;

use super::file_io::{read_json, write_json_atomic};
use super::lock::{FileLock, DEFAULT_TIMEOUT};

/// One month's entry inside a year list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyLimit {
    pub month: u32,
    #[serde(rename = "monthlyLimit", default)]
    pub monthly_limit: f64,
}

/// On-disk shape of `budget.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetDocument {
    #[serde(default)]
    pub budget: BTreeMap<String, Vec<MonthlyLimit>>,
}

impl BudgetDocument {
    /// Insert the month's limit, or overwrite it if already present
    fn upsert(&mut self, year: i32, month: u32, amount: f64) {
        let year_list = self.budget.entry(year.to_string()).or_default();
        match year_list.iter_mut().find(|item| item.month == month) {
            Some(item) => item.monthly_limit = amount,
            None => year_list.push(MonthlyLimit {
                month,
                monthly_limit: amount,
            }),
        }
    }

    fn lookup(&self, year: i32, month: u32) -> Option<f64> {
        self.budget
            .get(&year.to_string())?
            .iter()
            .find(|item| item.month == month)
            .map(|item| item.monthly_limit)
    }

    /// Year lists keyed by their numeric year; unparseable keys are skipped
    fn numeric_years(&self) -> impl Iterator<Item = (i32, &Vec<MonthlyLimit>)> {
        self.budget.iter().filter_map(|(key, list)| match key.trim().parse::<i32>() {
            Ok(year) => Some((year, list)),
            Err(_) => {
                warn!(key = %key, "ignoring non-numeric budget year");
                None
            }
        })
    }
}

/// Store for the budget document
pub struct BudgetStore {
    path: PathBuf,
    lock: FileLock,
}

impl BudgetStore {
    /// Create a store for `path` with the default lock timeout
    pub fn new(path: PathBuf) -> Self {
        let lock = FileLock::for_data_file(&path, DEFAULT_TIMEOUT);
        Self::with_lock(path, lock)
    }

    /// Create a store guarded by a caller-built lock
    pub fn with_lock(path: PathBuf, lock: FileLock) -> Self {
        Self { path, lock }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the document with an empty mapping if absent
    pub fn ensure_initialized(&self) -> PocketResult<()> {
        let _guard = self.lock.acquire()?;
        self.init_unlocked()
    }

    /// Set the limit for (year, month), replacing any existing value
    pub fn write_budget(&self, year: i32, month: u32, amount: f64) -> PocketResult<()> {
        validate(year, month, amount)?;

        let _guard = self.lock.acquire()?;
        self.init_unlocked()?;

        let mut doc: BudgetDocument = read_json(&self.path)?;
        doc.upsert(year, month, amount);
        write_json_atomic(&self.path, &doc)?;

        debug!(year, month, amount, "budget written");
        Ok(())
    }

    /// Limit for exactly (year, month), if set
    pub fn read_budget(&self, year: i32, month: u32) -> PocketResult<Option<f64>> {
        Ok(self.load()?.lookup(year, month))
    }

    /// Entry with the greatest year, then the greatest month within it
    ///
    /// This is the numerically greatest key, not the most recently written
    /// entry. Returns `None` when the document is empty or the greatest
    /// year has no months.
    pub fn read_last_budget(&self) -> PocketResult<Option<MonthlyBudget>> {
        let doc = self.load()?;

        let Some((year, list)) = doc.numeric_years().max_by_key(|(year, _)| *year) else {
            return Ok(None);
        };

        Ok(list.iter().max_by_key(|item| item.month).map(|item| MonthlyBudget {
            year,
            month: item.month,
            monthly_limit: item.monthly_limit,
        }))
    }

    /// Every entry, ordered by (year, month)
    pub fn list_budgets(&self) -> PocketResult<Vec<MonthlyBudget>> {
        let doc = self.load()?;

        let mut entries: Vec<MonthlyBudget> = doc
            .numeric_years()
            .flat_map(|(year, list)| {
                list.iter().map(move |item| MonthlyBudget {
                    year,
                    month: item.month,
                    monthly_limit: item.monthly_limit,
                })
            })
            .collect();
        entries.sort_by_key(|entry| (entry.year, entry.month));
        Ok(entries)
    }

    fn load(&self) -> PocketResult<BudgetDocument> {
        let _guard = self.lock.acquire()?;
        self.init_unlocked()?;
        read_json(&self.path)
    }

    /// Lock must be held.
    fn init_unlocked(&self) -> PocketResult<()> {
        let missing = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };
        if missing {
            write_json_atomic(&self.path, &BudgetDocument::default())?;
            info!(path = %self.path.display(), "created budget file");
        }
        Ok(())
    }
}

fn validate(year: i32, month: u32, amount: f64) -> PocketResult<()> {
    if !(1000..=9999).contains(&year) {
        return Err(PocketError::Validation(format!(
            "year must have four digits, got {}",
            year
        )));
    }
    if !(1..=12).contains(&month) {
        return Err(PocketError::Validation(format!(
            "month must be between 1 and 12, got {}",
            month
        )));
    }
    if !amount.is_finite() || amount < 0.0 {
        return Err(PocketError::Validation(format!(
            "monthly limit must be a non-negative number, got {}",
            amount
        )));
    }
    Ok(())
}
