//! Budget service
//!
//! Sets and reads monthly spending limits.

use chrono::NaiveDate;
use tracing::info;

use crate::error::PocketResult;
use crate::models::{BudgetStatus, MonthlyBudget, Month};
use crate::storage::Storage;

/// Service for monthly budgets
pub struct BudgetService<'a> {
    storage: &'a Storage,
}

impl<'a> BudgetService<'a> {
    /// Create a new budget service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Set the limit for `month`, replacing any earlier value
    pub fn set(&self, month: Month, monthly_limit: f64) -> PocketResult<MonthlyBudget> {
        self.storage
            .budget
            .write_budget(month.year, month.month, monthly_limit)?;

        info!(month = %month, monthly_limit, "budget set");
        Ok(MonthlyBudget {
            year: month.year,
            month: month.month,
            monthly_limit,
        })
    }

    /// Budget status for `month`
    pub fn get(&self, month: Month) -> PocketResult<BudgetStatus> {
        let limit = self.storage.budget.read_budget(month.year, month.month)?;
        Ok(BudgetStatus::from_limit(month.year, month.month, limit))
    }

    /// Budget status for the month containing `today`
    pub fn current(&self, today: NaiveDate) -> PocketResult<BudgetStatus> {
        self.get(Month::of(today))
    }

    /// Entry with the greatest (year, month) key
    pub fn last(&self) -> PocketResult<Option<MonthlyBudget>> {
        self.storage.budget.read_last_budget()
    }

    /// Every entry ordered by (year, month)
    pub fn list(&self) -> PocketResult<Vec<MonthlyBudget>> {
        self.storage.budget.list_budgets()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PocketPaths, Settings};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = PocketPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths, &Settings::default()).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_set_and_get() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BudgetService::new(&storage);
        let may = Month::new(2024, 5).unwrap();

        let unset = service.get(may).unwrap();
        assert!(!unset.enabled);
        assert_eq!(unset.monthly_limit, 0.0);

        service.set(may, 800.0).unwrap();
        let status = service.get(may).unwrap();
        assert!(status.enabled);
        assert_eq!(status.monthly_limit, 800.0);

        let today = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        assert_eq!(service.current(today).unwrap(), status);
    }

    #[test]
    fn test_last_and_list() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BudgetService::new(&storage);
        assert_eq!(service.last().unwrap(), None);

        service.set(Month::new(2024, 3).unwrap(), 300.0).unwrap();
        service.set(Month::new(2023, 12).unwrap(), 1200.0).unwrap();

        let last = service.last().unwrap().unwrap();
        assert_eq!((last.year, last.month), (2024, 3));
        assert_eq!(service.list().unwrap().len(), 2);
    }

    #[test]
    fn test_set_rejects_negative_limit() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BudgetService::new(&storage);
        let err = service.set(Month::new(2024, 1).unwrap(), -5.0).unwrap_err();
        assert!(err.is_validation());
    }
}
