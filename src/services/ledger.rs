//! Ledger service
//!
//! Records, lists and deletes financial entries.

use tracing::info;

use crate::error::PocketResult;
use crate::models::{LedgerEntry, Month, NewEntry};
use crate::storage::Storage;

/// Service for ledger entries
pub struct LedgerService<'a> {
    storage: &'a Storage,
}

impl<'a> LedgerService<'a> {
    /// Create a new ledger service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Store a new entry under the next free id
    pub fn record(&self, input: NewEntry) -> PocketResult<LedgerEntry> {
        input.validate()?;

        let id = self
            .storage
            .ledger
            .append_with_next_id(|id| input.to_row(id))?;

        info!(id, event = %input.event, "ledger entry recorded");
        Ok(input.into_entry(id))
    }

    /// All entries in file order
    pub fn list(&self) -> PocketResult<Vec<LedgerEntry>> {
        let table = self.storage.ledger.read_all()?;

        // Data rows start on line 2, after the header
        table
            .rows
            .iter()
            .enumerate()
            .map(|(index, row)| LedgerEntry::from_row(index + 2, row))
            .collect()
    }

    /// Entries dated within `month`; undated entries are left out
    pub fn list_month(&self, month: Month) -> PocketResult<Vec<LedgerEntry>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|entry| entry.parsed_date().is_some_and(|d| month.contains(d)))
            .collect())
    }

    /// Get an entry by id
    pub fn get(&self, id: u64) -> PocketResult<Option<LedgerEntry>> {
        Ok(self.list()?.into_iter().find(|entry| entry.id == id))
    }

    /// Delete the entry with `id`
    ///
    /// Deleting an id that does not exist is not an error; the return value
    /// says whether anything was removed.
    pub fn delete(&self, id: u64) -> PocketResult<bool> {
        let removed = self.storage.ledger.delete_by_key(&id.to_string())?;
        if removed > 0 {
            info!(id, "ledger entry deleted");
        }
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PocketPaths, Settings};
    use crate::models::EntryType;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = PocketPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths, &Settings::default()).unwrap();
        (temp_dir, storage)
    }

    fn entry(date: &str, event: &str, amount: f64, entry_type: EntryType) -> NewEntry {
        NewEntry {
            date: date.into(),
            event: event.into(),
            amount,
            entry_type,
            remark: String::new(),
            category: "Food".into(),
        }
    }

    #[test]
    fn test_record_and_list() {
        let (_temp_dir, storage) = create_test_storage();
        let service = LedgerService::new(&storage);

        let first = service
            .record(entry("2024-05-01", "Groceries", 42.0, EntryType::Expense))
            .unwrap();
        let second = service
            .record(entry("2024-05-02", "Salary", 3000.0, EntryType::Income))
            .unwrap();
        assert_eq!((first.id, second.id), (1, 2));

        let entries = service.list().unwrap();
        assert_eq!(entries, vec![first, second]);
    }

    #[test]
    fn test_record_rejects_invalid_input() {
        let (_temp_dir, storage) = create_test_storage();
        let service = LedgerService::new(&storage);

        let err = service
            .record(entry("yesterday", "Coffee", 3.0, EntryType::Expense))
            .unwrap_err();
        assert!(err.is_validation());
        assert!(service.list().unwrap().is_empty());
    }

    #[test]
    fn test_delete_is_silent_when_absent() {
        let (_temp_dir, storage) = create_test_storage();
        let service = LedgerService::new(&storage);

        for day in 1..=3 {
            service
                .record(entry(&format!("2024-05-0{}", day), "Bus", 2.5, EntryType::Expense))
                .unwrap();
        }

        assert!(service.delete(2).unwrap());
        assert!(!service.delete(2).unwrap());
        assert!(!service.delete(99).unwrap());

        let ids: Vec<u64> = service.list().unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let next = service
            .record(entry("2024-05-04", "Bus", 2.5, EntryType::Expense))
            .unwrap();
        assert_eq!(next.id, 4);
        assert!(service.get(4).unwrap().is_some());
        assert!(service.get(2).unwrap().is_none());
    }

    #[test]
    fn test_list_month() {
        let (_temp_dir, storage) = create_test_storage();
        let service = LedgerService::new(&storage);

        service
            .record(entry("2024-04-30", "Rent", 900.0, EntryType::Expense))
            .unwrap();
        service
            .record(entry("2024-05-01", "Lunch", 12.0, EntryType::Expense))
            .unwrap();

        let may = service.list_month(Month::new(2024, 5).unwrap()).unwrap();
        assert_eq!(may.len(), 1);
        assert_eq!(may[0].event, "Lunch");
    }

    #[test]
    fn test_list_passes_other_types_through() {
        let (_temp_dir, storage) = create_test_storage();
        let service = LedgerService::new(&storage);
        service
            .record(entry("2024-05-01", "Lunch", 12.0, EntryType::Expense))
            .unwrap();

        let mut contents = std::fs::read_to_string(storage.ledger.path()).unwrap();
        contents.push_str("2,2024-05-02,Gift,5,transfer,,Other\n");
        std::fs::write(storage.ledger.path(), contents).unwrap();

        let entries = service.list().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].entry_type, EntryType::Other("transfer".into()));

        let next = service
            .record(entry("2024-05-03", "Loan", 50.0, EntryType::Other("transfer".into())))
            .unwrap();
        assert_eq!(next.id, 3);
        assert_eq!(service.get(3).unwrap().unwrap().entry_type.to_string(), "transfer");
    }

    #[test]
    fn test_list_reports_malformed_rows() {
        let (_temp_dir, storage) = create_test_storage();
        let service = LedgerService::new(&storage);
        service
            .record(entry("2024-05-01", "Lunch", 12.0, EntryType::Expense))
            .unwrap();

        let mut contents = std::fs::read_to_string(storage.ledger.path()).unwrap();
        contents.push_str("2,2024-05-02,Dinner,lots,expense,,Food\n");
        std::fs::write(storage.ledger.path(), contents).unwrap();

        let err = service.list().unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("line 3"));
    }
}
