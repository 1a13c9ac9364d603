//! Core data models for pocket-ledger
//!
//! Typed views of the rows stored in the ledger and task tables, and of the
//! entries in the budget document.

pub mod budget;
pub mod entry;
pub mod period;
pub mod task;

pub use budget::{BudgetStatus, MonthlyBudget};
pub use entry::{EntryType, LedgerEntry, NewEntry};
pub use period::{Month, PeriodParseError};
pub use task::{NewTask, Priority, Task, TaskPatch};
