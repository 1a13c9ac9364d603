//! Service layer for pocket-ledger
//!
//! The service layer sits between callers (the CLI, or any other front-end)
//! and the stores. It validates input, converts rows to models and maps
//! each caller operation onto exactly one store operation.

pub mod budget;
pub mod ledger;
pub mod task;

pub use budget::BudgetService;
pub use ledger::LedgerService;
pub use task::TaskService;
