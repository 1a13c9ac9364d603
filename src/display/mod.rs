//! Display formatting for terminal output
//!
//! Provides utilities for formatting ledger entries, tasks and reports for
//! the CLI.

pub mod entry;
pub mod report;
pub mod task;

pub use entry::{format_entry_list, format_entry_row};
pub use report::{format_percentage, format_usage_bar, separator};
pub use task::{format_task_details, format_task_list};

/// Truncate a string to a maximum number of characters with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        "...".chars().take(max_len).collect()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

/// Format an amount with two decimals
pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello World", 5), "He...");
        assert_eq!(truncate("Hi", 5), "Hi");
        assert_eq!(truncate("Test", 4), "Test");
        assert_eq!(truncate("café au lait", 6), "caf...");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(3.0), "3.00");
        assert_eq!(format_amount(18.456), "18.46");
    }
}
