//! Monthly budget model

use serde::{Deserialize, Serialize};

/// The spending limit set for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBudget {
    pub year: i32,
    pub month: u32,
    pub monthly_limit: f64,
}

/// Budget for a month as reported to callers
///
/// `enabled` is false when no limit has been set for the month, in which
/// case `monthly_limit` is 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    pub year: i32,
    pub month: u32,
    pub monthly_limit: f64,
    pub enabled: bool,
}

impl BudgetStatus {
    /// Status from an optional stored limit
    pub fn from_limit(year: i32, month: u32, limit: Option<f64>) -> Self {
        Self {
            year,
            month,
            monthly_limit: limit.unwrap_or(0.0),
            enabled: limit.is_some(),
        }
    }
}
