//! Ledger entry model
//!
//! One financial transaction, stored as a row of the ledger table.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PocketError, PocketResult};
use crate::storage::Row;

/// Direction of money for an entry
///
/// Types other than `income` and `expense` are kept as written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum EntryType {
    Income,
    #[default]
    Expense,
    Other(String),
}

impl EntryType {
    /// Whether the entry counts as neither income nor expense
    pub fn is_other(&self) -> bool {
        matches!(self, Self::Other(_))
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => write!(f, "income"),
            Self::Expense => write!(f, "expense"),
            Self::Other(other) => write!(f, "{}", other),
        }
    }
}

impl FromStr for EntryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" => Err("entry type is empty".to_string()),
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Ok(Self::Other(trimmed.to_string())),
        }
    }
}

impl TryFrom<String> for EntryType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntryType> for String {
    fn from(value: EntryType) -> Self {
        value.to_string()
    }
}

/// A stored ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: u64,
    pub date: String,
    pub event: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub remark: String,
    pub category: String,
}

impl LedgerEntry {
    /// Parse a ledger row; `line` is used in error messages
    pub fn from_row(line: usize, row: &[String]) -> PocketResult<Self> {
        let [id, date, event, amount, entry_type, remark, category] = row else {
            return Err(PocketError::malformed(
                line,
                format!("ledger row has {} cells, expected 7", row.len()),
            ));
        };

        let id: u64 = id
            .trim()
            .parse()
            .map_err(|_| PocketError::malformed(line, format!("id '{}' is not a number", id)))?;

        // An empty amount cell reads as zero
        let amount: f64 = if amount.trim().is_empty() {
            0.0
        } else {
            amount.trim().parse().map_err(|_| {
                PocketError::malformed(line, format!("amount '{}' is not a number", amount))
            })?
        };

        let entry_type = entry_type
            .parse()
            .map_err(|e: String| PocketError::malformed(line, e))?;

        Ok(Self {
            id,
            date: date.clone(),
            event: event.clone(),
            amount,
            entry_type,
            remark: remark.clone(),
            category: category.clone(),
        })
    }

    /// Date of the entry, if it is a valid `YYYY-MM-DD`
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

/// Caller input for a new ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEntry {
    pub date: String,
    pub event: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    #[serde(default)]
    pub remark: String,
    #[serde(default)]
    pub category: String,
}

impl NewEntry {
    /// Reject input that cannot be stored
    pub fn validate(&self) -> PocketResult<()> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").map_err(|_| {
            PocketError::Validation(format!("date '{}' is not YYYY-MM-DD", self.date))
        })?;
        if self.event.trim().is_empty() {
            return Err(PocketError::Validation("event must not be empty".into()));
        }
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(PocketError::Validation(format!(
                "amount must be a non-negative number, got {}",
                self.amount
            )));
        }
        Ok(())
    }

    /// Row for this entry under `id`
    pub fn to_row(&self, id: u64) -> Row {
        vec![
            id.to_string(),
            self.date.clone(),
            self.event.clone(),
            self.amount.to_string(),
            self.entry_type.to_string(),
            self.remark.clone(),
            self.category.clone(),
        ]
    }

    /// The stored entry once `id` has been assigned
    pub fn into_entry(self, id: u64) -> LedgerEntry {
        LedgerEntry {
            id,
            date: self.date,
            event: self.event,
            amount: self.amount,
            entry_type: self.entry_type,
            remark: self.remark,
            category: self.category,
        }
    }
}
