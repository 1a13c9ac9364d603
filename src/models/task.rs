//! To-do task model
//!
//! Tasks are stored as rows of the task table. The sequential `id` column is
//! internal; callers address a task by its external key.

use chrono::{NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PocketError, PocketResult};
use crate::storage::Row;

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "" | "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown priority '{}'", other)),
        }
    }
}

/// `completed` cell encoding
fn encode_completed(completed: bool) -> &'static str {
    if completed {
        "True"
    } else {
        "False"
    }
}

/// A stored task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// External key, exposed to callers as `id`
    #[serde(rename = "id")]
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: String,
    pub category: String,
    #[serde(default)]
    pub created_at: String,
}

impl Task {
    /// Parse a task row; `line` is used in error messages
    pub fn from_row(line: usize, row: &[String]) -> PocketResult<Self> {
        let [_, key, title, description, completed, priority, due_date, category, created_at] =
            row
        else {
            return Err(PocketError::malformed(
                line,
                format!("task row has {} cells, expected 9", row.len()),
            ));
        };

        let priority = priority
            .parse()
            .map_err(|e: String| PocketError::malformed(line, e))?;

        Ok(Self {
            key: key.clone(),
            title: title.clone(),
            description: description.clone(),
            completed: completed.trim().eq_ignore_ascii_case("true"),
            priority,
            due_date: due_date.clone(),
            category: category.clone(),
            created_at: created_at.clone(),
        })
    }

    /// Row for this task with sequential id `seq`
    pub fn to_row(&self, seq: u64) -> Row {
        vec![
            seq.to_string(),
            self.key.clone(),
            self.title.clone(),
            self.description.clone(),
            encode_completed(self.completed).to_string(),
            self.priority.to_string(),
            self.due_date.clone(),
            self.category.clone(),
            self.created_at.clone(),
        ]
    }
}

/// Caller input for a new task; missing key and timestamp are generated
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    #[serde(rename = "id", default)]
    pub key: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl NewTask {
    /// Create input with just a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Reject input that cannot be stored
    pub fn validate(&self) -> PocketResult<()> {
        if self.title.trim().is_empty() {
            return Err(PocketError::Validation("title must not be empty".into()));
        }
        if matches!(&self.key, Some(key) if key.trim().is_empty()) {
            return Err(PocketError::Validation("task id must not be empty".into()));
        }
        validate_due_date(&self.due_date)
    }

    /// Fill in defaults and produce the task to store
    pub fn into_task(self, default_category: &str) -> Task {
        Task {
            key: self
                .key
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            title: self.title,
            description: self.description,
            completed: self.completed,
            priority: self.priority,
            due_date: self.due_date,
            category: self
                .category
                .unwrap_or_else(|| default_category.to_string()),
            created_at: self
                .created_at
                .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }
}

/// Partial update of a task; unset fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl TaskPatch {
    /// Whether no field is set
    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Reject updates that cannot be stored
    pub fn validate(&self) -> PocketResult<()> {
        if self.is_empty() {
            return Err(PocketError::Validation("missing update data".into()));
        }
        if matches!(&self.title, Some(title) if title.trim().is_empty()) {
            return Err(PocketError::Validation("title must not be empty".into()));
        }
        match &self.due_date {
            Some(due_date) => validate_due_date(due_date),
            None => Ok(()),
        }
    }

    /// Column name and encoded cell for every set field
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(title) = &self.title {
            fields.push(("title", title.clone()));
        }
        if let Some(description) = &self.description {
            fields.push(("description", description.clone()));
        }
        if let Some(completed) = self.completed {
            fields.push(("completed", encode_completed(completed).to_string()));
        }
        if let Some(priority) = self.priority {
            fields.push(("priority", priority.to_string()));
        }
        if let Some(due_date) = &self.due_date {
            fields.push(("dueDate", due_date.clone()));
        }
        if let Some(category) = &self.category {
            fields.push(("category", category.clone()));
        }
        fields
    }
}

/// Empty, or a `YYYY-MM-DD` date
fn validate_due_date(due_date: &str) -> PocketResult<()> {
    if due_date.is_empty() || NaiveDate::parse_from_str(due_date, "%Y-%m-%d").is_ok() {
        Ok(())
    } else {
        Err(PocketError::Validation(format!(
            "due date '{}' is not YYYY-MM-DD",
            due_date
        )))
    }
}
