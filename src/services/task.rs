//! Task service
//!
//! To-do items are addressed by their external key. Adding assigns the next
//! sequential row id; a bulk replace renumbers every row from 1.

use tracing::info;

use crate::error::{PocketError, PocketResult};
use crate::models::{NewTask, Task, TaskPatch};
use crate::storage::{Storage, Table};

/// Category given to tasks that do not name one
pub const DEFAULT_CATEGORY: &str = "Personal";

/// Service for to-do tasks
pub struct TaskService<'a> {
    storage: &'a Storage,
    default_category: String,
}

impl<'a> TaskService<'a> {
    /// Create a new task service
    pub fn new(storage: &'a Storage) -> Self {
        Self {
            storage,
            default_category: DEFAULT_CATEGORY.to_string(),
        }
    }

    /// Use `category` for new tasks that do not name one
    pub fn with_default_category(mut self, category: impl Into<String>) -> Self {
        self.default_category = category.into();
        self
    }

    /// All tasks in file order
    pub fn list(&self) -> PocketResult<Vec<Task>> {
        let table = self.storage.tasks.read_all()?;
        table
            .rows
            .iter()
            .enumerate()
            .map(|(index, row)| Task::from_row(index + 2, row))
            .collect()
    }

    /// Get a task by its key
    pub fn get(&self, key: &str) -> PocketResult<Option<Task>> {
        Ok(self.list()?.into_iter().find(|task| task.key == key))
    }

    /// Add one task
    ///
    /// A key and creation timestamp are generated when the input has none.
    pub fn add(&self, input: NewTask) -> PocketResult<Task> {
        input.validate()?;
        let task = input.into_task(&self.default_category);

        let seq = self
            .storage
            .tasks
            .append_with_next_id(|seq| task.to_row(seq))?;

        info!(seq, key = %task.key, "task added");
        Ok(task)
    }

    /// Replace every stored task with `inputs`, numbering rows from 1
    pub fn replace_all(&self, inputs: Vec<NewTask>) -> PocketResult<Vec<Task>> {
        for input in &inputs {
            input.validate()?;
        }

        let tasks: Vec<Task> = inputs
            .into_iter()
            .map(|input| input.into_task(&self.default_category))
            .collect();

        let schema = self.storage.tasks.schema();
        let rows = tasks
            .iter()
            .zip(1u64..)
            .map(|(task, seq)| task.to_row(seq))
            .collect();
        self.storage
            .tasks
            .overwrite_all(&Table::new(schema.header_row(), rows))?;

        info!(count = tasks.len(), "task list replaced");
        Ok(tasks)
    }

    /// Apply `patch` to the task with `key`
    ///
    /// # Errors
    ///
    /// [`PocketError::NotFound`] when no task has that key.
    pub fn update(&self, key: &str, patch: &TaskPatch) -> PocketResult<Task> {
        patch.validate()?;

        let row = self.storage.tasks.patch_fields(key, &patch.fields())?;
        info!(key, "task updated");
        Task::from_row(0, &row)
    }

    /// Mark the task with `key` as completed or not
    pub fn set_completed(&self, key: &str, completed: bool) -> PocketResult<Task> {
        let patch = TaskPatch {
            completed: Some(completed),
            ..TaskPatch::default()
        };
        self.update(key, &patch)
    }

    /// Delete the task with `key`; returns whether anything was removed
    pub fn delete(&self, key: &str) -> PocketResult<bool> {
        if key.trim().is_empty() {
            return Err(PocketError::Validation("task id must not be empty".into()));
        }

        let removed = self.storage.tasks.delete_by_key(key)?;
        if removed > 0 {
            info!(key, "task deleted");
        }
        Ok(removed > 0)
    }
}
