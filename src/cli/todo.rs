//! To-do CLI commands

use std::path::PathBuf;

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_task_details, format_task_list};
use crate::error::{PocketError, PocketResult};
use crate::models::{NewTask, Priority, TaskPatch};
use crate::services::TaskService;
use crate::storage::Storage;

/// To-do subcommands
#[derive(Subcommand)]
pub enum TodoCommands {
    /// Add a task
    Add {
        /// Task title
        title: String,
        /// Longer description
        #[arg(short, long, default_value = "")]
        description: String,
        /// Priority: low, medium or high
        #[arg(short, long, default_value = "medium")]
        priority: Priority,
        /// Due date (YYYY-MM-DD)
        #[arg(long, default_value = "")]
        due: String,
        /// Category, defaults to the configured task category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// List tasks
    List {
        /// Hide completed tasks
        #[arg(long)]
        open: bool,
        /// Print JSON instead of a checklist
        #[arg(long)]
        json: bool,
    },
    /// Show one task
    Show {
        /// Task id
        id: String,
    },
    /// Change fields of a task
    Update {
        /// Task id
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        priority: Option<Priority>,
        /// Due date (YYYY-MM-DD), or "" to clear
        #[arg(long)]
        due: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Mark a task as done
    Done {
        /// Task id
        id: String,
    },
    /// Mark a task as not done
    Undo {
        /// Task id
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task id
        id: String,
    },
    /// Replace every task with the tasks in a JSON file
    Replace {
        /// JSON array of tasks (`title` required; `id`, `createdAt` generated when absent)
        file: PathBuf,
    },
}

/// Handle a to-do command
pub fn handle_todo_command(
    storage: &Storage,
    settings: &Settings,
    cmd: TodoCommands,
) -> PocketResult<()> {
    let service =
        TaskService::new(storage).with_default_category(settings.default_task_category.clone());

    match cmd {
        TodoCommands::Add {
            title,
            description,
            priority,
            due,
            category,
        } => {
            let task = service.add(NewTask {
                description,
                priority,
                due_date: due,
                category,
                ..NewTask::titled(title)
            })?;
            println!("Added task: {}", task.title);
            println!("  ID: {}", task.key);
        }

        TodoCommands::List { open, json } => {
            let mut tasks = service.list()?;
            if open {
                tasks.retain(|task| !task.completed);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else {
                print!("{}", format_task_list(&tasks));
            }
        }

        TodoCommands::Show { id } => {
            let task = service
                .get(&id)?
                .ok_or_else(|| PocketError::task_not_found(&id))?;
            print!("{}", format_task_details(&task));
        }

        TodoCommands::Update {
            id,
            title,
            description,
            priority,
            due,
            category,
        } => {
            let patch = TaskPatch {
                title,
                description,
                completed: None,
                priority,
                due_date: due,
                category,
            };
            let task = service.update(&id, &patch)?;
            println!("Updated task: {}", task.title);
        }

        TodoCommands::Done { id } => {
            let task = service.set_completed(&id, true)?;
            println!("Done: {}", task.title);
        }

        TodoCommands::Undo { id } => {
            let task = service.set_completed(&id, false)?;
            println!("Reopened: {}", task.title);
        }

        TodoCommands::Delete { id } => {
            if service.delete(&id)? {
                println!("Deleted task {}", id);
            } else {
                println!("No task {}; nothing deleted.", id);
            }
        }

        TodoCommands::Replace { file } => {
            let contents = std::fs::read_to_string(&file).map_err(|e| {
                PocketError::Io(format!("Failed to read {}: {}", file.display(), e))
            })?;
            let inputs: Vec<NewTask> = serde_json::from_str(&contents)?;
            let tasks = service.replace_all(inputs)?;
            println!("Replaced task list with {} tasks", tasks.len());
        }
    }

    Ok(())
}
