//! Task display formatting

use super::truncate;
use crate::models::Task;

/// Format tasks as a checklist
pub fn format_task_list(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:3} {:36} {:30} {:8} {:10} {}\n",
        "", "ID", "Title", "Priority", "Due", "Category"
    ));
    output.push_str(&"-".repeat(100));
    output.push('\n');

    for task in tasks {
        let check = if task.completed { "[x]" } else { "[ ]" };
        output.push_str(&format!(
            "{:3} {:36} {:30} {:8} {:10} {}\n",
            check,
            truncate(&task.key, 36),
            truncate(&task.title, 30),
            task.priority,
            task.due_date,
            task.category
        ));
    }

    let done = tasks.iter().filter(|t| t.completed).count();
    output.push_str(&format!("\n{} of {} done\n", done, tasks.len()));
    output
}

/// Format a single task with all fields
pub fn format_task_details(task: &Task) -> String {
    let mut output = String::new();
    output.push_str(&format!("Task:      {}\n", task.title));
    output.push_str(&format!("ID:        {}\n", task.key));
    output.push_str(&format!(
        "Status:    {}\n",
        if task.completed { "done" } else { "open" }
    ));
    output.push_str(&format!("Priority:  {}\n", task.priority));
    if !task.due_date.is_empty() {
        output.push_str(&format!("Due:       {}\n", task.due_date));
    }
    output.push_str(&format!("Category:  {}\n", task.category));
    if !task.description.is_empty() {
        output.push_str(&format!("\n{}\n", task.description));
    }
    output
}
