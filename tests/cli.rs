use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn pocket(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pocket").unwrap();
    cmd.arg("--data-dir")
        .arg(data_dir.path())
        .env_remove("RUST_LOG")
        .env_remove("POCKET_LEDGER_DATA_DIR");
    cmd
}

#[test]
fn test_init_creates_backing_files() {
    let dir = TempDir::new().unwrap();

    pocket(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialization complete!"));

    assert!(dir.path().join("data.csv").exists());
    assert!(dir.path().join("todo_data.csv").exists());
    assert!(dir.path().join("budget.json").exists());
    assert!(dir.path().join("config.json").exists());
    assert!(!dir.path().join("data.csv.lock").exists());

    let header = std::fs::read_to_string(dir.path().join("data.csv")).unwrap();
    assert_eq!(header.trim_end(), "id,date,event,amount,type,remark,category");
}

#[test]
fn test_ledger_add_list_delete() {
    let dir = TempDir::new().unwrap();

    pocket(&dir)
        .args(["ledger", "add", "Groceries", "42.5", "--date", "2024-05-03", "-c", "Food"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded expense #1"));
    pocket(&dir)
        .args(["ledger", "add", "Salary", "3000", "--type", "income", "--date", "2024-05-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded income #2"));

    pocket(&dir)
        .args(["ledger", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Groceries").and(predicate::str::contains("Salary")));

    pocket(&dir)
        .args(["ledger", "delete", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted entry #1"));
    pocket(&dir)
        .args(["ledger", "delete", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing deleted"));

    let output = pocket(&dir)
        .args(["ledger", "list", "--json"])
        .output()
        .unwrap();
    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(entries.as_array().unwrap().len(), 1);
    assert_eq!(entries[0]["id"], 2);
    assert_eq!(entries[0]["type"], "income");
}

#[test]
fn test_ledger_rejects_bad_date() {
    let dir = TempDir::new().unwrap();

    pocket(&dir)
        .args(["ledger", "add", "Coffee", "3", "--date", "03/05/2024"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Validation error"));
}

#[test]
fn test_todo_lifecycle() {
    let dir = TempDir::new().unwrap();

    pocket(&dir)
        .args(["todo", "add", "Pay rent", "--priority", "high", "--due", "2024-06-05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added task: Pay rent"));

    let output = pocket(&dir).args(["todo", "list", "--json"]).output().unwrap();
    let tasks: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let key = tasks[0]["id"].as_str().unwrap().to_string();
    assert_eq!(tasks[0]["category"], "Personal");
    assert_eq!(tasks[0]["completed"], false);

    pocket(&dir)
        .args(["todo", "done", key.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Done: Pay rent"));

    let raw = std::fs::read_to_string(dir.path().join("todo_data.csv")).unwrap();
    assert!(raw.contains(",True,high,2024-06-05,Personal,"));

    pocket(&dir)
        .args(["todo", "list", "--open"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks found."));

    pocket(&dir)
        .args(["todo", "delete", key.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted task"));
}

#[test]
fn test_todo_replace_from_json_file() {
    let dir = TempDir::new().unwrap();

    pocket(&dir)
        .args(["todo", "add", "Old task"])
        .assert()
        .success();

    let file = dir.path().join("tasks.json");
    std::fs::write(
        &file,
        r#"[
            {"id": "t-1", "title": "Buy milk", "completed": true, "category": "Home"},
            {"id": "t-2", "title": "Call mom", "priority": "high", "dueDate": "2024-06-01"}
        ]"#,
    )
    .unwrap();

    pocket(&dir)
        .args(["todo", "replace"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Replaced task list with 2 tasks"));

    let raw = std::fs::read_to_string(dir.path().join("todo_data.csv")).unwrap();
    let lines: Vec<&str> = raw.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("1,t-1,Buy milk,,True,medium,,Home,"));
    assert!(lines[2].starts_with("2,t-2,Call mom,,False,high,2024-06-01,Personal,"));
    assert!(!raw.contains("Old task"));

    std::fs::write(&file, r#"[{"title": ""}]"#).unwrap();
    pocket(&dir)
        .args(["todo", "replace"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("title must not be empty"));
}

#[test]
fn test_todo_update_missing_task_fails() {
    let dir = TempDir::new().unwrap();

    pocket(&dir)
        .args(["todo", "update", "no-such-task", "--title", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task not found: no-such-task"));

    pocket(&dir)
        .args(["todo", "update", "no-such-task"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing update data"));
}

#[test]
fn test_budget_commands() {
    let dir = TempDir::new().unwrap();

    pocket(&dir)
        .args(["budget", "last"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No budgets set."));

    pocket(&dir)
        .args(["budget", "set", "1000", "--month", "2024-05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Budget for 2024-05 set to 1000.00"));
    pocket(&dir)
        .args(["budget", "set", "300", "--month", "2023-12"])
        .assert()
        .success();

    pocket(&dir)
        .args(["budget", "show", "--month", "2024-05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1000.00"));
    pocket(&dir)
        .args(["budget", "last"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-05"));

    pocket(&dir)
        .args(["budget", "set", "10", "--month", "2024-13"])
        .assert()
        .failure();
}

#[test]
fn test_report_csv() {
    let dir = TempDir::new().unwrap();

    pocket(&dir)
        .args(["ledger", "add", "Rent", "900", "--date", "2024-05-01", "-c", "Home"])
        .assert()
        .success();
    pocket(&dir)
        .args(["ledger", "add", "Lunch", "100", "--date", "2024-05-02", "-c", "Food"])
        .assert()
        .success();
    pocket(&dir)
        .args(["budget", "set", "800", "--month", "2024-05"])
        .assert()
        .success();

    pocket(&dir)
        .args(["report", "--month", "2024-05", "--csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-05,Home,900.00,1,90.00"));

    pocket(&dir)
        .args(["report", "--month", "2024-05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Over budget!"));
}

#[test]
fn test_config_shows_data_dir() {
    let dir = TempDir::new().unwrap();

    pocket(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Lock timeout:          5000 ms"));
}
