use super::*;
use std::path::PathBuf;
use tm_core::MigrationId;

fn status(id: &str, iteration: Option<i32>) -> MigrationStatus {
    MigrationStatus {
        id: MigrationId::new(id),
        path: PathBuf::from(format!("migrations/rollout/{id}.sql")),
        iteration,
    }
}

#[test]
fn test_format_table_marks_pending() {
    let table = format_table(&[status("one", Some(1)), status("two", None)]);

    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines[0], "MIGRATION  STATE    ITERATION");
    assert_eq!(lines[2], "one        applied  1");
    assert_eq!(lines[3], "two        pending  -");
    assert_eq!(lines[5], "1 applied, 1 pending");
}

#[test]
fn test_status_row_json() {
    let row = status("one", Some(3));
    let json = serde_json::to_value(StatusRow::from(&row)).unwrap();

    assert_eq!(json["id"], "one");
    assert_eq!(json["applied"], true);
    assert_eq!(json["iteration"], 3);
}

#[tokio::test]
async fn test_status_command_runs() {
    let project = crate::test_project::TestProject::new("");
    project.create_ledger().await;
    project.write_script("a.sql", "SELECT 1;");

    let args = StatusArgs {
        output: OutputFormat::Table,
        directory: None,
    };
    execute(&args, &project.global()).await.unwrap();
}
