use super::*;
use crate::test_project::TestProject;
use tm_db::LedgerStore;

#[test]
fn test_format_table() {
    let table = format_table(&[
        AppliedMigration::new("001_create_users", 1),
        AppliedMigration::new("002_add_index", 2),
    ]);

    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines[0], "MIGRATION_ID      ITERATION");
    assert_eq!(lines[2], "001_create_users  1");
    assert_eq!(lines[3], "002_add_index     2");
    assert_eq!(lines[5], "2 migrations applied");
}

#[test]
fn test_format_table_empty() {
    assert_eq!(format_table(&[]), "No migrations applied\n");
}

#[tokio::test]
async fn test_applied_reads_ledger() {
    let project = TestProject::new("");
    project.create_ledger().await;
    {
        let db = project.open_db();
        db.run_transaction(&db.ledger_table().insert_sql("one", 1))
            .await
            .unwrap();
    }

    let args = AppliedArgs {
        output: OutputFormat::Json,
    };
    execute(&args, &project.global()).await.unwrap();
}

#[tokio::test]
async fn test_applied_without_ledger_fails() {
    let project = TestProject::new("");
    let args = AppliedArgs {
        output: OutputFormat::Table,
    };

    let err = execute(&args, &project.global()).await.unwrap_err();
    assert!(format!("{err:#}").contains("does not exist"), "got {err:#}");
}
