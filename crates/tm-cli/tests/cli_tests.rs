//! End-to-end tests for the `tm` binary against a DuckDB ledger file

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Path to the compiled tm binary (resolved at compile time)
fn tm_bin() -> String {
    env!("CARGO_BIN_EXE_tm").to_string()
}

fn project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("tidemark.yml"),
        "database:\n  type: duckdb\n  path: ledger.duckdb\nvars:\n  GREETING: hello\n",
    )
    .unwrap();
    fs::create_dir_all(dir.path().join("migrations/rollout")).unwrap();
    dir
}

fn tm(dir: &Path, args: &[&str]) -> Output {
    Command::new(tm_bin())
        .arg("--project-dir")
        .arg(dir)
        .args(args)
        .env_remove("TM_CONFIG")
        .output()
        .expect("Failed to run tm")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "tm failed.\nstdout: {}\nstderr: {}",
        stdout(output),
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn test_rollout_before_init_fails() {
    let dir = project();
    fs::write(dir.path().join("migrations/rollout/one.sql"), "SELECT 1;").unwrap();

    let output = tm(dir.path(), &["rollout"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("[R001]"));
}

#[test]
fn test_init_rollout_applied_cycle() {
    let dir = project();
    let rollout = dir.path().join("migrations/rollout");
    fs::write(rollout.join("one.sql"), "CREATE TABLE public.one (id INTEGER);").unwrap();
    fs::write(
        rollout.join("two.sql"),
        "CREATE TABLE public.two (greeting TEXT DEFAULT '${{GREETING}}')",
    )
    .unwrap();

    assert_success(&tm(dir.path(), &["init"]));

    let output = tm(dir.path(), &["rollout", "--single", "--replace-variables"]);
    assert_success(&output);
    let lines: Vec<String> = stdout(&output).lines().map(String::from).collect();
    assert_eq!(lines[0], "Ledger table \"public\".\"MIGRATIONS\" found");
    assert!(lines[1].starts_with("Found 2 migration scripts in "));
    assert_eq!(lines[2], "Running migration two");
    assert_eq!(lines[3], "Running migration one");
    assert_eq!(lines[4], "Applied 2 migrations");

    let output = tm(dir.path(), &["rollout"]);
    assert_success(&output);
    assert!(stdout(&output)
        .contains("Number of applied migrations are the same as the total, skipping"));

    let output = tm(dir.path(), &["applied", "--output", "json"]);
    assert_success(&output);
    let mut applied: Vec<serde_json::Value> = serde_json::from_str(&stdout(&output)).unwrap();
    applied.sort_by_key(|row| row["migration_id"].as_str().unwrap_or_default().to_string());
    assert_eq!(applied.len(), 2);
    assert_eq!(applied[0]["migration_id"], "one");
    assert_eq!(applied[0]["iteration"], 2);
    assert_eq!(applied[1]["migration_id"], "two");
    assert_eq!(applied[1]["iteration"], 1);
}

#[test]
fn test_status_reports_pending() {
    let dir = project();
    fs::write(dir.path().join("migrations/rollout/one.sql"), "SELECT 1;").unwrap();
    assert_success(&tm(dir.path(), &["init"]));

    let output = tm(dir.path(), &["status"]);
    assert_success(&output);
    assert!(stdout(&output).contains("0 applied, 1 pending"));
}
