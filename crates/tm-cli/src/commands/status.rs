//! Status command implementation - applied/pending report per script

use anyhow::{Context, Result};
use serde::Serialize;
use tm_core::DirectoryScriptSource;
use tm_rollout::MigrationStatus;

use crate::cli::{GlobalArgs, OutputFormat, StatusArgs};
use crate::context::RuntimeContext;

/// Execute the status command
pub(crate) async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global).await?;
    let dir = ctx.rollout_dir(args.directory.as_deref());

    let status =
        tm_rollout::migration_status(ctx.store.as_ref(), &DirectoryScriptSource::new(), &dir)
            .await
            .with_context(|| format!("Failed to read migration status for {}", dir.display()))?;

    match args.output {
        OutputFormat::Table => print!("{}", format_table(&status)),
        OutputFormat::Json => {
            let rows: Vec<StatusRow> = status.iter().map(StatusRow::from).collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }

    Ok(())
}

#[derive(Debug, Serialize)]
struct StatusRow<'a> {
    id: &'a str,
    path: String,
    applied: bool,
    iteration: Option<i32>,
}

impl<'a> From<&'a MigrationStatus> for StatusRow<'a> {
    fn from(status: &'a MigrationStatus) -> Self {
        Self {
            id: status.id.as_str(),
            path: status.path.display().to_string(),
            applied: status.is_applied(),
            iteration: status.iteration,
        }
    }
}

/// Render script states as a fixed-width table with a summary line
pub(crate) fn format_table(status: &[MigrationStatus]) -> String {
    if status.is_empty() {
        return "No migration scripts found\n".to_string();
    }

    let id_width = status
        .iter()
        .map(|s| s.id.len())
        .max()
        .unwrap_or(9)
        .max(9);

    let mut out = format!("{:<id_width$}  {:<7}  ITERATION\n", "MIGRATION", "STATE");
    out.push_str(&format!("{:-<id_width$}  {:-<7}  {:-<9}\n", "", "", ""));
    for s in status {
        let (state, iteration) = match s.iteration {
            Some(i) => ("applied", i.to_string()),
            None => ("pending", "-".to_string()),
        };
        out.push_str(&format!("{:<id_width$}  {:<7}  {}\n", s.id.as_str(), state, iteration));
    }

    let applied = status.iter().filter(|s| s.is_applied()).count();
    out.push_str(&format!(
        "\n{} applied, {} pending\n",
        applied,
        status.len() - applied
    ));
    out
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
