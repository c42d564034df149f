//! Applied command implementation - lists the ledger

use anyhow::{Context, Result};
use tm_core::AppliedMigration;

use crate::cli::{AppliedArgs, GlobalArgs, OutputFormat};
use crate::context::RuntimeContext;

/// Execute the applied command
pub(crate) async fn execute(args: &AppliedArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global).await?;
    let applied = tm_rollout::applied_migrations(ctx.store.as_ref())
        .await
        .context("Failed to read the migration ledger")?;

    match args.output {
        OutputFormat::Table => print!("{}", format_table(&applied)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&applied)?),
    }

    Ok(())
}

/// Render ledger rows as a fixed-width table
pub(crate) fn format_table(applied: &[AppliedMigration]) -> String {
    if applied.is_empty() {
        return "No migrations applied\n".to_string();
    }

    let id_width = applied
        .iter()
        .map(|m| m.migration_id.len())
        .max()
        .unwrap_or(12)
        .max(12);

    let mut out = format!("{:<id_width$}  ITERATION\n", "MIGRATION_ID");
    out.push_str(&format!("{:-<id_width$}  {:-<9}\n", "", ""));
    for migration in applied {
        out.push_str(&format!(
            "{:<id_width$}  {}\n",
            migration.migration_id, migration.iteration
        ));
    }
    out.push_str(&format!("\n{} migrations applied\n", applied.len()));
    out
}

#[cfg(test)]
#[path = "applied_test.rs"]
mod tests;
