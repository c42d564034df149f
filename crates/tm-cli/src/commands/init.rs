//! Init command implementation - creates the ledger table

use anyhow::{Context, Result};
use std::fs;

use crate::cli::{GlobalArgs, InitArgs};
use crate::context::RuntimeContext;

/// Execute the init command
pub(crate) async fn execute(args: &InitArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global).await?;
    let table = ctx.store.ledger_table().qualified_name();

    if ctx
        .store
        .table_exists()
        .await
        .context("Failed to check for the ledger table")?
    {
        println!("Ledger table {} already exists", table);
    } else {
        ctx.store
            .create_ledger_table()
            .await
            .with_context(|| format!("Failed to create ledger table {}", table))?;
        println!("Created ledger table {} ({})", table, ctx.settings.db_type);
    }

    if args.scaffold {
        let dir = ctx.rollout_dir(None);
        if dir.is_dir() {
            println!("Rollout directory {} already exists", dir.display());
        } else {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
            println!("Created rollout directory {}", dir.display());
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "init_test.rs"]
mod tests;
