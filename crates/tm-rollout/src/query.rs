//! Read-only ledger queries

use crate::error::{RolloutError, RolloutResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tm_core::{AppliedMigration, MigrationId, ScriptSource};
use tm_db::LedgerStore;

/// Every applied migration, in the order the store returns them
pub async fn applied_migrations(store: &dyn LedgerStore) -> RolloutResult<Vec<AppliedMigration>> {
    ensure_ledger(store).await?;
    Ok(store.applied_migrations().await?)
}

/// Applied/pending state of one script in the rollout directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub id: MigrationId,
    pub path: PathBuf,

    /// Iteration the script was recorded under, if applied
    pub iteration: Option<i32>,
}

impl MigrationStatus {
    pub fn is_applied(&self) -> bool {
        self.iteration.is_some()
    }
}

/// Status of every script in `dir`, in listing order. Script bodies are not read.
pub async fn migration_status(
    store: &dyn LedgerStore,
    source: &dyn ScriptSource,
    dir: &Path,
) -> RolloutResult<Vec<MigrationStatus>> {
    ensure_ledger(store).await?;

    let files = source.list_files(dir)?;
    let recorded: HashMap<String, i32> = store
        .applied_migrations()
        .await?
        .into_iter()
        .map(|record| (record.migration_id, record.iteration))
        .collect();

    Ok(files
        .into_iter()
        .map(|file| MigrationStatus {
            iteration: recorded.get(file.id.as_str()).copied(),
            id: file.id,
            path: file.path,
        })
        .collect())
}

async fn ensure_ledger(store: &dyn LedgerStore) -> RolloutResult<()> {
    if store.table_exists().await? {
        Ok(())
    } else {
        Err(RolloutError::LedgerMissing {
            table: store.ledger_table().qualified_name(),
        })
    }
}

#[cfg(test)]
#[path = "query_test.rs"]
mod tests;
