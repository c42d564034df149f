//! Ledger store trait definition

use crate::error::DbResult;
use async_trait::async_trait;
use tm_core::{AppliedMigration, LedgerTable};

/// Access to the applied-migration ledger and the database it lives in.
///
/// Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Location of the ledger table this store reads and writes
    fn ledger_table(&self) -> &LedgerTable;

    /// Whether the ledger table exists
    async fn table_exists(&self) -> DbResult<bool>;

    /// Every ledger row, in the order the database returns them
    async fn applied_migrations(&self) -> DbResult<Vec<AppliedMigration>>;

    /// Highest recorded iteration, 0 when the ledger is empty
    async fn latest_iteration(&self) -> DbResult<i32>;

    /// Execute `sql` (one or more statements) as a single transaction.
    ///
    /// Either every statement commits or none does.
    async fn run_transaction(&self, sql: &str) -> DbResult<()>;

    /// Create the ledger schema and table if they do not exist
    async fn create_ledger_table(&self) -> DbResult<()>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
