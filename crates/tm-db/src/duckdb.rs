//! DuckDB ledger store implementation

use crate::error::{DbError, DbResult};
use crate::traits::LedgerStore;
use async_trait::async_trait;
use duckdb::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tm_core::{AppliedMigration, LedgerTable, LEDGER_TABLE_NAME};

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
    ledger: LedgerTable,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory(ledger: LedgerTable) -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
            ledger,
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path, ledger: LedgerTable) -> DbResult<Self> {
        let conn = Connection::open(path).map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
            ledger,
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str, ledger: LedgerTable) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory(ledger)
        } else {
            Self::from_path(Path::new(path), ledger)
        }
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    /// Execute batch SQL outside any explicit transaction
    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))
    }

    /// Count rows of an arbitrary query
    pub fn query_count(&self, sql: &str) -> DbResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM ({})", sql), [], |row| {
                row.get(0)
            })
            .map_err(DbError::from)?;
        Ok(count as usize)
    }

    fn table_exists_sync(&self) -> DbResult<bool> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_schema = ? AND table_name = ?",
                duckdb::params![self.ledger.schema(), LEDGER_TABLE_NAME],
                |row| row.get(0),
            )
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;
        Ok(count > 0)
    }

    fn applied_migrations_sync(&self) -> DbResult<Vec<AppliedMigration>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&self.ledger.select_applied_sql())?;
        let rows = stmt.query_map([], |row| {
            Ok(AppliedMigration {
                migration_id: row.get(0)?,
                iteration: row.get(1)?,
            })
        })?;

        let applied = rows
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DbError::QueryError(e.to_string()))?;
        Ok(applied)
    }

    fn latest_iteration_sync(&self) -> DbResult<i32> {
        let conn = self.lock()?;
        let latest: i32 = conn.query_row(&self.ledger.select_latest_iteration_sql(), [], |row| {
            row.get(0)
        })?;
        Ok(latest)
    }

    fn run_transaction_sync(&self, sql: &str) -> DbResult<()> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| DbError::ExecutionError(format!("failed to begin transaction: {e}")))?;
        // Dropping `tx` without commit rolls back.
        tx.execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;
        tx.commit()
            .map_err(|e| DbError::ExecutionError(format!("failed to commit transaction: {e}")))
    }
}

#[async_trait]
impl LedgerStore for DuckDbBackend {
    fn ledger_table(&self) -> &LedgerTable {
        &self.ledger
    }

    async fn table_exists(&self) -> DbResult<bool> {
        self.table_exists_sync()
    }

    async fn applied_migrations(&self) -> DbResult<Vec<AppliedMigration>> {
        self.applied_migrations_sync()
    }

    async fn latest_iteration(&self) -> DbResult<i32> {
        self.latest_iteration_sync()
    }

    async fn run_transaction(&self, sql: &str) -> DbResult<()> {
        log::debug!("duckdb: running transaction ({} bytes)", sql.len());
        self.run_transaction_sync(sql)
    }

    async fn create_ledger_table(&self) -> DbResult<()> {
        self.execute_batch(&self.ledger.create_sql())
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
