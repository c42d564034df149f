//! PostgreSQL ledger store implementation
//!
//! Uses a single-connection sqlx pool; the engine never holds more than one
//! transaction at a time. Transaction bodies go through the simple query
//! protocol so a script may contain any number of statements.

use crate::error::{DbError, DbResult};
use crate::traits::LedgerStore;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Executor, PgPool, Row};
use tm_core::ledger::{ITERATION_COLUMN, MIGRATION_ID_COLUMN};
use tm_core::{AppliedMigration, ConnectionSettings, LedgerTable, LEDGER_TABLE_NAME};

/// PostgreSQL database backend
pub struct PostgresBackend {
    pool: PgPool,
    ledger: LedgerTable,
}

impl PostgresBackend {
    /// Connect using resolved connection settings
    pub async fn connect(settings: &ConnectionSettings) -> DbResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options(settings))
            .await
            .map_err(|e| {
                DbError::ConnectionError(format!(
                    "{}:{}/{}: {}",
                    settings.host,
                    settings.port,
                    settings.database.as_deref().unwrap_or_default(),
                    e
                ))
            })?;

        Ok(Self::from_pool(pool, settings.ledger_table()))
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool, ledger: LedgerTable) -> Self {
        Self { pool, ledger }
    }
}

/// Build sqlx connect options from resolved settings
pub(crate) fn connect_options(settings: &ConnectionSettings) -> PgConnectOptions {
    let mut options = PgConnectOptions::new()
        .host(&settings.host)
        .port(settings.port);

    if let Some(database) = &settings.database {
        options = options.database(database);
    }
    if let Some(username) = &settings.username {
        options = options.username(username);
    }
    if let Some(password) = &settings.password {
        options = options.password(password);
    }

    options
}

#[async_trait]
impl LedgerStore for PostgresBackend {
    fn ledger_table(&self) -> &LedgerTable {
        &self.ledger
    }

    async fn table_exists(&self) -> DbResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM information_schema.tables \
             WHERE table_schema = $1 AND table_name = $2)",
        )
        .bind(self.ledger.schema())
        .bind(LEDGER_TABLE_NAME)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn applied_migrations(&self) -> DbResult<Vec<AppliedMigration>> {
        let rows = sqlx::query(&self.ledger.select_applied_sql())
            .fetch_all(&self.pool)
            .await?;

        let mut applied = Vec::with_capacity(rows.len());
        for row in rows {
            applied.push(AppliedMigration {
                migration_id: row.try_get(MIGRATION_ID_COLUMN)?,
                iteration: row.try_get(ITERATION_COLUMN)?,
            });
        }
        Ok(applied)
    }

    async fn latest_iteration(&self) -> DbResult<i32> {
        let latest: i32 = sqlx::query_scalar(&self.ledger.select_latest_iteration_sql())
            .fetch_one(&self.pool)
            .await?;
        Ok(latest)
    }

    async fn run_transaction(&self, sql: &str) -> DbResult<()> {
        log::debug!("postgres: running transaction ({} bytes)", sql.len());

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::ConnectionError(format!("failed to begin transaction: {e}")))?;

        // A plain &str carries no bind arguments, so sqlx sends it as a
        // simple query and multiple statements are accepted.
        (&mut *tx)
            .execute(sql)
            .await
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| DbError::ExecutionError(format!("failed to commit transaction: {e}")))
    }

    async fn create_ledger_table(&self) -> DbResult<()> {
        self.pool
            .execute(self.ledger.create_sql().as_str())
            .await
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;
        Ok(())
    }

    fn db_type(&self) -> &'static str {
        "postgres"
    }
}
