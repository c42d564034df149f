//! Error types for tm-rollout

use thiserror::Error;
use tm_core::CoreError;
use tm_db::DbError;

/// Rollout and ledger query errors
#[derive(Error, Debug)]
pub enum RolloutError {
    /// Ledger table absent (R001)
    #[error("[R001] Ledger table {table} does not exist. Create it with `tm init`")]
    LedgerMissing { table: String },

    /// Listing or reading scripts failed (R002)
    #[error("[R002] {0}")]
    Script(#[from] CoreError),

    /// A migration transaction failed (R003)
    #[error("[R003] Failed to apply {migrations}: {source}")]
    ExecutionFailed { migrations: String, source: DbError },

    /// Placeholder substitution failed (R004)
    #[error("[R004] Variable substitution failed in {migration}: {source}")]
    Substitution { migration: String, source: CoreError },

    /// Reading the ledger failed (R005)
    #[error("[R005] Ledger read failed: {0}")]
    Ledger(#[from] DbError),
}

/// Result type alias for RolloutError
pub type RolloutResult<T> = Result<T, RolloutError>;
