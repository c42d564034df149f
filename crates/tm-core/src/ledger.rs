//! Ledger table layout and the SQL that reads and writes it
//!
//! The ledger is a single table, `"<schema>"."MIGRATIONS"`, with columns
//! `"MIGRATION_ID"` (text primary key) and `"ITERATION"` (integer). Every
//! statement Tidemark issues against it is rendered here so the backends and
//! the rollout engine agree on quoting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed name of the ledger table
pub const LEDGER_TABLE_NAME: &str = "MIGRATIONS";

/// Column holding the migration id
pub const MIGRATION_ID_COLUMN: &str = "MIGRATION_ID";

/// Column holding the iteration number
pub const ITERATION_COLUMN: &str = "ITERATION";

/// One row of the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedMigration {
    /// Id of the applied migration
    pub migration_id: String,

    /// Iteration the migration was committed under
    pub iteration: i32,
}

impl AppliedMigration {
    /// Create a ledger row
    pub fn new(migration_id: impl Into<String>, iteration: i32) -> Self {
        Self {
            migration_id: migration_id.into(),
            iteration,
        }
    }
}

/// Location of the ledger table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerTable {
    schema: String,
}

impl LedgerTable {
    /// Ledger table under the given schema
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
        }
    }

    /// Schema the ledger lives in
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Quoted, schema-qualified table name: `"public"."MIGRATIONS"`
    pub fn qualified_name(&self) -> String {
        format!(
            "{}.{}",
            quote_ident(&self.schema),
            quote_ident(LEDGER_TABLE_NAME)
        )
    }

    /// Statement recording one applied migration
    pub fn insert_sql(&self, migration_id: &str, iteration: i32) -> String {
        format!(
            "INSERT INTO {} ({}, {}) VALUES ({}, {});",
            self.qualified_name(),
            quote_ident(MIGRATION_ID_COLUMN),
            quote_ident(ITERATION_COLUMN),
            quote_literal(migration_id),
            iteration
        )
    }

    /// Query returning every ledger row in store order
    pub fn select_applied_sql(&self) -> String {
        format!(
            "SELECT {}, {} FROM {}",
            quote_ident(MIGRATION_ID_COLUMN),
            quote_ident(ITERATION_COLUMN),
            self.qualified_name()
        )
    }

    /// Query returning the highest iteration, or 0 for an empty ledger
    pub fn select_latest_iteration_sql(&self) -> String {
        format!(
            "SELECT COALESCE(MAX({}), 0) FROM {}",
            quote_ident(ITERATION_COLUMN),
            self.qualified_name()
        )
    }

    /// Statements creating the schema and the ledger table if absent
    pub fn create_sql(&self) -> String {
        format!(
            "CREATE SCHEMA IF NOT EXISTS {};\n\
             CREATE TABLE IF NOT EXISTS {} (\n    \
                 {} TEXT PRIMARY KEY,\n    \
                 {} INTEGER NOT NULL\n\
             );",
            quote_ident(&self.schema),
            self.qualified_name(),
            quote_ident(MIGRATION_ID_COLUMN),
            quote_ident(ITERATION_COLUMN),
        )
    }
}

impl Default for LedgerTable {
    fn default() -> Self {
        Self::new("public")
    }
}

impl fmt::Display for LedgerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}

/// Double-quote an identifier, doubling embedded quotes
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Single-quote a string literal, doubling embedded quotes
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
