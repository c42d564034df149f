//! tm-db - Ledger store for Tidemark
//!
//! This crate provides the `LedgerStore` trait the rollout engine talks to,
//! with an embedded DuckDB implementation and a PostgreSQL implementation on
//! top of sqlx.

pub mod duckdb;
pub mod error;
pub mod postgres;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use postgres::PostgresBackend;
pub use traits::LedgerStore;
