//! Strongly-typed migration id.

use crate::newtype_string::define_newtype_string;

define_newtype_string! {
    /// The id a migration is recorded under in the ledger: the script's file
    /// name without directory or extension. Compared exactly, case-sensitive.
    pub struct MigrationId;
}

#[cfg(test)]
#[path = "migration_id_test.rs"]
mod tests;
