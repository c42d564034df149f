use super::*;
use std::collections::HashSet;

#[test]
fn test_migration_id_equality_is_case_sensitive() {
    let id = MigrationId::new("AddUsers");
    assert_eq!(id, "AddUsers");
    assert_ne!(id, "addusers");
}

#[test]
fn test_migration_id_try_new_empty_is_none() {
    assert!(MigrationId::try_new("").is_none());
}

#[test]
fn test_migration_id_borrow_allows_str_lookup() {
    let set: HashSet<MigrationId> = [MigrationId::new("one"), MigrationId::new("two")]
        .into_iter()
        .collect();
    assert!(set.contains("one"));
    assert!(!set.contains("three"));
}

#[test]
fn test_migration_id_deserialize_rejects_empty() {
    let result: Result<MigrationId, _> = serde_yaml::from_str("''");
    assert!(result.is_err());
}
