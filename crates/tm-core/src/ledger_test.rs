use super::*;

#[test]
fn test_qualified_name() {
    let table = LedgerTable::new("public");
    assert_eq!(table.qualified_name(), r#""public"."MIGRATIONS""#);
    assert_eq!(table.to_string(), r#""public"."MIGRATIONS""#);
}

#[test]
fn test_insert_sql_exact_text() {
    let table = LedgerTable::new("public");
    assert_eq!(
        table.insert_sql("one", 1),
        r#"INSERT INTO "public"."MIGRATIONS" ("MIGRATION_ID", "ITERATION") VALUES ('one', 1);"#
    );
}

#[test]
fn test_insert_sql_escapes_quotes_in_id() {
    let table = LedgerTable::new("app");
    let sql = table.insert_sql("it's", 4);
    assert!(sql.contains("VALUES ('it''s', 4);"));
}

#[test]
fn test_schema_with_quote_is_escaped() {
    let table = LedgerTable::new("we\"ird");
    assert_eq!(table.qualified_name(), r#""we""ird"."MIGRATIONS""#);
}

#[test]
fn test_select_statements_target_table() {
    let table = LedgerTable::new("audit");
    assert_eq!(
        table.select_applied_sql(),
        r#"SELECT "MIGRATION_ID", "ITERATION" FROM "audit"."MIGRATIONS""#
    );
    assert_eq!(
        table.select_latest_iteration_sql(),
        r#"SELECT COALESCE(MAX("ITERATION"), 0) FROM "audit"."MIGRATIONS""#
    );
}

#[test]
fn test_create_sql_creates_schema_and_table() {
    let sql = LedgerTable::new("audit").create_sql();
    assert!(sql.starts_with(r#"CREATE SCHEMA IF NOT EXISTS "audit";"#));
    assert!(sql.contains(r#"CREATE TABLE IF NOT EXISTS "audit"."MIGRATIONS""#));
    assert!(sql.contains(r#""MIGRATION_ID" TEXT PRIMARY KEY"#));
}

#[test]
fn test_default_schema_is_public() {
    assert_eq!(LedgerTable::default().schema(), "public");
}
