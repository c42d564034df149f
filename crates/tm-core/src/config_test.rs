use super::*;
use serial_test::serial;
use std::fs;
use tempfile::tempdir;

fn env_map(pairs: &[(&str, &str)]) -> MapProvider {
    MapProvider::new(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

fn postgres_config(yaml: &str) -> Config {
    serde_yaml::from_str(yaml).unwrap()
}

#[test]
fn test_parse_empty_config_uses_defaults() {
    let config: Config = serde_yaml::from_str("{}").unwrap();
    assert_eq!(config.rollout.directory, "migrations/rollout");
    assert!(!config.rollout.as_single_migrations);
    assert!(!config.rollout.replace_variables);
    assert_eq!(config.database.db_type, DbType::Postgres);
    assert!(config.vars.is_empty());
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
rollout:
  directory: db/rollout
  as_single_migrations: true
  replace_variables: true
database:
  type: postgres
  host: db.internal
  port: 6543
  database: app
  username: deployer
  password: secret
  schema: audit
vars:
  TENANT: acme
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.rollout.directory, "db/rollout");
    assert!(config.rollout.as_single_migrations);
    assert!(config.rollout.replace_variables);
    assert_eq!(config.database.host.as_deref(), Some("db.internal"));
    assert_eq!(config.database.port, Some(6543));
    assert_eq!(config.database.schema.as_deref(), Some("audit"));
    assert_eq!(
        config.vars.get("TENANT"),
        Some(&serde_yaml::Value::String("acme".to_string()))
    );
}

#[test]
fn test_parse_duckdb_type() {
    let config: Config = serde_yaml::from_str("database:\n  type: duckdb\n  path: app.duckdb\n").unwrap();
    assert_eq!(config.database.db_type, DbType::DuckDb);
    assert_eq!(config.database.path.as_deref(), Some("app.duckdb"));
}

#[test]
fn test_unknown_fields_rejected() {
    let result: Result<Config, _> = serde_yaml::from_str("rollout:\n  directry: typo\n");
    assert!(result.is_err());
}

#[test]
fn test_resolve_applies_defaults() {
    let config = postgres_config("database:\n  database: app\n  username: app\n");
    let settings = config
        .database
        .resolve(&ConnectionOverrides::default(), &env_map(&[]))
        .unwrap();
    assert_eq!(settings.host, "127.0.0.1");
    assert_eq!(settings.port, 5432);
    assert_eq!(settings.schema, "public");
    assert_eq!(settings.password, None);
}

#[test]
fn test_resolve_cli_overrides_win() {
    let config = postgres_config(
        "database:\n  host: file-host\n  port: 1111\n  database: filedb\n  username: fileuser\n  schema: fileschema\n",
    );
    let overrides = ConnectionOverrides {
        host: Some("cli-host".to_string()),
        port: Some(2222),
        database: Some("clidb".to_string()),
        username: Some("cliuser".to_string()),
        schema: Some("clischema".to_string()),
        path: None,
    };
    let settings = config.database.resolve(&overrides, &env_map(&[])).unwrap();
    assert_eq!(settings.host, "cli-host");
    assert_eq!(settings.port, 2222);
    assert_eq!(settings.database.as_deref(), Some("clidb"));
    assert_eq!(settings.username.as_deref(), Some("cliuser"));
    assert_eq!(settings.schema, "clischema");
}

#[test]
fn test_resolve_password_from_environment_when_not_in_file() {
    let config = postgres_config("database:\n  database: app\n  username: app\n");
    let env = env_map(&[("TM_DB_PASSWORD", "from-env")]);
    let settings = config
        .database
        .resolve(&ConnectionOverrides::default(), &env)
        .unwrap();
    assert_eq!(settings.password.as_deref(), Some("from-env"));
}

#[test]
fn test_resolve_file_password_wins_over_environment() {
    let config =
        postgres_config("database:\n  database: app\n  username: app\n  password: in-file\n");
    let env = env_map(&[("TM_DB_PASSWORD", "from-env")]);
    let settings = config
        .database
        .resolve(&ConnectionOverrides::default(), &env)
        .unwrap();
    assert_eq!(settings.password.as_deref(), Some("in-file"));
}

#[test]
fn test_resolve_placeholders_in_file_values() {
    let config = postgres_config(
        "database:\n  database: app\n  username: ${{DB_USER}}\n  password: ${{APP_DB_PASSWORD}}\n",
    );
    let env = env_map(&[("DB_USER", "deployer"), ("APP_DB_PASSWORD", "s3cret")]);
    let settings = config
        .database
        .resolve(&ConnectionOverrides::default(), &env)
        .unwrap();
    assert_eq!(settings.username.as_deref(), Some("deployer"));
    assert_eq!(settings.password.as_deref(), Some("s3cret"));
}

#[test]
fn test_resolve_unresolved_placeholder_fails() {
    let config = postgres_config("database:\n  database: app\n  username: ${{NOPE}}\n");
    let err = config
        .database
        .resolve(&ConnectionOverrides::default(), &env_map(&[]))
        .unwrap_err();
    assert!(matches!(err, CoreError::UnresolvedVariable { .. }));
}

#[test]
fn test_resolve_postgres_requires_database_and_username() {
    let config = postgres_config("database:\n  username: app\n");
    let err = config
        .database
        .resolve(&ConnectionOverrides::default(), &env_map(&[]))
        .unwrap_err();
    assert!(matches!(err, CoreError::ConfigInvalid { .. }));

    let config = postgres_config("database:\n  database: app\n");
    let err = config
        .database
        .resolve(&ConnectionOverrides::default(), &env_map(&[]))
        .unwrap_err();
    assert!(matches!(err, CoreError::ConfigInvalid { .. }));
}

#[test]
fn test_resolve_duckdb_needs_no_credentials() {
    let config = postgres_config("database:\n  type: duckdb\n");
    let settings = config
        .database
        .resolve(&ConnectionOverrides::default(), &env_map(&[]))
        .unwrap();
    assert_eq!(settings.db_type, DbType::DuckDb);
    assert_eq!(settings.path, ":memory:");
    assert_eq!(settings.ledger_table().qualified_name(), r#""public"."MIGRATIONS""#);
}

#[test]
fn test_settings_debug_redacts_password() {
    let config =
        postgres_config("database:\n  database: app\n  username: app\n  password: hunter2\n");
    let settings = config
        .database
        .resolve(&ConnectionOverrides::default(), &env_map(&[]))
        .unwrap();
    let rendered = format!("{:?}", settings);
    assert!(!rendered.contains("hunter2"));
    assert!(rendered.contains("***"));
}

#[test]
fn test_load_from_dir_finds_yml_and_yaml() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("tidemark.yaml"),
        "rollout:\n  directory: scripts\n",
    )
    .unwrap();
    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.rollout.directory, "scripts");
    assert_eq!(
        config.rollout_dir_absolute(dir.path()),
        dir.path().join("scripts")
    );
}

#[test]
fn test_load_from_dir_missing_config() {
    let dir = tempdir().unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
}

#[test]
fn test_load_reports_parse_errors_with_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tidemark.yml");
    fs::write(&path, "rollout: [not, a, map]\n").unwrap();
    let err = Config::load(&path).unwrap_err();
    match err {
        CoreError::ConfigParseError { path: p, .. } => assert!(p.ends_with("tidemark.yml")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_load_rejects_empty_rollout_directory() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tidemark.yml");
    fs::write(&path, "rollout:\n  directory: \"\"\n").unwrap();
    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, CoreError::ConfigInvalid { .. }));
}

#[test]
fn test_substitution_provider_prefers_config_vars() {
    let config: Config = serde_yaml::from_str("vars:\n  PATH: from-config\n").unwrap();
    let provider = config.substitution_provider();
    assert_eq!(provider.lookup("PATH").as_deref(), Some("from-config"));
}

#[test]
#[serial]
fn test_resolve_config_path_cli_takes_precedence() {
    let original = std::env::var("TM_CONFIG").ok();
    std::env::set_var("TM_CONFIG", "env.yml");
    let result = Config::resolve_config_path(Some("cli.yml"));
    assert_eq!(result, Some("cli.yml".to_string()));
    match original {
        Some(v) => std::env::set_var("TM_CONFIG", v),
        None => std::env::remove_var("TM_CONFIG"),
    }
}

#[test]
#[serial]
fn test_resolve_config_path_uses_env_var() {
    let original = std::env::var("TM_CONFIG").ok();
    std::env::set_var("TM_CONFIG", "env.yml");
    let result = Config::resolve_config_path(None);
    assert_eq!(result, Some("env.yml".to_string()));
    match original {
        Some(v) => std::env::set_var("TM_CONFIG", v),
        None => std::env::remove_var("TM_CONFIG"),
    }
}
