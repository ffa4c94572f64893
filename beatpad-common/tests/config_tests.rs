//! Configuration loading and priority resolution
//!
//! Uses serial_test to prevent ENV variable races: tests that touch
//! BEATPAD_DATABASE are marked #[serial].

use beatpad_common::config::{
    load_toml_config, resolve_config, CliOverrides, TomlConfig, DATABASE_ENV_VAR, DEFAULT_HOST,
    DEFAULT_PORT,
};
use beatpad_common::Error;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;

fn toml_with_db(path: &str) -> TomlConfig {
    TomlConfig {
        database_path: Some(PathBuf::from(path)),
        port: Some(9000),
        ..TomlConfig::default()
    }
}

#[test]
#[serial]
fn test_no_overrides_uses_compiled_defaults() {
    env::remove_var(DATABASE_ENV_VAR);

    let config = resolve_config(CliOverrides::default(), TomlConfig::default());

    assert_eq!(config.host, DEFAULT_HOST);
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.log_level, "info");
    assert!(config.database_path.ends_with("beatpad.db"));
}

#[test]
#[serial]
fn test_toml_beats_defaults() {
    env::remove_var(DATABASE_ENV_VAR);

    let config = resolve_config(CliOverrides::default(), toml_with_db("/from/toml.db"));

    assert_eq!(config.database_path, PathBuf::from("/from/toml.db"));
    assert_eq!(config.port, 9000);
}

#[test]
#[serial]
fn test_env_beats_toml() {
    env::set_var(DATABASE_ENV_VAR, "/from/env.db");

    let config = resolve_config(CliOverrides::default(), toml_with_db("/from/toml.db"));

    env::remove_var(DATABASE_ENV_VAR);
    assert_eq!(config.database_path, PathBuf::from("/from/env.db"));
}

#[test]
#[serial]
fn test_cli_beats_everything() {
    env::set_var(DATABASE_ENV_VAR, "/from/env.db");

    let cli = CliOverrides {
        database_path: Some(PathBuf::from("/from/cli.db")),
        host: Some("0.0.0.0".into()),
        port: Some(1234),
        log_level: Some("trace".into()),
    };
    let config = resolve_config(cli, toml_with_db("/from/toml.db"));

    env::remove_var(DATABASE_ENV_VAR);
    assert_eq!(config.database_path, PathBuf::from("/from/cli.db"));
    assert_eq!(config.bind_addr(), "0.0.0.0:1234");
    assert_eq!(config.log_level, "trace");
}

#[test]
fn test_load_explicit_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = 7000\n[logging]\nlevel = \"warn\"").unwrap();

    let config = load_toml_config(Some(file.path())).unwrap();

    assert_eq!(config.port, Some(7000));
    assert_eq!(config.logging.level, "warn");
    assert!(config.database_path.is_none());
}

#[test]
fn test_missing_explicit_config_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_toml_config(Some(&dir.path().join("nope.toml")));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_malformed_config_file_is_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = \"not a number\"").unwrap();

    let result = load_toml_config(Some(file.path()));
    assert!(matches!(result, Err(Error::Config(_))));
}
