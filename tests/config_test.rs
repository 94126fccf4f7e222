//! Config loading and defaults integration tests

use lamad_paths::{Config, PathDb, StorageError};
use std::path::PathBuf;

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = Config {
        storage_dir: dir.path().to_path_buf(),
        http_port: 9100,
        recommendation_limit: 3,
        seed_file: Some(PathBuf::from("/srv/seed.json")),
        ..Config::default()
    };

    let path = config.config_path();
    config.save(&path).expect("save config");
    assert!(path.exists());

    let loaded = Config::load(&path).expect("load config");
    assert_eq!(loaded.storage_dir, dir.path());
    assert_eq!(loaded.http_port, 9100);
    assert_eq!(loaded.recommendation_limit, 3);
    assert_eq!(loaded.database_file, "paths.db");
    assert_eq!(loaded.seed_file, Some(PathBuf::from("/srv/seed.json")));
}

#[test]
fn test_missing_fields_use_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "http_port = 8200\n").unwrap();

    let config = Config::load(&path).expect("load config");
    assert_eq!(config.http_port, 8200);
    assert_eq!(config.recommendation_limit, 5);
    assert!(config.storage_dir.ends_with("lamad-paths"));
}

#[test]
fn test_invalid_toml_is_config_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "http_port = \"not a number\"").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, StorageError::Config(_)));
}

#[test]
fn test_zero_recommendation_limit_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "recommendation_limit = 0").unwrap();

    assert!(matches!(Config::load(&path), Err(StorageError::Config(_))));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, StorageError::Io(_)));
}

#[test]
fn test_database_opens_at_configured_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = Config {
        storage_dir: dir.path().to_path_buf(),
        database_file: "custom.db".to_string(),
        ..Config::default()
    };

    let db = PathDb::open(&config.database_path()).expect("open db");
    assert_eq!(db.stats().unwrap().path_count, 0);
    drop(db);

    assert!(dir.path().join("custom.db").exists());

    // Reopening an existing file keeps the schema intact
    let db = PathDb::open(&config.database_path()).expect("reopen db");
    assert_eq!(db.stats().unwrap().user_count, 0);
}
