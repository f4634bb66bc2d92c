//! Tests for TOML config loading and graceful degradation
//!
//! Missing files fall back to defaults; malformed files are rejected.

use racer_common::config::{
    load_optional_config, load_toml_config, write_toml_config, EngineSection, IntakeSection,
    TomlConfig,
};
use racer_common::Error;
use tempfile::TempDir;

#[test]
fn test_missing_config_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.toml");

    let config = load_optional_config(Some(&path)).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_no_config_path_uses_defaults() {
    let config = load_optional_config(None).unwrap();
    assert!(config.intake.listen_addr.is_none());
    assert!(config.engine.capacity.is_none());
}

#[test]
fn test_write_then_load_preserves_settings() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("racer.toml");

    let config = TomlConfig {
        intake: IntakeSection {
            listen_addr: Some("127.0.0.1:18080".to_string()),
            downstream_url: Some("http://127.0.0.1:19090/game/response".to_string()),
            capacity: Some(64),
            workers: Some(2),
        },
        engine: EngineSection {
            listen_addr: Some("127.0.0.1:19090".to_string()),
            capacity: None,
        },
    };
    write_toml_config(&config, &path).unwrap();

    let loaded = load_toml_config(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_partial_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("partial.toml");
    std::fs::write(&path, "[engine]\ncapacity = 10\n").unwrap();

    let loaded = load_optional_config(Some(&path)).unwrap();
    assert_eq!(loaded.engine.capacity, Some(10));
    assert_eq!(loaded.intake, IntakeSection::default());
}

#[test]
fn test_malformed_config_file_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(&path, "[engine\ncapacity = ten").unwrap();

    let result = load_optional_config(Some(&path));
    assert!(matches!(result, Err(Error::Config(_))));
}
