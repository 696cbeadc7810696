use super::data::{path_display, Config, ConfigKey};
use super::io::ConfigError;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_load_nonexistent_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nonexistent_config.toml");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_persistence_lifecycle() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config
        .set_value(ConfigKey::ApiBase, "https://fisherman.example/api")
        .unwrap();
    config.set_value(ConfigKey::UseKeyring, "off").unwrap();
    config.save_to_path(&config_path).expect("save failed");

    let loaded = Config::load_from_path(&config_path).expect("load failed");
    assert_eq!(loaded.api_base.as_deref(), Some("https://fisherman.example/api"));
    assert!(!loaded.use_keyring());

    let mut loaded = loaded;
    loaded.unset_value(ConfigKey::ApiBase);
    loaded.save_to_path(&config_path).expect("save failed");
    let reloaded = Config::load_from_path(&config_path).expect("load failed");
    assert_eq!(reloaded.api_base, None);
    assert_eq!(reloaded.use_keyring, Some(false));
}

#[test]
fn test_invalid_toml_reports_parse_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "api_base = [").unwrap();

    match Config::load_from_path(&config_path) {
        Err(ConfigError::Parse { path, .. }) => assert_eq!(path, config_path),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_api_base_precedence() {
    let mut config = Config::default();
    assert_eq!(config.api_base_with_env(None), "http://localhost:8000/api");

    config.api_base = Some("https://configured.example/api".to_string());
    assert_eq!(
        config.api_base_with_env(None),
        "https://configured.example/api"
    );
    assert_eq!(
        config.api_base_with_env(Some("https://env.example/api".to_string())),
        "https://env.example/api"
    );
    assert_eq!(
        config.api_base_with_env(Some("  ".to_string())),
        "https://configured.example/api"
    );
}

#[test]
fn test_config_key_parsing() {
    assert_eq!("api-base".parse::<ConfigKey>(), Ok(ConfigKey::ApiBase));
    assert_eq!("storage_path".parse::<ConfigKey>(), Ok(ConfigKey::StoragePath));
    assert!("theme".parse::<ConfigKey>().is_err());
}

#[test]
fn test_set_value_validation() {
    let mut config = Config::default();
    assert!(config.set_value(ConfigKey::ApiBase, "not a url").is_err());
    assert!(config.set_value(ConfigKey::UseKeyring, "maybe").is_err());
    assert!(config.set_value(ConfigKey::StoragePath, "  ").is_err());
    assert_eq!(config, Config::default());

    config
        .set_value(ConfigKey::StoragePath, "/tmp/fisherman/state.json")
        .unwrap();
    assert_eq!(
        config.storage_path(),
        Some(PathBuf::from("/tmp/fisherman/state.json"))
    );
}

#[test]
fn test_describe_lists_every_key() {
    let config = Config {
        api_base: Some("https://fisherman.example/api".to_string()),
        use_keyring: Some(true),
        storage_path: Some(PathBuf::from("/srv/state.json")),
    };
    let lines = config.describe();
    assert_eq!(lines[0], "Current configuration:");
    assert_eq!(lines[1], "  api-base: https://fisherman.example/api");
    assert_eq!(lines[2], "  use-keyring: on");
    assert_eq!(lines[3], format!("  storage-path: {}", path_display("/srv/state.json")));
}
