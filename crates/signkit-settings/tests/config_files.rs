use signkit_settings::{Config, ConfigError, SettingsError};
use tempfile::TempDir;

#[test]
fn test_toml_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = Config::default();
    config.viewer.initial_scale = 1.0;
    config.theme.recipient_palette = vec!["red".to_string(), "green".to_string()];
    config.save_to_file(&path).unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_json_round_trip_into_nested_dir() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let mut config = Config::default();
    config.placement.default_field_width_percent = 30.0;
    config.save_to_file(&path).unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded.placement.default_field_width_percent, 30.0);
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");

    let result = Config::default().save_to_file(&path);
    assert!(matches!(
        result,
        Err(SettingsError::Config(ConfigError::UnsupportedFormat(ref ext))) if ext == "yaml"
    ));
}

#[test]
fn test_invalid_file_is_rejected_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[viewer]\ninitial_scale = 5.0\n").unwrap();

    let result = Config::load_from_file(&path);
    assert!(matches!(result, Err(SettingsError::Config(_))));
}

#[test]
fn test_load_or_default_when_missing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let config = Config::load_or_default(&path).unwrap();
    assert_eq!(config, Config::default());
}
