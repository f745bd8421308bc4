//! Integration tests for Settings loading with layered merge semantics.
//!
//! Merge semantics: defaults, then the global file, then the local file.
//! Each layer replaces only the fields it names.
//!
//! These tests use `load_from` with temp files only, so neither the real
//! global config nor ORGCHART_* variables take part.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use orgchart::application::ApplicationError;
use orgchart::config::{local_config_path, Settings};

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

// ============================================================
// load_from() layering
// ============================================================

#[test]
fn given_local_config_when_loading_then_named_fields_override_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let local = write(
        &dir,
        ".orgchart.toml",
        r#"
data_dir = "/srv/orgchart"
probation_days = 90
"#,
    );

    // Act
    let settings = Settings::load_from(None, Some(&local)).expect("load settings");

    // Assert
    assert_eq!(settings.data_dir, PathBuf::from("/srv/orgchart"));
    assert_eq!(settings.probation_days, 90);
    assert_eq!(settings.cache_ttl_secs, 900, "unnamed fields keep defaults");
    assert_eq!(settings.headcount_open_image, "/headcount_open.png");
}

#[test]
fn given_global_and_local_config_when_loading_then_local_wins_per_field() {
    let dir = TempDir::new().unwrap();
    let global = write(
        &dir,
        "global.toml",
        r#"
cache_ttl_secs = 60
image_base_url = "https://img.example.com/"
probation_days = 30
"#,
    );
    let local = write(&dir, "local.toml", "probation_days = 45\n");

    let settings = Settings::load_from(Some(&global), Some(&local)).expect("load settings");

    assert_eq!(settings.cache_ttl_secs, 60);
    assert_eq!(
        settings.image_base_url.as_deref(),
        Some("https://img.example.com/")
    );
    assert_eq!(settings.probation_days, 45);
}

#[test]
fn given_missing_files_when_loading_then_defaults_are_used() {
    let dir = TempDir::new().unwrap();
    let absent = dir.path().join("nope.toml");

    let settings = Settings::load_from(Some(&absent), Some(&absent)).expect("load settings");

    assert_eq!(settings.cache_ttl_secs, Settings::default().cache_ttl_secs);
    assert_eq!(settings.probation_days, 60);
}

#[test]
fn given_data_dir_with_tilde_when_loading_then_it_is_expanded() {
    let dir = TempDir::new().unwrap();
    let local = write(&dir, "local.toml", "data_dir = \"~/charts-data\"\n");

    let settings = Settings::load_from(None, Some(&local)).expect("load settings");

    assert!(!settings.data_dir.to_string_lossy().starts_with('~'));
    assert!(settings.data_dir.ends_with("charts-data"));
}

// ============================================================
// Errors
// ============================================================

#[test]
fn given_invalid_toml_when_loading_then_config_error() {
    let dir = TempDir::new().unwrap();
    let local = write(&dir, "local.toml", "probation_days = [not toml");

    let result = Settings::load_from(None, Some(&local));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_wrong_value_type_when_loading_then_config_error() {
    let dir = TempDir::new().unwrap();
    let local = write(&dir, "local.toml", "cache_ttl_secs = \"soon\"\n");

    let result = Settings::load_from(None, Some(&local));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_negative_probation_window_when_loading_then_config_error() {
    let dir = TempDir::new().unwrap();
    let local = write(&dir, "local.toml", "probation_days = -5\n");

    let result = Settings::load_from(None, Some(&local));

    match result {
        Err(ApplicationError::Config { message }) => assert!(message.contains("probation_days")),
        other => panic!("expected config error, got {:?}", other),
    }
}

// ============================================================
// Paths and output
// ============================================================

#[test]
fn given_settings_when_deriving_paths_then_they_live_under_data_dir() {
    let settings = Settings {
        data_dir: PathBuf::from("/data"),
        ..Settings::default()
    };

    assert_eq!(settings.employees_path(), PathBuf::from("/data/employees.json"));
    assert_eq!(settings.charts_dir(), PathBuf::from("/data/charts"));
    assert_eq!(
        local_config_path(&PathBuf::from("/work")),
        PathBuf::from("/work/.orgchart.toml")
    );
}

#[test]
fn given_settings_when_rendered_as_toml_then_it_loads_back_unchanged() {
    let dir = TempDir::new().unwrap();
    let original = Settings {
        data_dir: PathBuf::from("/var/lib/orgchart"),
        cache_ttl_secs: 120,
        probation_days: 14,
        image_base_url: Some("https://img/".into()),
        headcount_open_image: "/vacant.png".into(),
    };
    let path = write(&dir, "roundtrip.toml", &original.to_toml().unwrap());

    let loaded = Settings::load_from(None, Some(&path)).unwrap();

    assert_eq!(loaded, original);
}
