//! Configuration and catalog file tests
//!
//! Tests for config paths, config files on disk, and YAML catalogs.

mod common;

use indicator_formula::config::{ConfigError, FormulaConfig};
use indicator_formula::config_paths;
use indicator_formula::model::UnknownTagPolicy;
use indicator_formula::source::Catalog;
use indicator_formula::token::TokenKind;
use tempfile::TempDir;

// ========================================================================
// Config Paths Tests
// ========================================================================

#[test]
fn test_config_dir_contains_app_name() {
    if let Some(dir) = config_paths::config_dir() {
        assert!(dir.to_string_lossy().contains("indicator-formula"));
    }
}

#[test]
fn test_config_and_catalog_file_names() {
    if let Some(path) = config_paths::config_file() {
        assert!(path.ends_with("config.yaml"));
    }
    if let Some(path) = config_paths::catalog_file() {
        assert!(path.ends_with("catalog.yaml"));
    }
    if let Some(path) = config_paths::logs_dir() {
        assert!(path.ends_with("logs"));
    }
}

// ========================================================================
// Config File Tests
// ========================================================================

#[test]
fn test_save_then_load_config() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("config.yaml");

    let config = FormulaConfig {
        allow_mid_word: false,
        debounce_ms: 120,
        max_candidates: 10,
        unknown_tags: UnknownTagPolicy::Reject,
        ..FormulaConfig::default()
    };
    config.save_to(&path).unwrap();

    let loaded = FormulaConfig::load_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_missing_config_is_io_error() {
    let temp = TempDir::new().unwrap();
    let err = FormulaConfig::load_from(&temp.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::IoError(_)));
}

#[test]
fn test_load_invalid_config_is_parse_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.yaml");
    std::fs::write(&path, "max_candidates: lots\n").unwrap();
    let err = FormulaConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
}

#[test]
fn test_empty_config_file_uses_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.yaml");
    std::fs::write(&path, "{}\n").unwrap();
    assert_eq!(FormulaConfig::load_from(&path).unwrap(), FormulaConfig::default());
}

// ========================================================================
// Catalog Tests
// ========================================================================

#[test]
fn test_load_catalog_file_into_registry() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("catalog.yaml");
    std::fs::write(
        &path,
        "positions:\n  - { id: P_0100, label: Steel output }\n  - { id: P_0101, label: Freight km }\nimpacts:\n  - { id: I_0100, label: Water stress }\n",
    )
    .unwrap();

    let registry = Catalog::load(&path).unwrap().into_registry();
    let positions = registry.search(TokenKind::Position, "").unwrap();
    assert_eq!(positions.len(), 2);
    assert_eq!(positions[0].id, "P_0100");

    let impacts = registry.search(TokenKind::Impact, "water").unwrap();
    assert_eq!(impacts.len(), 1);
    assert_eq!(impacts[0].label, "Water stress");
}

#[test]
fn test_catalog_missing_section_is_empty() {
    let catalog = Catalog::from_yaml("positions:\n  - { id: P_1, label: One }\n").unwrap();
    assert_eq!(catalog.positions.len(), 1);
    assert!(catalog.impacts.is_empty());
}

#[test]
fn test_load_missing_catalog_reports_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nope.yaml");
    let err = Catalog::load(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("nope.yaml"));
}
