//! Integration tests for the settings file store
//!
//! These tests verify:
//! - Default settings are written when the file is missing
//! - Saved defaults survive a reload
//! - Invalid files are reported instead of overwritten

use barqr::settings::{FileSettingsStore, Settings, SettingsStore};
use barqr::{CodeOptions, ErrorCorrection, Format};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn create_test_store() -> (TempDir, FileSettingsStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSettingsStore::with_path(&temp_dir.path().join("nested").join("settings.json"));
    (temp_dir, store)
}

#[test]
fn test_missing_file_writes_defaults() {
    let (_temp_dir, store) = create_test_store();
    assert!(!store.path().exists());

    let settings = store.load().unwrap();

    assert_eq!(settings, Settings::default());
    assert!(store.path().exists());
    let content = fs::read_to_string(store.path()).unwrap();
    assert!(content.contains("\"format\": \"QR_CODE\""));
    assert!(content.contains("\"text\": \"www.codekraft.it\""));
}

#[test]
fn test_save_and_reload() {
    let (_temp_dir, store) = create_test_store();
    let settings = Settings {
        defaults: CodeOptions {
            text: "12345670".into(),
            format: Format::Ean8,
            size: 800,
            margin: 12,
            color: "#123456".parse().unwrap(),
            background: "#fafafa".parse().unwrap(),
            error_correction: ErrorCorrection::H,
        },
        output_dir: Some(PathBuf::from("exports")),
    };

    store.save(&settings).unwrap();
    let loaded = store.load().unwrap();

    assert_eq!(loaded, settings);
}

#[test]
fn test_partial_file_fills_defaults() {
    let (_temp_dir, store) = create_test_store();
    fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    fs::write(store.path(), r#"{ "defaults": { "margin": 4 } }"#).unwrap();

    let loaded = store.load().unwrap();

    assert_eq!(loaded.defaults.margin, 4);
    assert_eq!(loaded.defaults.size, 300);
    assert_eq!(loaded.output_dir, None);
}

#[test]
fn test_invalid_file_is_an_error() {
    let (_temp_dir, store) = create_test_store();
    fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    fs::write(store.path(), "{ not json").unwrap();

    let err = store.load().unwrap_err();

    assert!(err.to_string().contains("Failed to deserialize settings"));
    // The broken file is left for the user to fix
    assert_eq!(fs::read_to_string(store.path()).unwrap(), "{ not json");
}

#[test]
fn test_unreadable_file_is_not_overwritten() {
    let (_temp_dir, store) = create_test_store();
    fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    // Latin-1 e-acute, not valid UTF-8
    let bytes = b"{\"defaults\":{\"text\":\"caf\xe9\",\"size\":900}}".to_vec();
    fs::write(store.path(), &bytes).unwrap();

    let err = store.load().unwrap_err();

    assert!(err.to_string().contains("Failed to read settings file"));
    assert_eq!(fs::read(store.path()).unwrap(), bytes);
}

#[test]
fn test_directory_in_place_of_file_is_an_error() {
    let (_temp_dir, store) = create_test_store();
    fs::create_dir_all(store.path()).unwrap();

    assert!(store.load().is_err());
    assert!(store.path().is_dir());
}
