//! Tests for settings files and draft files on disk
//!
//! These tests verify:
//! - Settings survive a save/load cycle through a temp directory
//! - resolve() falls back to defaults and refuses invalid files
//! - Drafts written as JSON load back with defaults for missing fields

use std::fs;

use tempfile::TempDir;

use blueprint_composer::config_file::{Settings, DEFAULT_CONTENT_SOURCES_URL};
use blueprint_composer::types::{Distribution, ImageType};
use blueprint_composer::wizard::validation::validate_draft;
use blueprint_composer::wizard::BlueprintDraft;

// =============================================================================
// test_settings_files
// =============================================================================

#[test]
fn test_settings_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");

    let settings = Settings {
        image_builder_url: "http://localhost:8086/api/image-builder/v1".to_string(),
        per_page: 50,
        on_premise: true,
        ..Default::default()
    };
    settings.save_to_file(&path).unwrap();

    let loaded = Settings::load_from_file(&path).unwrap();
    assert_eq!(loaded, settings);
    assert_eq!(loaded.content_sources_url, DEFAULT_CONTENT_SOURCES_URL);
}

#[test]
fn test_resolve_without_file_uses_defaults() {
    let settings = Settings::resolve(None).unwrap();
    assert_eq!(settings.per_page, Settings::default().per_page);
    assert!(settings.validate().is_ok());
}

#[test]
fn test_resolve_rejects_out_of_range_page_size() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{"per_page": 500}"#).unwrap();

    let err = Settings::resolve(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("per_page"));
}

#[test]
fn test_resolve_missing_file_errors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.json");
    assert!(Settings::resolve(Some(&path)).is_err());
}

// =============================================================================
// test_draft_files
// =============================================================================

#[test]
fn test_partial_draft_file_loads_with_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("draft.json");
    fs::write(
        &path,
        r#"{"name": "minimal", "image_types": ["guest-image"]}"#,
    )
    .unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let draft: BlueprintDraft = serde_json::from_str(&content).unwrap();
    assert_eq!(draft.name, "minimal");
    assert_eq!(draft.image_types, vec![ImageType::GuestImage]);
    assert_eq!(draft.distribution, Distribution::Rhel9);
    assert!(validate_draft(&draft).is_ok());
}
