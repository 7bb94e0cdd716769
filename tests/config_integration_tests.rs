//! Integration tests for the build config document
//!
//! These tests verify:
//! - Creation on first merge and preservation of unknown keys
//! - Soft handling of malformed documents
//! - The webDir normalization pass
//! - Merge invariants over generated documents (proptest)

use proptest::prelude::*;
use serde_json::{Value, json};
use std::fs;
use web2apk::models::config::REQUIRED_KEYS;
use web2apk::{AppIdentity, BuildConfig, ConfigManager, ProjectLayout};

mod common;

#[test]
fn test_first_merge_creates_document() {
    let (_tmp, layout) = common::temp_project();
    let manager = ConfigManager::new(&layout);
    assert!(manager.load().unwrap().is_none());

    manager.merge_and_save(&AppIdentity::new("com.example.webapp", "example-com"));

    let raw = fs::read_to_string(layout.config_file()).unwrap();
    assert!(raw.starts_with("{\n  \"appId\""), "two-space pretty JSON expected:\n{raw}");

    let config = manager.load().unwrap().unwrap();
    for key in REQUIRED_KEYS {
        assert!(config.contains_key(key), "missing {key}");
    }
    assert_eq!(
        config.get("android"),
        Some(&json!({ "allowMixedContent": true, "webContentsDebuggingEnabled": true }))
    );
}

#[test]
fn test_merge_preserves_existing_document() {
    let (_tmp, layout) = common::temp_project();
    fs::write(
        layout.config_file(),
        r#"{
  "appId": "com.old.id",
  "server": { "androidScheme": "https" },
  "ios": { "minVersion": "15.0" },
  "plugins": { "SplashScreen": { "launchShowDuration": 0 } }
}"#,
    )
    .unwrap();

    let manager = ConfigManager::new(&layout);
    manager.merge_and_save(&AppIdentity::new("com.new.id", "new-app"));
    let config = manager.load().unwrap().unwrap();

    assert_eq!(config.app_id(), Some("com.new.id"));
    assert_eq!(config.get("server"), Some(&json!({ "androidScheme": "https" })));
    assert_eq!(config.get("ios"), Some(&json!({ "minVersion": "15.0" })));
    assert!(config.contains_key("plugins"));

    // Existing keys keep their position
    let keys: Vec<&str> = config.keys().collect();
    assert_eq!(&keys[..4], &["appId", "server", "ios", "plugins"]);
}

#[test]
fn test_malformed_document_is_replaced() {
    let (_tmp, layout) = common::temp_project();
    fs::write(layout.config_file(), "{ not json").unwrap();

    let manager = ConfigManager::new(&layout);
    assert!(manager.load().is_err());

    let merged = manager.merge_and_save(&AppIdentity::new("com.example.webapp", "site"));

    assert_eq!(merged.app_name(), Some("site"));
    assert_eq!(manager.load().unwrap().unwrap(), merged);
}

#[test]
fn test_write_failure_still_returns_merged_document() {
    let (_tmp, layout) = common::temp_project();
    // A directory where the file should be makes the write fail
    fs::create_dir(layout.config_file()).unwrap();

    let manager = ConfigManager::new(&layout);
    let merged = manager.merge_and_save(&AppIdentity::new("com.example.webapp", "site"));

    assert_eq!(merged.app_id(), Some("com.example.webapp"));
    assert!(layout.config_file().is_dir());
}

#[test]
fn test_normalize_overrides_initializer_web_dir() {
    let (_tmp, layout) = common::temp_project();
    fs::write(
        layout.config_file(),
        r#"{ "appId": "a.b", "appName": "x", "webDir": "www", "custom": 1 }"#,
    )
    .unwrap();

    let manager = ConfigManager::new(&layout);
    assert!(manager.normalize_web_dir());

    let config = manager.load().unwrap().unwrap();
    assert_eq!(config.web_dir(), Some("public"));
    assert_eq!(config.get("custom"), Some(&json!(1)));
}

#[test]
fn test_normalize_without_document_is_soft() {
    let (_tmp, layout) = common::temp_project();
    let manager = ConfigManager::new(&layout);

    assert!(!manager.normalize_web_dir());
    assert!(!layout.config_file().exists());
}

fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z0-9 ]{0,12}".prop_map(Value::String),
    ]
}

fn existing_document() -> impl Strategy<Value = BuildConfig> {
    // Keys that never collide with the required ones
    proptest::collection::vec(("x_[a-z]{1,8}", json_leaf()), 0..8).prop_map(|entries| {
        let mut config = BuildConfig::new();
        for (key, value) in entries {
            config.set(key, value);
        }
        config
    })
}

proptest! {
    #[test]
    fn prop_merge_keeps_required_and_unrelated_keys(
        existing in existing_document(),
        app_id in "[a-z]{2,6}\\.[a-z]{2,6}\\.[a-z]{2,6}",
        app_name in "[a-z][a-z0-9-]{0,15}",
    ) {
        let identity = AppIdentity::new(app_id.clone(), app_name.clone());
        let merged = web2apk::models::merge_config(Some(existing.clone()), &identity);

        for key in REQUIRED_KEYS {
            prop_assert!(merged.contains_key(key));
        }
        for key in existing.keys() {
            prop_assert_eq!(merged.get(key), existing.get(key));
        }
        prop_assert_eq!(merged.app_id(), Some(app_id.as_str()));
        prop_assert_eq!(merged.app_name(), Some(app_name.as_str()));
    }

    #[test]
    fn prop_merge_is_idempotent(
        existing in existing_document(),
        app_name in "[a-z][a-z0-9-]{0,15}",
    ) {
        let identity = AppIdentity::new("com.example.webapp", app_name);
        let once = web2apk::models::merge_config(Some(existing), &identity);
        let twice = web2apk::models::merge_config(Some(once.clone()), &identity);

        prop_assert_eq!(once, twice);
    }
}

#[test]
fn test_layout_config_path_matches_manager() {
    let layout = ProjectLayout::new("/work/site");
    assert_eq!(ConfigManager::new(&layout).config_path(), layout.config_file().as_path());
}
