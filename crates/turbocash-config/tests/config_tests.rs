use std::fs;

use tempfile::tempdir;
use turbocash_config::{Config, ConfigError, ConfigManager};

fn manager_in(dir: &tempfile::TempDir) -> ConfigManager {
    ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager")
}

#[test]
fn default_config_matches_documented_values() {
    let cfg = Config::default();

    assert_eq!(cfg.currency, "INR");
    assert!(cfg.ui_color_enabled);
    assert_eq!(cfg.default_budget_period, "monthly");
    assert_eq!(cfg.renewal_warning_days, 7);
    assert_eq!(cfg.backup_retention, 5);
    assert!(cfg.resolve_data_root().ends_with(".turbocash"));
    assert!(cfg.validate().is_ok());
}

#[test]
fn saved_config_loads_back() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"), dir.path().join("backups"));

    let mut cfg = Config::default();
    cfg.currency = "USD".to_string();
    cfg.last_user = Some("demo_user".to_string());
    cfg.data_root = Some(dir.path().join("data"));

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded, cfg);
    assert_eq!(loaded.resolve_data_root(), dir.path().join("data"));
    assert!(!dir.path().join("config.json.tmp").exists());
}

#[test]
fn missing_file_and_fields_fall_back_to_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = manager_in(&dir);
    assert_eq!(manager.load().expect("defaults"), Config::default());

    fs::write(
        manager.config_path(),
        r#"{ "currency": "EUR", "locale": "en-US", "theme": "plain" }"#,
    )
    .unwrap();
    let loaded = manager.load().expect("partial config");
    assert_eq!(loaded.currency, "EUR");
    assert_eq!(loaded.default_budget_period, "monthly");
    assert_eq!(loaded.backup_retention, 5);
}

#[test]
fn malformed_or_invalid_files_are_rejected() {
    let dir = tempdir().expect("tempdir");
    let manager = manager_in(&dir);

    fs::write(manager.config_path(), "{ nope").unwrap();
    assert!(matches!(manager.load(), Err(ConfigError::Serde(_))));

    fs::write(manager.config_path(), r#"{ "backup_retention": 0 }"#).unwrap();
    assert!(matches!(
        manager.load(),
        Err(ConfigError::InvalidValue { key: "backup_retention", .. })
    ));
}

#[test]
fn update_snapshots_the_previous_file() {
    let dir = tempdir().expect("tempdir");
    let manager = manager_in(&dir);
    manager.save(&Config::default()).unwrap();

    let updated = manager
        .update(|cfg| cfg.set("renewal_warning_days", "14"))
        .expect("update");
    assert_eq!(updated.renewal_warning_days, 14);
    assert_eq!(manager.load().unwrap().renewal_warning_days, 14);

    let backups = manager.list_backups().expect("list");
    assert_eq!(backups.len(), 1);
    assert!(backups[0].name.ends_with("_before-update.json"));
    assert!(backups[0].created_at.is_some());

    let restored = manager.restore(&backups[0].name).expect("restore");
    assert_eq!(restored.renewal_warning_days, 7);
    assert_eq!(manager.load().unwrap().renewal_warning_days, 7);
}

#[test]
fn rejected_update_writes_nothing() {
    let dir = tempdir().expect("tempdir");
    let manager = manager_in(&dir);

    let err = manager
        .update(|cfg| cfg.set("currency", "rupees"))
        .expect_err("invalid currency");
    assert!(matches!(err, ConfigError::InvalidValue { key: "currency", .. }));
    assert!(!manager.config_path().exists());
    assert!(manager.list_backups().unwrap().is_empty());
}

#[test]
fn unknown_backups_are_reported() {
    let dir = tempdir().expect("tempdir");
    let manager = manager_in(&dir);
    assert!(matches!(
        manager.restore("config_missing.json"),
        Err(ConfigError::BackupNotFound(_))
    ));
    assert!(matches!(
        manager.restore("../config.json"),
        Err(ConfigError::BackupNotFound(_))
    ));
}
