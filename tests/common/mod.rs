#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use chrono::{NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use tempfile::TempDir;
use turbocash::{turbocash_core::FixedClock, turbocash_domain::UserProfile, UserSession};
use turbocash_storage_json::{JsonUserStore, StoragePaths};

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates an isolated base directory, usable as `TURBOCASH_HOME`.
pub fn setup_test_env() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// A user id that cannot collide with other tests.
pub fn unique_user() -> String {
    format!("user-{}", uuid::Uuid::new_v4())
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// JSON store laid out the way the CLI resolves it under `base`.
pub fn store_under(base: &Path, today: NaiveDate) -> JsonUserStore {
    JsonUserStore::new(StoragePaths::under(base))
        .expect("create json store")
        .with_clock(Arc::new(FixedClock::on(today)))
}

/// Creates and stores a fresh user session on `today`.
pub fn new_session(base: &Path, user_id: &str, today: NaiveDate) -> UserSession {
    let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let profile = UserProfile::new(user_id, "demo@turbocash.app", created).with_name("Demo", "User");
    UserSession::create(
        Box::new(store_under(base, today)),
        Arc::new(FixedClock::on(today)),
        profile,
    )
    .expect("create session")
}
