use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard},
};

use chrono::NaiveDate;
use serde_json::Value;
use turbocash_domain::{dates::DATE_FORMAT, UserData};

use crate::{services::UserService, CoreError, CoreResult};

/// Abstraction over persistence backends holding one document per user.
pub trait UserStore: Send + Sync {
    fn load(&self, user_id: &str) -> CoreResult<Option<UserData>>;
    fn save(&self, user_id: &str, data: &UserData) -> CoreResult<()>;
    /// Returns `true` when a document existed.
    fn delete(&self, user_id: &str) -> CoreResult<bool>;
    fn list_users(&self) -> CoreResult<Vec<String>>;
}

/// Volatile store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    documents: Mutex<BTreeMap<String, UserData>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn documents(&self) -> CoreResult<MutexGuard<'_, BTreeMap<String, UserData>>> {
        self.documents
            .lock()
            .map_err(|_| CoreError::Storage("memory store lock poisoned".into()))
    }
}

impl UserStore for MemoryUserStore {
    fn load(&self, user_id: &str) -> CoreResult<Option<UserData>> {
        Ok(self.documents()?.get(user_id).cloned())
    }

    fn save(&self, user_id: &str, data: &UserData) -> CoreResult<()> {
        self.documents()?.insert(user_id.to_string(), data.clone());
        tracing::debug!(user = %user_id, "user document stored in memory");
        Ok(())
    }

    fn delete(&self, user_id: &str) -> CoreResult<bool> {
        Ok(self.documents()?.remove(user_id).is_some())
    }

    fn list_users(&self) -> CoreResult<Vec<String>> {
        Ok(self.documents()?.keys().cloned().collect())
    }
}

/// Result of reading a persisted document, with any repairs applied on load.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub data: UserData,
    pub migrations: Vec<String>,
}

/// Parses a stored user document, upgrading older layouts first.
///
/// Malformed dates and amounts are rejected here, before any analytics run.
pub fn load_document(json: &str, today: NaiveDate) -> CoreResult<LoadedDocument> {
    let mut value: Value = serde_json::from_str(json)?;
    let mut migrations = migrate_legacy_document(&mut value, today);
    let mut data: UserData = serde_json::from_value(value)?;
    migrations.extend(UserService::migrate(&mut data));
    validate_document(&data)?;
    Ok(LoadedDocument { data, migrations })
}

/// Applies the record-level checks to every entry of a decoded document.
pub fn validate_document(data: &UserData) -> CoreResult<()> {
    for budget in &data.budgets {
        budget.validate()?;
    }
    for transaction in &data.transactions {
        transaction.validate()?;
    }
    for goal in &data.goals {
        goal.validate()?;
    }
    for subscription in &data.subscriptions {
        subscription.validate()?;
    }
    Ok(())
}

/// Fills fields that older documents never stored.
///
/// Budgets without a start date start `today`; subscriptions without a renewal
/// date renew on their purchase date; profiles and goals without a creation
/// timestamp are stamped with midnight UTC of `today`.
pub fn migrate_legacy_document(value: &mut Value, today: NaiveDate) -> Vec<String> {
    let mut notes = Vec::new();
    let Some(root) = value.as_object_mut() else {
        return notes;
    };
    let today_text = today.format(DATE_FORMAT).to_string();
    let midnight = format!("{today_text}T00:00:00Z");

    if let Some(user) = root.get_mut("user").and_then(Value::as_object_mut) {
        if !user.contains_key("createdAt") {
            user.insert("createdAt".into(), Value::String(midnight.clone()));
            notes.push("stamped profile creation time".to_string());
        }
    }

    let mut filled = 0usize;
    for budget in entries_mut(root, "budgets") {
        if is_missing(budget.get("startDate")) {
            budget.insert("startDate".into(), Value::String(today_text.clone()));
            filled += 1;
        }
    }
    if filled > 0 {
        notes.push(format!("set start date of {filled} budgets to {today_text}"));
    }

    let mut filled = 0usize;
    for subscription in entries_mut(root, "subscriptions") {
        if is_missing(subscription.get("nextRenewal")) {
            if let Some(purchase) = subscription.get("purchaseDate").cloned() {
                subscription.insert("nextRenewal".into(), purchase);
                filled += 1;
            }
        }
    }
    if filled > 0 {
        notes.push(format!("set renewal date of {filled} subscriptions"));
    }

    let mut filled = 0usize;
    for goal in entries_mut(root, "goals") {
        if is_missing(goal.get("createdAt")) {
            goal.insert("createdAt".into(), Value::String(midnight.clone()));
            filled += 1;
        }
    }
    if filled > 0 {
        notes.push(format!("stamped creation time of {filled} goals"));
    }

    for note in &notes {
        tracing::info!(note = %note, "legacy document upgraded");
    }
    notes
}

fn entries_mut<'a>(
    root: &'a mut serde_json::Map<String, Value>,
    key: &str,
) -> impl Iterator<Item = &'a mut serde_json::Map<String, Value>> {
    root.get_mut(key)
        .and_then(Value::as_array_mut)
        .into_iter()
        .flat_map(|items| items.iter_mut())
        .filter_map(Value::as_object_mut)
}

fn is_missing(field: Option<&Value>) -> bool {
    matches!(field, None | Some(Value::Null))
}
