//! Profile and category management for a user document.

use turbocash_domain::{same_category, UserData, UserProfile, DEFAULT_CURRENCY};

use crate::{CoreError, CoreResult};

pub struct UserService;

impl UserService {
    /// Fresh document for `profile` with the default categories and currency.
    pub fn new_user_data(mut profile: UserProfile) -> UserData {
        if profile.currency.is_none() {
            profile.currency = Some(DEFAULT_CURRENCY.to_string());
        }
        tracing::info!(user = %profile.id, "user document created");
        UserData::for_user(profile)
    }

    /// Applies `mutator` to the profile. The id cannot be changed.
    pub fn update_profile<F>(data: &mut UserData, mutator: F) -> CoreResult<()>
    where
        F: FnOnce(&mut UserProfile),
    {
        let profile = data.user.as_mut().ok_or(CoreError::NoActiveUser)?;
        let id = profile.id.clone();
        mutator(&mut *profile);
        if profile.id != id {
            profile.id = id;
            return Err(CoreError::InvalidOperation(
                "profile id cannot be changed".into(),
            ));
        }
        tracing::info!(user = %profile.id, "profile updated");
        Ok(())
    }

    /// Normalizes an older document in place and describes each repair.
    ///
    /// Empty category lists get the defaults, a missing currency becomes `INR`,
    /// and records without an owner are attributed to the profile.
    pub fn migrate(data: &mut UserData) -> Vec<String> {
        let mut notes = Vec::new();
        if data.categories.is_empty() {
            data.categories = UserData::default_categories();
            notes.push("restored default categories".to_string());
        }
        if let Some(profile) = data.user.as_mut() {
            if profile.currency.is_none() {
                profile.currency = Some(DEFAULT_CURRENCY.to_string());
                notes.push(format!("set currency to {DEFAULT_CURRENCY}"));
            }
        }
        if let Some(owner) = data.user_id().map(str::to_string) {
            let mut claimed = 0usize;
            let mut claim = |user_id: &mut String| {
                if user_id.is_empty() {
                    *user_id = owner.clone();
                    claimed += 1;
                }
            };
            data.transactions.iter_mut().for_each(|txn| claim(&mut txn.user_id));
            data.budgets.iter_mut().for_each(|budget| claim(&mut budget.user_id));
            data.goals.iter_mut().for_each(|goal| claim(&mut goal.user_id));
            data.subscriptions
                .iter_mut()
                .for_each(|subscription| claim(&mut subscription.user_id));
            if claimed > 0 {
                notes.push(format!("assigned {claimed} records to user {owner}"));
            }
        }
        for note in &notes {
            tracing::debug!(note = %note, "user document migrated");
        }
        notes
    }

    /// Adds a category unless one with the same name (ignoring case) exists.
    pub fn add_category(data: &mut UserData, name: &str) -> CoreResult<()> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidOperation(
                "category name cannot be empty".into(),
            ));
        }
        if data
            .categories
            .iter()
            .any(|existing| same_category(existing, trimmed))
        {
            return Err(CoreError::InvalidOperation(format!(
                "category `{trimmed}` already exists"
            )));
        }
        data.categories.push(trimmed.to_string());
        tracing::info!(category = %trimmed, "category added");
        Ok(())
    }
}
