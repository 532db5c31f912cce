//! Savings goals: contributions, progress and deadline tracking.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use turbocash_domain::{calendar::days_between, new_id, Goal, GoalStatus, UserData};

use super::owner_id;
use crate::{CoreError, CoreResult};

const AT_RISK_WINDOW_DAYS: i64 = 30;
const AT_RISK_PROGRESS: f64 = 80.0;
const ON_TRACK_PROGRESS: f64 = 75.0;

/// Aggregate figures across every goal of a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalOverview {
    pub total_target: f64,
    pub total_saved: f64,
    pub completed: usize,
    pub active: usize,
}

pub struct GoalService;

impl GoalService {
    /// Adds a goal with nothing saved yet, stamped with `created_at`.
    pub fn add(data: &mut UserData, mut goal: Goal, created_at: DateTime<Utc>) -> CoreResult<String> {
        goal.user_id = owner_id(data)?;
        if goal.id.trim().is_empty() {
            goal.id = new_id();
        }
        goal.current_amount = 0.0;
        goal.created_at = created_at;
        goal.validate()?;

        let id = goal.id.clone();
        tracing::info!(goal = %id, target = goal.target_amount, "goal added");
        data.goals.push(goal);
        Ok(id)
    }

    pub fn update<F>(data: &mut UserData, id: &str, mutator: F) -> CoreResult<()>
    where
        F: FnOnce(&mut Goal),
    {
        let goal = data
            .goal_mut(id)
            .ok_or_else(|| CoreError::not_found("goal", id))?;
        let mut candidate = goal.clone();
        mutator(&mut candidate);
        candidate.validate()?;
        candidate.id = goal.id.clone();
        *goal = candidate;
        tracing::info!(goal = %id, "goal updated");
        Ok(())
    }

    pub fn remove(data: &mut UserData, id: &str) -> CoreResult<Goal> {
        let index = data
            .goals
            .iter()
            .position(|goal| goal.id == id)
            .ok_or_else(|| CoreError::not_found("goal", id))?;
        let removed = data.goals.remove(index);
        tracing::info!(goal = %id, "goal removed");
        Ok(removed)
    }

    /// Adds a positive contribution and returns the new saved amount.
    pub fn contribute(data: &mut UserData, id: &str, amount: f64) -> CoreResult<f64> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(CoreError::InvalidOperation(
                "contribution must be a positive amount".into(),
            ));
        }
        let goal = data
            .goal_mut(id)
            .ok_or_else(|| CoreError::not_found("goal", id))?;
        goal.current_amount += amount;
        tracing::info!(goal = %id, amount, saved = goal.current_amount, "goal contribution recorded");
        Ok(goal.current_amount)
    }

    /// Saved share of the target, capped at 100.
    pub fn progress_percent(goal: &Goal) -> f64 {
        if goal.target_amount <= 0.0 {
            return 100.0;
        }
        (goal.current_amount / goal.target_amount * 100.0).min(100.0)
    }

    /// Days until the deadline; negative once it has passed.
    pub fn days_remaining(goal: &Goal, today: NaiveDate) -> i64 {
        days_between(today, goal.deadline)
    }

    pub fn status(goal: &Goal, today: NaiveDate) -> GoalStatus {
        let progress = Self::progress_percent(goal);
        let days = Self::days_remaining(goal, today);
        if progress >= 100.0 {
            GoalStatus::Completed
        } else if days < 0 {
            GoalStatus::Overdue
        } else if days <= AT_RISK_WINDOW_DAYS && progress < AT_RISK_PROGRESS {
            GoalStatus::AtRisk
        } else if progress >= ON_TRACK_PROGRESS {
            GoalStatus::OnTrack
        } else {
            GoalStatus::InProgress
        }
    }

    /// Amount to save per month to hit the deadline, rounded up.
    ///
    /// Fewer than thirty days left counts as a single month.
    pub fn monthly_target(goal: &Goal, today: NaiveDate) -> f64 {
        let months = (Self::days_remaining(goal, today) as f64 / 30.0).max(1.0);
        (goal.remaining_amount() / months).ceil()
    }

    pub fn overview(data: &UserData) -> GoalOverview {
        let completed = data.goals.iter().filter(|goal| goal.is_completed()).count();
        GoalOverview {
            total_target: data.goals.iter().map(|goal| goal.target_amount).sum(),
            total_saved: data.goals.iter().map(|goal| goal.current_amount).sum(),
            completed,
            active: data.goals.len() - completed,
        }
    }
}
