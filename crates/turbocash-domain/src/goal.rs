//! Savings goals and their progress classification.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::common::*;
use crate::dates::iso_date;
use crate::error::ValidationError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub target_amount: f64,
    #[serde(default)]
    pub current_amount: f64,
    #[serde(with = "iso_date")]
    pub deadline: NaiveDate,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub priority: GoalPriority,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub user_id: String,
}

impl Goal {
    pub fn new(
        name: impl Into<String>,
        target_amount: f64,
        deadline: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            description: String::new(),
            target_amount,
            current_amount: 0.0,
            deadline,
            category: String::new(),
            priority: GoalPriority::default(),
            created_at,
            user_id: String::new(),
        }
    }

    pub fn with_priority(mut self, priority: GoalPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Amount still missing to reach the target; never negative.
    pub fn remaining_amount(&self) -> f64 {
        (self.target_amount - self.current_amount).max(0.0)
    }

    pub fn is_completed(&self) -> bool {
        self.current_amount >= self.target_amount
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_not_blank("name", &self.name)?;
        ensure_positive("targetAmount", self.target_amount)?;
        ensure_non_negative("currentAmount", self.current_amount)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GoalPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl fmt::Display for GoalPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GoalPriority::High => "High",
            GoalPriority::Medium => "Medium",
            GoalPriority::Low => "Low",
        };
        f.write_str(label)
    }
}

/// Progress bucket of a goal relative to its deadline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum GoalStatus {
    Completed,
    Overdue,
    AtRisk,
    OnTrack,
    InProgress,
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GoalStatus::Completed => "Completed",
            GoalStatus::Overdue => "Overdue",
            GoalStatus::AtRisk => "At Risk",
            GoalStatus::OnTrack => "On Track",
            GoalStatus::InProgress => "In Progress",
        };
        f.write_str(label)
    }
}
