//! Spending ceilings that recur on a weekly, monthly or yearly cadence.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::common::*;
use crate::dates::iso_date;
use crate::error::ValidationError;

/// A spending guardrail for one category.
///
/// `spent` is a running total maintained by the transaction service. The
/// analytics recompute period spend from transaction history on their own and
/// never write back to this field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    pub category: String,
    pub allocated: f64,
    #[serde(default)]
    pub spent: f64,
    pub period: BudgetPeriod,
    #[serde(with = "iso_date")]
    pub start_date: NaiveDate,
    #[serde(default)]
    pub user_id: String,
}

impl Budget {
    pub fn new(
        category: impl Into<String>,
        allocated: f64,
        period: BudgetPeriod,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: new_id(),
            category: category.into(),
            allocated,
            spent: 0.0,
            period,
            start_date,
            user_id: String::new(),
        }
    }

    pub fn with_spent(mut self, spent: f64) -> Self {
        self.spent = spent;
        self
    }

    /// `allocated - spent`; zero or negative once the budget is exhausted.
    pub fn remaining(&self) -> f64 {
        self.allocated - self.spent
    }

    /// Returns `true` when a transaction category belongs to this budget.
    pub fn matches_category(&self, category: &str) -> bool {
        same_category(&self.category, category)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_not_blank("category", &self.category)?;
        ensure_non_negative("allocated", self.allocated)?;
        ensure_non_negative("spent", self.spent)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_documents_with_timestamp_start_dates() {
        let json = r#"{
            "id": "1712345678901",
            "category": "Food & Dining",
            "allocated": 600,
            "spent": 150.5,
            "period": "monthly",
            "startDate": "2024-03-01T08:15:00.000Z",
            "userId": "demo_user"
        }"#;
        let budget: Budget = serde_json::from_str(json).unwrap();
        assert_eq!(budget.start_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(budget.period, BudgetPeriod::Monthly);
        assert_eq!(budget.remaining(), 449.5);
    }

    #[test]
    fn rejects_unparseable_start_dates() {
        let json = r#"{"id":"1","category":"Food","allocated":10,"period":"weekly","startDate":"soon"}"#;
        assert!(serde_json::from_str::<Budget>(json).is_err());
    }

    #[test]
    fn validation_flags_negative_allocations() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let budget = Budget::new("Food", -1.0, BudgetPeriod::Monthly, start);
        assert_eq!(
            budget.validate(),
            Err(ValidationError::Negative { field: "allocated" })
        );
        let zero = Budget::new("Food", 0.0, BudgetPeriod::Monthly, start);
        assert!(zero.validate().is_ok());
    }
}
