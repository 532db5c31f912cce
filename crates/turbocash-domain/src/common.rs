//! Identifiers, enums and validation helpers shared by the budgeting primitives.

use std::fmt;

use serde::{de::Deserializer, Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::error::ValidationError;

/// Generates a fresh identifier for newly created records.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Compares two category labels the way budgets match transactions.
pub fn same_category(left: &str, right: &str) -> bool {
    left.to_lowercase() == right.to_lowercase()
}

/// Enumerates the recurrence cadence of a budget.
///
/// Values other than `weekly`, `monthly` and `yearly` are kept verbatim in
/// [`BudgetPeriod::Unrecognized`] so that documents written by older clients
/// still load; the period arithmetic treats them as a degenerate window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum BudgetPeriod {
    Weekly,
    #[default]
    Monthly,
    Yearly,
    Unrecognized(String),
}

impl BudgetPeriod {
    pub fn from_value(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "weekly" => BudgetPeriod::Weekly,
            "monthly" => BudgetPeriod::Monthly,
            "yearly" => BudgetPeriod::Yearly,
            _ => BudgetPeriod::Unrecognized(value.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BudgetPeriod::Weekly => "weekly",
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Yearly => "yearly",
            BudgetPeriod::Unrecognized(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, BudgetPeriod::Unrecognized(_))
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BudgetPeriod::Weekly => "Weekly",
            BudgetPeriod::Monthly => "Monthly",
            BudgetPeriod::Yearly => "Yearly",
            BudgetPeriod::Unrecognized(raw) => return write!(f, "Unrecognized({raw})"),
        };
        f.write_str(label)
    }
}

impl Serialize for BudgetPeriod {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BudgetPeriod {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(BudgetPeriod::from_value(&value))
    }
}

/// Rejects amounts that are NaN or infinite.
pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NotFinite { field })
    }
}

pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    ensure_finite(field, value)?;
    if value < 0.0 {
        Err(ValidationError::Negative { field })
    } else {
        Ok(())
    }
}

pub(crate) fn ensure_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    ensure_finite(field, value)?;
    if value <= 0.0 {
        Err(ValidationError::NotPositive { field })
    } else {
        Ok(())
    }
}

pub(crate) fn ensure_not_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Empty { field })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_period_round_trips_known_and_unknown_values() {
        let known: BudgetPeriod = serde_json::from_str("\"weekly\"").unwrap();
        assert_eq!(known, BudgetPeriod::Weekly);

        let unknown: BudgetPeriod = serde_json::from_str("\"fortnightly\"").unwrap();
        assert_eq!(unknown, BudgetPeriod::Unrecognized("fortnightly".into()));
        assert_eq!(serde_json::to_string(&unknown).unwrap(), "\"fortnightly\"");
    }

    #[test]
    fn categories_match_ignoring_case() {
        assert!(same_category("Food & Dining", "food & dining"));
        assert!(!same_category("Food", "Food & Dining"));
    }
}
