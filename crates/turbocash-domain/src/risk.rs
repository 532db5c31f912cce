//! Risk tiers assigned to budgets and their display mapping.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse likelihood that a budget is exceeded before its period ends.
///
/// Ordered by severity, so `RiskLevel::Critical` sorts last.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Maps a stored label back to a tier; anything unknown reads as `Low`.
    pub fn from_label(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "critical" => RiskLevel::Critical,
            "high" => RiskLevel::High,
            "medium" => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    /// Display color token used by budget surfaces.
    pub fn color_token(self) -> &'static str {
        match self {
            RiskLevel::Critical => "red",
            RiskLevel::High => "orange",
            RiskLevel::Medium => "yellow",
            RiskLevel::Low => "green",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Critical => "Critical Risk",
            RiskLevel::High => "High Risk",
            RiskLevel::Medium => "Medium Risk",
            RiskLevel::Low => "Low Risk",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
