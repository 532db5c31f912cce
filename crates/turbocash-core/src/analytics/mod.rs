//! Budget risk analytics: period boundaries, burn rate and risk tiers.
//!
//! Every function here is pure and recomputes from its inputs on each call.

pub mod period;
pub mod risk;

pub use period::{
    calculate_days_to_next_budget_period, current_period_window, days_to_next_budget_period,
    period_expenses, period_window_containing, PeriodWindow,
};
pub use risk::{
    assess_all, calculate_budget_risk, calculate_budget_risk_level, BudgetRisk,
    BudgetRiskAssessment,
};
