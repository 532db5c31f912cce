//! Risk classifier comparing budget consumption against elapsed time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use turbocash_domain::{calendar::days_between, Budget, RiskLevel, Transaction, UserData};

use super::period::{current_period_window, period_expenses, PeriodWindow};
use crate::time::Clock;

/// A budget projected to run out within this many days is critical.
pub const CRITICAL_RUNWAY_DAYS: i64 = 3;
/// Percentage points of overspend (budget used vs time elapsed) for `High`.
pub const HIGH_PACE_MARGIN: f64 = 20.0;
/// Percentage points of overspend (budget used vs time elapsed) for `Medium`.
pub const MEDIUM_PACE_MARGIN: f64 = 10.0;

const DRIFT_TOLERANCE: f64 = 0.005;

/// Outcome of classifying one budget against the transaction history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRiskAssessment {
    pub risk_level: RiskLevel,
    /// Whole days until `remaining` is gone at the current burn rate.
    pub days_to_run_out: Option<i64>,
    pub average_daily_spend: f64,
    /// Days left until the current period ends.
    pub remaining_days: i64,
    pub days_elapsed: i64,
    /// Matching expenses dated between the period start and today.
    pub total_spent_in_period: f64,
    /// `allocated - spent`, using the budget's running total.
    pub remaining: f64,
    /// `spent - total_spent_in_period`; non-zero when the running total
    /// covers a different window than the current period.
    pub spent_drift: f64,
    pub window: PeriodWindow,
}

/// Classifies `budget` given the full transaction history and the current date.
pub fn calculate_budget_risk(
    budget: &Budget,
    transactions: &[Transaction],
    today: NaiveDate,
) -> BudgetRiskAssessment {
    let window = current_period_window(budget, today);

    let total_spent_in_period = period_expenses(budget, transactions, &window, today);

    let days_elapsed = days_between(window.start, today).max(1);
    let average_daily_spend = total_spent_in_period / days_elapsed as f64;
    let remaining_days = days_between(today, window.end);
    let remaining = budget.remaining();

    let days_to_run_out = if average_daily_spend > 0.0 && remaining > 0.0 {
        Some((remaining / average_daily_spend).floor() as i64)
    } else {
        None
    };

    let percentage_used = if budget.allocated > 0.0 {
        budget.spent / budget.allocated * 100.0
    } else {
        100.0
    };
    let period_days = days_elapsed + remaining_days;
    let percentage_time_elapsed = if period_days > 0 {
        days_elapsed as f64 / period_days as f64 * 100.0
    } else {
        100.0
    };

    let risk_level = if remaining <= 0.0 {
        RiskLevel::Critical
    } else if days_to_run_out.is_some_and(|days| days <= CRITICAL_RUNWAY_DAYS) {
        RiskLevel::Critical
    } else if percentage_used > percentage_time_elapsed + HIGH_PACE_MARGIN {
        RiskLevel::High
    } else if percentage_used > percentage_time_elapsed + MEDIUM_PACE_MARGIN {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    BudgetRiskAssessment {
        risk_level,
        days_to_run_out,
        average_daily_spend,
        remaining_days,
        days_elapsed,
        total_spent_in_period,
        remaining,
        spent_drift: budget.spent - total_spent_in_period,
        window,
    }
}

pub fn calculate_budget_risk_level(
    budget: &Budget,
    transactions: &[Transaction],
    clock: &dyn Clock,
) -> BudgetRiskAssessment {
    calculate_budget_risk(budget, transactions, clock.today())
}

/// A budget paired with its assessment.
#[derive(Debug, Clone)]
pub struct BudgetRisk<'a> {
    pub budget: &'a Budget,
    pub assessment: BudgetRiskAssessment,
}

/// Assesses every budget of a user, most severe first, then by category.
pub fn assess_all(data: &UserData, today: NaiveDate) -> Vec<BudgetRisk<'_>> {
    let mut rows: Vec<BudgetRisk<'_>> = data
        .budgets
        .iter()
        .map(|budget| {
            let assessment = calculate_budget_risk(budget, &data.transactions, today);
            if assessment.spent_drift.abs() > DRIFT_TOLERANCE {
                tracing::warn!(
                    budget = %budget.id,
                    category = %budget.category,
                    spent = budget.spent,
                    period_total = assessment.total_spent_in_period,
                    "budget running total differs from current period spend"
                );
            }
            BudgetRisk { budget, assessment }
        })
        .collect();
    rows.sort_by(|a, b| {
        b.assessment
            .risk_level
            .cmp(&a.assessment.risk_level)
            .then_with(|| {
                a.budget
                    .category
                    .to_lowercase()
                    .cmp(&b.budget.category.to_lowercase())
            })
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use turbocash_domain::BudgetPeriod;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn monthly(allocated: f64, spent: f64, start: NaiveDate) -> Budget {
        Budget::new("Food & Dining", allocated, BudgetPeriod::Monthly, start).with_spent(spent)
    }

    #[test]
    fn exact_exhaustion_is_critical_without_runway() {
        let start = date(2025, 6, 1);
        let budget = monthly(600.0, 600.0, start);
        let txns = vec![Transaction::expense(date(2025, 6, 5), 600.0, "Food & Dining")];
        let result = calculate_budget_risk(&budget, &txns, date(2025, 6, 10));
        assert_eq!(result.remaining, 0.0);
        assert_eq!(result.risk_level, RiskLevel::Critical);
        assert_eq!(result.days_to_run_out, None);
    }

    #[test]
    fn on_pace_spending_is_low_risk() {
        // June has 30 days; the 15th sits at 14 elapsed / 16 remaining.
        let start = date(2025, 6, 1);
        let budget = monthly(600.0, 300.0, start);
        let txns = vec![
            Transaction::expense(date(2025, 6, 3), 140.0, "Food & Dining"),
            Transaction::expense(date(2025, 6, 12), 140.0, "food & dining"),
        ];
        let result = calculate_budget_risk(&budget, &txns, date(2025, 6, 15));
        assert_eq!(result.days_elapsed, 14);
        assert_eq!(result.remaining_days, 16);
        assert_eq!(result.total_spent_in_period, 280.0);
        assert_eq!(result.average_daily_spend, 20.0);
        assert_eq!(result.days_to_run_out, Some(15));
        assert_eq!(result.risk_level, RiskLevel::Low);
    }

    #[test]
    fn imminent_depletion_overrides_pace() {
        // Ten days elapsed at 10/day puts the burn rate at exactly 10.
        let start = date(2025, 6, 1);
        let budget = monthly(100.0, 80.0, start);
        let txns = vec![Transaction::expense(date(2025, 6, 2), 100.0, "Food & Dining")];
        let result = calculate_budget_risk(&budget, &txns, date(2025, 6, 11));
        assert_eq!(result.average_daily_spend, 10.0);
        assert_eq!(result.remaining, 20.0);
        assert_eq!(result.days_to_run_out, Some(2));
        assert_eq!(result.risk_level, RiskLevel::Critical);
    }

    #[test]
    fn pace_margins_select_high_and_medium() {
        let start = date(2025, 6, 1);
        let today = date(2025, 6, 16); // 15 elapsed of 30 => 50%
        let txns = vec![Transaction::expense(date(2025, 6, 2), 15.0, "Food & Dining")];

        let high = calculate_budget_risk(&monthly(1000.0, 710.0, start), &txns, today);
        assert_eq!(high.risk_level, RiskLevel::High);

        let medium = calculate_budget_risk(&monthly(1000.0, 610.0, start), &txns, today);
        assert_eq!(medium.risk_level, RiskLevel::Medium);

        let edge = calculate_budget_risk(&monthly(1000.0, 600.0, start), &txns, today);
        assert_eq!(edge.risk_level, RiskLevel::Low);
    }

    #[test]
    fn only_matching_expenses_up_to_today_count() {
        let start = date(2025, 6, 1);
        let budget = monthly(600.0, 0.0, start);
        let txns = vec![
            Transaction::expense(date(2025, 5, 31), 40.0, "Food & Dining"),
            Transaction::expense(date(2025, 6, 4), 20.0, "FOOD & DINING"),
            Transaction::income(date(2025, 6, 4), 500.0, "Food & Dining"),
            Transaction::expense(date(2025, 6, 4), 70.0, "Transportation"),
            Transaction::expense(date(2025, 6, 25), 90.0, "Food & Dining"),
        ];
        let result = calculate_budget_risk(&budget, &txns, date(2025, 6, 5));
        assert_eq!(result.total_spent_in_period, 20.0);
        assert_eq!(result.average_daily_spend, 5.0);
        assert_eq!(result.spent_drift, -20.0);
    }

    #[test]
    fn first_day_uses_a_divisor_of_one() {
        let start = date(2025, 6, 1);
        let budget = monthly(600.0, 30.0, start);
        let txns = vec![Transaction::expense(start, 30.0, "Food & Dining")];
        let result = calculate_budget_risk(&budget, &txns, start);
        assert_eq!(result.days_elapsed, 1);
        assert_eq!(result.average_daily_spend, 30.0);
        assert_eq!(result.days_to_run_out, Some(19));
    }

    #[test]
    fn no_spending_means_no_runway_projection() {
        let budget = monthly(600.0, 0.0, date(2025, 6, 1));
        let result = calculate_budget_risk(&budget, &[], date(2025, 6, 20));
        assert_eq!(result.average_daily_spend, 0.0);
        assert_eq!(result.days_to_run_out, None);
        assert_eq!(result.risk_level, RiskLevel::Low);
    }

    #[test]
    fn zero_allocation_is_critical() {
        let budget = monthly(0.0, 0.0, date(2025, 6, 1));
        let result = calculate_budget_risk(&budget, &[], date(2025, 6, 20));
        assert_eq!(result.risk_level, RiskLevel::Critical);
    }

    #[test]
    fn unrecognized_period_uses_degenerate_window() {
        let budget = Budget::new(
            "Food & Dining",
            600.0,
            BudgetPeriod::Unrecognized("daily".into()),
            date(2025, 1, 1),
        )
        .with_spent(100.0);
        let today = date(2025, 6, 20);
        let txns = vec![
            Transaction::expense(today, 25.0, "Food & Dining"),
            Transaction::expense(date(2025, 6, 19), 25.0, "Food & Dining"),
        ];
        let result = calculate_budget_risk(&budget, &txns, today);
        assert!(result.window.is_degenerate());
        assert_eq!(result.remaining_days, 0);
        assert_eq!(result.days_elapsed, 1);
        assert_eq!(result.total_spent_in_period, 25.0);
        assert_eq!(result.days_to_run_out, Some(20));
        assert_eq!(result.risk_level, RiskLevel::Low);
    }

    #[test]
    fn assess_all_orders_by_severity() {
        let start = date(2025, 6, 1);
        let mut data = UserData::default();
        data.budgets.push(Budget::new("Travel", 500.0, BudgetPeriod::Monthly, start));
        data.budgets.push(monthly(100.0, 100.0, start));
        data.budgets.push(Budget::new("Education", 500.0, BudgetPeriod::Monthly, start));

        let rows = assess_all(&data, date(2025, 6, 10));
        let order: Vec<&str> = rows.iter().map(|row| row.budget.category.as_str()).collect();
        assert_eq!(order, vec!["Food & Dining", "Education", "Travel"]);
        assert_eq!(rows[0].assessment.risk_level, RiskLevel::Critical);
    }
}
