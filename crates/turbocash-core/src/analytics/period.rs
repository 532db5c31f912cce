//! Period boundary calculator shared by every budget-facing computation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use turbocash_domain::{
    calendar::{add_period, days_between},
    Budget, BudgetPeriod, Transaction,
};

use crate::time::Clock;

/// Half-open `[start, end)` range covering one budget recurrence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodWindow {
    /// Zero-length window used when the period cannot be stepped.
    pub fn degenerate(today: NaiveDate) -> Self {
        Self {
            start: today,
            end: today,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    pub fn length_days(&self) -> i64 {
        days_between(self.start, self.end)
    }
}

/// Locates the recurrence of `period`, anchored at `anchor`, that contains `today`.
///
/// The start advances one period at a time while the following boundary is on
/// or before `today`, so landing exactly on a boundary opens the next window.
/// An anchor in the future is left untouched.
pub fn period_window_containing(
    anchor: NaiveDate,
    period: &BudgetPeriod,
    today: NaiveDate,
) -> PeriodWindow {
    let Some(mut end) = add_period(anchor, period) else {
        return PeriodWindow::degenerate(today);
    };
    let mut start = anchor;
    while end <= today {
        match add_period(end, period) {
            Some(next) => {
                start = end;
                end = next;
            }
            None => break,
        }
    }
    PeriodWindow { start, end }
}

/// Current recurrence window of `budget` relative to `today`.
pub fn current_period_window(budget: &Budget, today: NaiveDate) -> PeriodWindow {
    period_window_containing(budget.start_date, &budget.period, today)
}

/// Days from `today` until the next period of `budget` begins.
///
/// Budgets with an unrecognized period report zero.
pub fn days_to_next_budget_period(budget: &Budget, today: NaiveDate) -> i64 {
    let window = current_period_window(budget, today);
    days_between(today, window.end)
}

/// Sum of the expenses matching `budget` dated from `window.start` through `today`.
pub fn period_expenses(
    budget: &Budget,
    transactions: &[Transaction],
    window: &PeriodWindow,
    today: NaiveDate,
) -> f64 {
    transactions
        .iter()
        .filter(|txn| {
            txn.is_expense()
                && budget.matches_category(&txn.category)
                && txn.date >= window.start
                && txn.date <= today
        })
        .map(|txn| txn.amount)
        .sum()
}

pub fn calculate_days_to_next_budget_period(budget: &Budget, clock: &dyn Clock) -> i64 {
    days_to_next_budget_period(budget, clock.today())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn budget(period: BudgetPeriod, start: NaiveDate) -> Budget {
        Budget::new("Food & Dining", 600.0, period, start)
    }

    #[test]
    fn period_expenses_cover_window_start_through_today() {
        let food = budget(BudgetPeriod::Monthly, date(2025, 5, 1));
        let window = current_period_window(&food, date(2025, 6, 11));
        let transactions = vec![
            Transaction::expense(date(2025, 5, 31), 40.0, "Food & Dining"),
            Transaction::expense(date(2025, 6, 1), 10.0, "food & dining"),
            Transaction::expense(date(2025, 6, 11), 15.0, "Food & Dining"),
            Transaction::expense(date(2025, 6, 12), 99.0, "Food & Dining"),
            Transaction::income(date(2025, 6, 5), 500.0, "Food & Dining"),
            Transaction::expense(date(2025, 6, 5), 7.0, "Travel"),
        ];
        assert_eq!(period_expenses(&food, &transactions, &window, date(2025, 6, 11)), 25.0);
    }

    #[test]
    fn weekly_boundary_equality_advances_one_week() {
        // 2025-06-02 is a Monday.
        let monday = date(2025, 6, 2);
        let weekly = budget(BudgetPeriod::Weekly, monday);

        let window = current_period_window(&weekly, date(2025, 6, 9));
        assert_eq!(window.start, date(2025, 6, 9));
        assert_eq!(window.end, date(2025, 6, 16));
        assert_eq!(days_to_next_budget_period(&weekly, date(2025, 6, 9)), 7);

        let sunday = current_period_window(&weekly, date(2025, 6, 8));
        assert_eq!(sunday.start, monday);
        assert_eq!(days_to_next_budget_period(&weekly, date(2025, 6, 8)), 1);
    }

    #[test]
    fn monthly_windows_follow_rolled_over_anchor() {
        let monthly = budget(BudgetPeriod::Monthly, date(2025, 1, 31));

        let window = current_period_window(&monthly, date(2025, 2, 20));
        assert_eq!(window, PeriodWindow { start: date(2025, 1, 31), end: date(2025, 3, 3) });

        let window = current_period_window(&monthly, date(2025, 3, 10));
        assert_eq!(window, PeriodWindow { start: date(2025, 3, 3), end: date(2025, 4, 3) });
    }

    #[test]
    fn yearly_windows_step_calendar_years() {
        let yearly = budget(BudgetPeriod::Yearly, date(2023, 4, 15));
        let window = current_period_window(&yearly, date(2025, 4, 14));
        assert_eq!(window.start, date(2024, 4, 15));
        assert_eq!(window.end, date(2025, 4, 15));
        assert_eq!(days_to_next_budget_period(&yearly, date(2025, 4, 14)), 1);
    }

    #[test]
    fn future_start_keeps_anchor_window() {
        let monthly = budget(BudgetPeriod::Monthly, date(2025, 8, 1));
        let today = date(2025, 7, 20);
        let window = current_period_window(&monthly, today);
        assert_eq!(window.start, date(2025, 8, 1));
        assert_eq!(window.end, date(2025, 9, 1));
        assert_eq!(days_to_next_budget_period(&monthly, today), 43);
    }

    #[test]
    fn unrecognized_period_is_degenerate() {
        let odd = budget(BudgetPeriod::Unrecognized("daily".into()), date(2025, 1, 1));
        let today = date(2025, 5, 5);
        let window = current_period_window(&odd, today);
        assert!(window.is_degenerate());
        assert_eq!(window.start, today);
        assert_eq!(days_to_next_budget_period(&odd, today), 0);
    }

    #[test]
    fn remaining_days_count_down_and_reset_at_boundary() {
        let monthly = budget(BudgetPeriod::Monthly, date(2025, 1, 1));
        let mut today = date(2025, 1, 1);
        let mut previous = days_to_next_budget_period(&monthly, today);
        assert_eq!(previous, 31);
        for _ in 0..120 {
            today = today.succ_opt().unwrap();
            let current = days_to_next_budget_period(&monthly, today);
            let window = current_period_window(&monthly, today);
            if window.start == today {
                assert_eq!(current, window.length_days());
            } else {
                assert_eq!(current, previous - 1);
            }
            assert!(current >= 1);
            previous = current;
        }
    }
}
