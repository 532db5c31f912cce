//! Budget mutations and running-total maintenance.

use chrono::NaiveDate;
use turbocash_domain::{
    calendar::{month_start, week_start_sunday, year_start},
    new_id, same_category, Budget, BudgetPeriod, Transaction, UserData,
};

use super::owner_id;
use crate::analytics::{current_period_window, period_expenses};
use crate::{CoreError, CoreResult};

/// Stateless helpers that keep budgets consistent with the transaction ledger.
pub struct BudgetService;

impl BudgetService {
    /// Adds a budget starting `today`, seeding `spent` with matching expenses
    /// already recorded in the calendar-aligned week, month or year.
    pub fn add(data: &mut UserData, mut budget: Budget, today: NaiveDate) -> CoreResult<String> {
        budget.user_id = owner_id(data)?;
        if budget.id.trim().is_empty() {
            budget.id = new_id();
        }
        budget.start_date = today;
        budget.spent = Self::past_spending(&data.transactions, &budget.category, &budget.period, today);
        budget.validate()?;

        let id = budget.id.clone();
        tracing::info!(
            budget = %id,
            category = %budget.category,
            period = %budget.period,
            seeded = budget.spent,
            "budget added"
        );
        data.budgets.push(budget);
        Ok(id)
    }

    /// Sum of matching expenses from the start of the calendar week (Sunday),
    /// month or year containing `today`, up to and including `today`.
    ///
    /// Unrecognized periods have no calendar anchor and yield zero.
    pub fn past_spending(
        transactions: &[Transaction],
        category: &str,
        period: &BudgetPeriod,
        today: NaiveDate,
    ) -> f64 {
        let from = match period {
            BudgetPeriod::Weekly => week_start_sunday(today),
            BudgetPeriod::Monthly => month_start(today),
            BudgetPeriod::Yearly => year_start(today),
            BudgetPeriod::Unrecognized(_) => return 0.0,
        };
        transactions
            .iter()
            .filter(|txn| {
                txn.is_expense()
                    && same_category(&txn.category, category)
                    && txn.date >= from
                    && txn.date <= today
            })
            .map(|txn| txn.amount)
            .sum()
    }

    pub fn update<F>(data: &mut UserData, id: &str, mutator: F) -> CoreResult<()>
    where
        F: FnOnce(&mut Budget),
    {
        let budget = data
            .budget_mut(id)
            .ok_or_else(|| CoreError::not_found("budget", id))?;
        let mut candidate = budget.clone();
        mutator(&mut candidate);
        candidate.validate()?;
        candidate.id = budget.id.clone();
        *budget = candidate;
        tracing::info!(budget = %id, "budget updated");
        Ok(())
    }

    pub fn remove(data: &mut UserData, id: &str) -> CoreResult<Budget> {
        let index = data
            .budgets
            .iter()
            .position(|budget| budget.id == id)
            .ok_or_else(|| CoreError::not_found("budget", id))?;
        let removed = data.budgets.remove(index);
        tracing::info!(budget = %id, "budget removed");
        Ok(removed)
    }

    /// Recomputes `spent` from the expenses inside the budget's current window.
    ///
    /// Returns the previous running total.
    pub fn reset_spent_for_current_period(
        data: &mut UserData,
        id: &str,
        today: NaiveDate,
    ) -> CoreResult<f64> {
        let UserData {
            budgets,
            transactions,
            ..
        } = data;
        let budget = budgets
            .iter_mut()
            .find(|budget| budget.id == id)
            .ok_or_else(|| CoreError::not_found("budget", id))?;

        let window = current_period_window(budget, today);
        let recomputed = period_expenses(budget, transactions, &window, today);

        let previous = std::mem::replace(&mut budget.spent, recomputed);
        tracing::info!(
            budget = %id,
            previous,
            recomputed,
            "budget running total reset to current period"
        );
        Ok(previous)
    }

    /// First budget whose category matches, ignoring case.
    pub fn find_by_category<'a>(data: &'a UserData, category: &str) -> Option<&'a Budget> {
        data.budgets
            .iter()
            .find(|budget| budget.matches_category(category))
    }
}
