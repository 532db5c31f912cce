//! Month-over-month income and expense roll-ups.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use turbocash_domain::{
    calendar::{add_months, month_start},
    Transaction, TransactionKind, UserData,
};

const TOP_CATEGORY_COUNT: usize = 5;

/// Spending share of one category within a month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySpending {
    pub category: String,
    pub amount: f64,
    /// Share of the month's expenses, 0 to 100.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyOverview {
    pub month_start: NaiveDate,
    pub income: f64,
    pub expenses: f64,
    pub savings: f64,
    pub previous_expenses: f64,
    /// Change in expenses against the previous month, in percent.
    pub percentage_change: f64,
    pub top_categories: Vec<CategorySpending>,
}

pub struct SummaryService;

impl SummaryService {
    /// Summarizes the calendar month containing `today`.
    pub fn monthly_overview(data: &UserData, today: NaiveDate) -> MonthlyOverview {
        let start = month_start(today);
        let previous_start = add_months(start, -1).unwrap_or(start);

        let current: Vec<&Transaction> = Self::in_month(&data.transactions, start).collect();
        let income = Self::total(&current, TransactionKind::Income);
        let expenses = Self::total(&current, TransactionKind::Expense);

        let previous: Vec<&Transaction> =
            Self::in_month(&data.transactions, previous_start).collect();
        let previous_expenses = Self::total(&previous, TransactionKind::Expense);

        let percentage_change = if previous_expenses > 0.0 {
            (expenses - previous_expenses) / previous_expenses * 100.0
        } else {
            0.0
        };

        MonthlyOverview {
            month_start: start,
            income,
            expenses,
            savings: income - expenses,
            previous_expenses,
            percentage_change,
            top_categories: Self::top_categories(&current, expenses),
        }
    }

    fn in_month(
        transactions: &[Transaction],
        start: NaiveDate,
    ) -> impl Iterator<Item = &Transaction> {
        transactions
            .iter()
            .filter(move |txn| txn.date.year() == start.year() && txn.date.month() == start.month())
    }

    fn total(transactions: &[&Transaction], kind: TransactionKind) -> f64 {
        transactions
            .iter()
            .filter(|txn| txn.kind == kind)
            .map(|txn| txn.amount)
            .sum()
    }

    fn top_categories(transactions: &[&Transaction], expenses: f64) -> Vec<CategorySpending> {
        let mut by_category: HashMap<&str, f64> = HashMap::new();
        for txn in transactions.iter().filter(|txn| txn.is_expense()) {
            *by_category.entry(txn.category.as_str()).or_default() += txn.amount;
        }
        let mut rows: Vec<CategorySpending> = by_category
            .into_iter()
            .map(|(category, amount)| CategorySpending {
                category: category.to_string(),
                amount,
                share: if expenses > 0.0 {
                    amount / expenses * 100.0
                } else {
                    0.0
                },
            })
            .collect();
        rows.sort_by(|a, b| {
            b.amount
                .total_cmp(&a.amount)
                .then_with(|| a.category.cmp(&b.category))
        });
        rows.truncate(TOP_CATEGORY_COUNT);
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn overview_compares_with_previous_month() {
        let mut data = UserData::default();
        data.transactions = vec![
            Transaction::income(date(2025, 6, 1), 3000.0, "Salary"),
            Transaction::expense(date(2025, 6, 2), 300.0, "Food & Dining"),
            Transaction::expense(date(2025, 6, 9), 200.0, "Transportation"),
            Transaction::expense(date(2025, 6, 10), 100.0, "Food & Dining"),
            Transaction::expense(date(2025, 5, 20), 400.0, "Shopping"),
            Transaction::expense(date(2024, 6, 20), 999.0, "Shopping"),
        ];

        let overview = SummaryService::monthly_overview(&data, date(2025, 6, 15));
        assert_eq!(overview.month_start, date(2025, 6, 1));
        assert_eq!(overview.income, 3000.0);
        assert_eq!(overview.expenses, 600.0);
        assert_eq!(overview.savings, 2400.0);
        assert_eq!(overview.previous_expenses, 400.0);
        assert_eq!(overview.percentage_change, 50.0);
        assert_eq!(overview.top_categories.len(), 2);
        assert_eq!(overview.top_categories[0].category, "Food & Dining");
        assert_eq!(overview.top_categories[0].amount, 400.0);
    }

    #[test]
    fn no_previous_spending_means_no_change() {
        let mut data = UserData::default();
        data.transactions = vec![Transaction::expense(date(2025, 1, 5), 80.0, "Travel")];
        let overview = SummaryService::monthly_overview(&data, date(2025, 1, 20));
        assert_eq!(overview.previous_expenses, 0.0);
        assert_eq!(overview.percentage_change, 0.0);
        assert_eq!(overview.top_categories[0].share, 100.0);
    }

    #[test]
    fn top_categories_are_capped_at_five() {
        let mut data = UserData::default();
        for (idx, category) in ["A", "B", "C", "D", "E", "F", "G"].iter().enumerate() {
            data.transactions
                .push(Transaction::expense(date(2025, 3, 3), 10.0 + idx as f64, *category));
        }
        let overview = SummaryService::monthly_overview(&data, date(2025, 3, 31));
        let names: Vec<&str> = overview
            .top_categories
            .iter()
            .map(|row| row.category.as_str())
            .collect();
        assert_eq!(names, vec!["G", "F", "E", "D", "C"]);
    }
}
