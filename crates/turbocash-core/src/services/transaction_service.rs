//! Transaction mutations and the running budget totals they feed.

use std::cmp::Reverse;

use chrono::NaiveDate;
use turbocash_domain::{new_id, same_category, Transaction, TransactionKind, UserData};

use super::owner_id;
use crate::{CoreError, CoreResult};

/// Optional criteria for [`TransactionService::filter`].
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub kind: Option<TransactionKind>,
    pub category: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl TransactionFilter {
    pub fn matches(&self, txn: &Transaction) -> bool {
        self.kind.map_or(true, |kind| txn.kind == kind)
            && self
                .category
                .as_deref()
                .map_or(true, |category| same_category(&txn.category, category))
            && self.from.map_or(true, |from| txn.date >= from)
            && self.to.map_or(true, |to| txn.date <= to)
    }
}

pub struct TransactionService;

impl TransactionService {
    /// Validates and appends a transaction, returning its id.
    ///
    /// Expenses also increase `spent` on the first budget with a matching category.
    pub fn add(data: &mut UserData, mut transaction: Transaction) -> CoreResult<String> {
        transaction.validate()?;
        transaction.user_id = owner_id(data)?;
        if transaction.id.trim().is_empty() {
            transaction.id = new_id();
        }
        if data.transaction(&transaction.id).is_some() {
            return Err(CoreError::InvalidOperation(format!(
                "transaction {} already exists",
                transaction.id
            )));
        }

        if transaction.is_expense() {
            if let Some(budget) = data
                .budgets
                .iter_mut()
                .find(|budget| budget.matches_category(&transaction.category))
            {
                budget.spent += transaction.amount;
                tracing::debug!(
                    budget = %budget.id,
                    spent = budget.spent,
                    "budget running total increased"
                );
            }
        }

        let id = transaction.id.clone();
        tracing::info!(
            transaction = %id,
            kind = %transaction.kind,
            amount = transaction.amount,
            "transaction added"
        );
        data.transactions.push(transaction);
        Ok(id)
    }

    /// Applies `mutator` to a transaction and re-validates the result.
    ///
    /// Budget running totals are left untouched.
    pub fn update<F>(data: &mut UserData, id: &str, mutator: F) -> CoreResult<()>
    where
        F: FnOnce(&mut Transaction),
    {
        let txn = data
            .transaction_mut(id)
            .ok_or_else(|| CoreError::not_found("transaction", id))?;
        let mut candidate = txn.clone();
        mutator(&mut candidate);
        candidate.validate()?;
        candidate.id = txn.id.clone();
        *txn = candidate;
        tracing::info!(transaction = %id, "transaction updated");
        Ok(())
    }

    pub fn remove(data: &mut UserData, id: &str) -> CoreResult<Transaction> {
        let index = data
            .transactions
            .iter()
            .position(|txn| txn.id == id)
            .ok_or_else(|| CoreError::not_found("transaction", id))?;
        let removed = data.transactions.remove(index);
        tracing::info!(transaction = %id, "transaction removed");
        Ok(removed)
    }

    /// Transactions newest first; ties keep insertion order.
    pub fn list_sorted(data: &UserData) -> Vec<&Transaction> {
        let mut list: Vec<&Transaction> = data.transactions.iter().collect();
        list.sort_by_key(|txn| Reverse(txn.date));
        list
    }

    pub fn filter<'a>(data: &'a UserData, filter: &TransactionFilter) -> Vec<&'a Transaction> {
        Self::list_sorted(data)
            .into_iter()
            .filter(|txn| filter.matches(txn))
            .collect()
    }
}
