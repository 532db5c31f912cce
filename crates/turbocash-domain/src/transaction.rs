//! Domain models for income and expense entries.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::common::*;
use crate::dates::iso_date;
use crate::error::ValidationError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(with = "iso_date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
    pub amount: f64,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub user_id: String,
}

impl Transaction {
    pub fn new(
        kind: TransactionKind,
        date: NaiveDate,
        amount: f64,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            date,
            description: String::new(),
            amount,
            category: category.into(),
            kind,
            user_id: String::new(),
        }
    }

    pub fn expense(date: NaiveDate, amount: f64, category: impl Into<String>) -> Self {
        Self::new(TransactionKind::Expense, date, amount, category)
    }

    pub fn income(date: NaiveDate, amount: f64, category: impl Into<String>) -> Self {
        Self::new(TransactionKind::Income, date, amount, category)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_positive("amount", self.amount)?;
        ensure_not_blank("category", &self.category)?;
        Ok(())
    }
}

/// Only expenses count against budgets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Expense,
    Income,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Expense => "Expense",
            TransactionKind::Income => "Income",
        };
        f.write_str(label)
    }
}
