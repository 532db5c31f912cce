//! Recurring subscriptions billed every `billable_months` months.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::add_months;
use crate::common::*;
use crate::dates::iso_date;
use crate::error::ValidationError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub platform: String,
    pub amount: f64,
    pub billable_months: u32,
    #[serde(with = "iso_date")]
    pub purchase_date: NaiveDate,
    #[serde(with = "iso_date")]
    pub next_renewal: NaiveDate,
    #[serde(default = "Subscription::default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub user_id: String,
}

impl Subscription {
    /// Builds an active subscription whose first renewal follows the purchase.
    ///
    /// When the renewal date cannot be represented the purchase date is used.
    pub fn new(
        name: impl Into<String>,
        platform: impl Into<String>,
        amount: f64,
        billable_months: u32,
        purchase_date: NaiveDate,
    ) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            platform: platform.into(),
            amount,
            billable_months,
            purchase_date,
            next_renewal: Self::renewal_after(purchase_date, billable_months)
                .unwrap_or(purchase_date),
            is_active: true,
            user_id: String::new(),
        }
    }

    /// Date one billing cycle after `from`.
    pub fn renewal_after(from: NaiveDate, billable_months: u32) -> Option<NaiveDate> {
        add_months(from, i32::try_from(billable_months).ok()?)
    }

    /// Cost spread over a single month of the billing cycle.
    pub fn monthly_amount(&self) -> f64 {
        if self.billable_months == 0 {
            return self.amount;
        }
        self.amount / f64::from(self.billable_months)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_not_blank("name", &self.name)?;
        ensure_positive("amount", self.amount)?;
        if self.billable_months == 0 {
            return Err(ValidationError::NotPositive {
                field: "billableMonths",
            });
        }
        Ok(())
    }

    fn default_active() -> bool {
        true
    }
}
