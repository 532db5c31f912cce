//! Recurring subscriptions and the expenses they generate.

use chrono::NaiveDate;
use turbocash_domain::{calendar::days_between, new_id, Subscription, Transaction, UserData};

use super::{owner_id, TransactionService};
use crate::{CoreError, CoreResult};

/// Category under which subscription charges are recorded.
pub const SUBSCRIPTION_CATEGORY: &str = "Entertainment";
/// A renewal within this many days counts as soon.
pub const RENEWAL_SOON_DAYS: i64 = 7;

pub struct SubscriptionService;

impl SubscriptionService {
    /// Adds a subscription and books its purchase as an expense.
    ///
    /// `next_renewal` is derived from the purchase date and billing cycle.
    pub fn add(data: &mut UserData, mut subscription: Subscription) -> CoreResult<String> {
        subscription.validate()?;
        subscription.user_id = owner_id(data)?;
        if subscription.id.trim().is_empty() {
            subscription.id = new_id();
        }
        subscription.next_renewal = Self::next_renewal(&subscription)?;

        let charge = Transaction::expense(
            subscription.purchase_date,
            subscription.amount,
            SUBSCRIPTION_CATEGORY,
        )
        .with_description(format!("{} Subscription", subscription.name));
        TransactionService::add(data, charge)?;

        let id = subscription.id.clone();
        tracing::info!(
            subscription = %id,
            name = %subscription.name,
            next_renewal = %subscription.next_renewal,
            "subscription added"
        );
        data.subscriptions.push(subscription);
        Ok(id)
    }

    /// Applies `mutator` and recomputes `next_renewal` from the purchase date.
    pub fn update<F>(data: &mut UserData, id: &str, mutator: F) -> CoreResult<()>
    where
        F: FnOnce(&mut Subscription),
    {
        let subscription = data
            .subscription_mut(id)
            .ok_or_else(|| CoreError::not_found("subscription", id))?;
        let mut candidate = subscription.clone();
        mutator(&mut candidate);
        candidate.validate()?;
        candidate.id = subscription.id.clone();
        candidate.next_renewal = Self::next_renewal(&candidate)?;
        *subscription = candidate;
        tracing::info!(subscription = %id, "subscription updated");
        Ok(())
    }

    pub fn remove(data: &mut UserData, id: &str) -> CoreResult<Subscription> {
        let index = data
            .subscriptions
            .iter()
            .position(|subscription| subscription.id == id)
            .ok_or_else(|| CoreError::not_found("subscription", id))?;
        let removed = data.subscriptions.remove(index);
        tracing::info!(subscription = %id, "subscription removed");
        Ok(removed)
    }

    /// Books a renewal charge dated `today` and pushes `next_renewal` one cycle forward.
    ///
    /// Returns the new renewal date.
    pub fn renew(data: &mut UserData, id: &str, today: NaiveDate) -> CoreResult<NaiveDate> {
        let subscription = data
            .subscription(id)
            .ok_or_else(|| CoreError::not_found("subscription", id))?;
        if !subscription.is_active {
            return Err(CoreError::InvalidOperation(format!(
                "subscription {} is not active",
                subscription.name
            )));
        }
        let next = Subscription::renewal_after(subscription.next_renewal, subscription.billable_months)
            .ok_or_else(|| CoreError::InvalidOperation("renewal date out of range".into()))?;
        let charge = Transaction::expense(today, subscription.amount, SUBSCRIPTION_CATEGORY)
            .with_description(format!("{} Subscription Renewal", subscription.name));

        TransactionService::add(data, charge)?;
        if let Some(subscription) = data.subscription_mut(id) {
            subscription.next_renewal = next;
        }
        tracing::info!(subscription = %id, next_renewal = %next, "subscription renewed");
        Ok(next)
    }

    /// Days until the next renewal; negative when it is overdue.
    pub fn days_until_renewal(subscription: &Subscription, today: NaiveDate) -> i64 {
        days_between(today, subscription.next_renewal)
    }

    pub fn is_renewal_soon(subscription: &Subscription, today: NaiveDate) -> bool {
        (0..=RENEWAL_SOON_DAYS).contains(&Self::days_until_renewal(subscription, today))
    }

    /// Active subscriptions renewing within `within_days`, soonest first.
    pub fn upcoming_renewals(
        data: &UserData,
        today: NaiveDate,
        within_days: i64,
    ) -> Vec<&Subscription> {
        let mut upcoming: Vec<&Subscription> = data
            .subscriptions
            .iter()
            .filter(|subscription| subscription.is_active)
            .filter(|subscription| {
                (0..=within_days).contains(&Self::days_until_renewal(subscription, today))
            })
            .collect();
        upcoming.sort_by_key(|subscription| subscription.next_renewal);
        upcoming
    }

    /// Combined monthly cost of active subscriptions.
    pub fn monthly_cost(data: &UserData) -> f64 {
        data.subscriptions
            .iter()
            .filter(|subscription| subscription.is_active)
            .map(Subscription::monthly_amount)
            .sum()
    }

    pub fn yearly_cost(data: &UserData) -> f64 {
        Self::monthly_cost(data) * 12.0
    }

    fn next_renewal(subscription: &Subscription) -> CoreResult<NaiveDate> {
        Subscription::renewal_after(subscription.purchase_date, subscription.billable_months)
            .ok_or_else(|| CoreError::InvalidOperation("renewal date out of range".into()))
    }
}
