//! Facade that pairs one user's document with its store and clock.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use turbocash_core::{
    analytics::{assess_all, days_to_next_budget_period},
    services::{
        BudgetService, GoalService, MonthlyOverview, SubscriptionService, SummaryService,
        TransactionService, UserService,
    },
    BudgetRiskAssessment, Clock, CoreError, CoreResult, SystemClock, UserStore,
};
use turbocash_domain::{
    Budget, BudgetPeriod, Goal, RiskLevel, Subscription, Transaction, UserData, UserProfile,
};

use crate::Result;

/// One line of the budget risk report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRiskRow {
    pub budget_id: String,
    pub category: String,
    pub allocated: f64,
    pub spent: f64,
    pub period: BudgetPeriod,
    #[serde(flatten)]
    pub assessment: BudgetRiskAssessment,
    pub days_to_next_period: i64,
}

impl BudgetRiskRow {
    pub fn risk_level(&self) -> RiskLevel {
        self.assessment.risk_level
    }
}

/// An open user document. Every mutation is persisted before it returns.
pub struct UserSession {
    user_id: String,
    data: UserData,
    migrations: Vec<String>,
    store: Box<dyn UserStore>,
    clock: Arc<dyn Clock>,
}

impl UserSession {
    /// Opens the stored document of `user_id`.
    pub fn open(store: Box<dyn UserStore>, user_id: &str) -> Result<Self> {
        Self::open_with_clock(store, Arc::new(SystemClock), user_id)
    }

    pub fn open_with_clock(
        store: Box<dyn UserStore>,
        clock: Arc<dyn Clock>,
        user_id: &str,
    ) -> Result<Self> {
        let mut data = store
            .load(user_id)?
            .ok_or_else(|| CoreError::not_found("user document", user_id))?;
        let migrations = UserService::migrate(&mut data);
        tracing::debug!(user = %user_id, "session opened");
        Ok(Self {
            user_id: user_id.to_string(),
            data,
            migrations,
            store,
            clock,
        })
    }

    /// Creates and stores a fresh document for `profile`.
    pub fn create(
        store: Box<dyn UserStore>,
        clock: Arc<dyn Clock>,
        profile: UserProfile,
    ) -> Result<Self> {
        let user_id = profile.id.clone();
        if store.load(&user_id)?.is_some() {
            return Err(CoreError::InvalidOperation(format!("user {user_id} already exists")).into());
        }
        let mut session = Self {
            data: UserService::new_user_data(profile),
            user_id,
            migrations: Vec::new(),
            store,
            clock,
        };
        session.save()?;
        Ok(session)
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn data(&self) -> &UserData {
        &self.data
    }

    /// Repairs applied when the document was opened.
    pub fn migrations(&self) -> &[String] {
        &self.migrations
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Stamps `last_modified` and writes the document.
    pub fn save(&mut self) -> Result<()> {
        self.data.last_modified = Some(self.clock.now());
        self.store.save(&self.user_id, &self.data)?;
        Ok(())
    }

    /// Runs `change` against a copy of the document and persists it on success.
    ///
    /// A failed change leaves the session untouched.
    pub fn mutate<T, F>(&mut self, change: F) -> Result<T>
    where
        F: FnOnce(&mut UserData, &dyn Clock) -> CoreResult<T>,
    {
        let mut draft = self.data.clone();
        let value = change(&mut draft, self.clock.as_ref())?;
        let previous = std::mem::replace(&mut self.data, draft);
        if let Err(err) = self.save() {
            self.data = previous;
            return Err(err);
        }
        Ok(value)
    }

    pub fn add_transaction(&mut self, transaction: Transaction) -> Result<String> {
        self.mutate(|data, _| TransactionService::add(data, transaction))
    }

    pub fn remove_transaction(&mut self, id: &str) -> Result<Transaction> {
        self.mutate(|data, _| TransactionService::remove(data, id))
    }

    pub fn add_budget(&mut self, budget: Budget) -> Result<String> {
        self.mutate(|data, clock| BudgetService::add(data, budget, clock.today()))
    }

    pub fn reset_budget_spent(&mut self, id: &str) -> Result<f64> {
        self.mutate(|data, clock| {
            BudgetService::reset_spent_for_current_period(data, id, clock.today())
        })
    }

    pub fn add_goal(&mut self, goal: Goal) -> Result<String> {
        self.mutate(|data, clock| GoalService::add(data, goal, clock.now()))
    }

    pub fn contribute_to_goal(&mut self, id: &str, amount: f64) -> Result<f64> {
        self.mutate(|data, _| GoalService::contribute(data, id, amount))
    }

    pub fn add_subscription(&mut self, subscription: Subscription) -> Result<String> {
        self.mutate(|data, _| SubscriptionService::add(data, subscription))
    }

    pub fn renew_subscription(&mut self, id: &str) -> Result<NaiveDate> {
        self.mutate(|data, clock| SubscriptionService::renew(data, id, clock.today()))
    }

    /// Every budget with its risk tier, most severe first.
    pub fn risk_report(&self) -> Vec<BudgetRiskRow> {
        let today = self.today();
        assess_all(&self.data, today)
            .into_iter()
            .map(|row| BudgetRiskRow {
                budget_id: row.budget.id.clone(),
                category: row.budget.category.clone(),
                allocated: row.budget.allocated,
                spent: row.budget.spent,
                period: row.budget.period.clone(),
                days_to_next_period: days_to_next_budget_period(row.budget, today),
                assessment: row.assessment,
            })
            .collect()
    }

    pub fn upcoming_renewals(&self, within_days: i64) -> Vec<&Subscription> {
        SubscriptionService::upcoming_renewals(&self.data, self.today(), within_days)
    }

    pub fn monthly_overview(&self) -> MonthlyOverview {
        SummaryService::monthly_overview(&self.data, self.today())
    }

    /// Hands back the document, consuming the session.
    pub fn close(self) -> UserData {
        tracing::debug!(user = %self.user_id, "session closed");
        self.data
    }
}
