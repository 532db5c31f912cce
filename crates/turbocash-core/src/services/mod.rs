//! Stateless services applying validated mutations to a [`UserData`] document.
//!
//! [`UserData`]: turbocash_domain::UserData

pub mod budget_service;
pub mod goal_service;
pub mod subscription_service;
pub mod summary_service;
pub mod transaction_service;
pub mod user_service;

pub use budget_service::BudgetService;
pub use goal_service::{GoalOverview, GoalService};
pub use subscription_service::SubscriptionService;
pub use summary_service::{CategorySpending, MonthlyOverview, SummaryService};
pub use transaction_service::{TransactionFilter, TransactionService};
pub use user_service::UserService;

use turbocash_domain::UserData;

use crate::{CoreError, CoreResult};

/// Id of the profile owning `data`, or `NoActiveUser` for an anonymous document.
pub(crate) fn owner_id(data: &UserData) -> CoreResult<String> {
    data.user_id()
        .map(str::to_string)
        .ok_or(CoreError::NoActiveUser)
}
