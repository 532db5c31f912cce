mod common;

use std::sync::Arc;

use chrono::Days;
use common::{date, new_session, setup_test_env, store_under, unique_user};
use turbocash::{
    turbocash_core::{CoreError, FixedClock},
    turbocash_domain::{Budget, BudgetPeriod, Goal, RiskLevel, Subscription, Transaction},
    CashError, UserSession,
};

fn reopen(base: &std::path::Path, user: &str, today: chrono::NaiveDate) -> UserSession {
    UserSession::open_with_clock(
        Box::new(store_under(base, today)),
        Arc::new(FixedClock::on(today)),
        user,
    )
    .expect("reopen session")
}

#[test]
fn weekly_budget_counts_down_across_reopened_sessions() {
    let base = setup_test_env();
    let user = unique_user();
    let start = date(2025, 6, 11);
    let mut session = new_session(&base, &user, start);
    session
        .add_budget(Budget::new("Groceries", 700.0, BudgetPeriod::Weekly, start))
        .unwrap();

    let mut previous = None;
    for offset in 0..15u64 {
        let today = start.checked_add_days(Days::new(offset)).unwrap();
        let report = reopen(&base, &user, today).risk_report();
        let remaining = report[0].days_to_next_period;
        assert!((1..=7).contains(&remaining));
        if let Some(prev) = previous {
            if prev == 1 {
                assert_eq!(remaining, 7, "reset at boundary on {today}");
            } else {
                assert_eq!(remaining, prev - 1, "countdown on {today}");
            }
        }
        previous = Some(remaining);
    }
}

#[test]
fn burn_rate_pushes_a_budget_to_critical() {
    let base = setup_test_env();
    let user = unique_user();
    let start = date(2025, 3, 1);
    let mut session = new_session(&base, &user, start);
    session
        .add_budget(Budget::new("Entertainment", 100.0, BudgetPeriod::Monthly, start))
        .unwrap();
    for offset in 0..8u64 {
        let day = start.checked_add_days(Days::new(offset)).unwrap();
        session
            .add_transaction(Transaction::expense(day, 10.0, "Entertainment"))
            .unwrap();
    }

    let report = reopen(&base, &user, date(2025, 3, 9)).risk_report();
    let row = &report[0];
    assert_eq!(row.spent, 80.0);
    assert_eq!(row.assessment.average_daily_spend, 10.0);
    assert_eq!(row.assessment.days_to_run_out, Some(2));
    assert_eq!(row.risk_level(), RiskLevel::Critical);
}

#[test]
fn goals_and_subscriptions_survive_a_round_trip() {
    let base = setup_test_env();
    let user = unique_user();
    let today = date(2025, 6, 11);
    let mut session = new_session(&base, &user, today);

    let goal_id = session
        .add_goal(Goal::new("Laptop", 1200.0, date(2025, 12, 31), session.now()))
        .unwrap();
    assert_eq!(session.contribute_to_goal(&goal_id, 300.0).unwrap(), 300.0);

    let sub_id = session
        .add_subscription(Subscription::new("Streamly", "web", 199.0, 1, date(2025, 5, 14)))
        .unwrap();
    assert_eq!(session.renew_subscription(&sub_id).unwrap(), date(2025, 7, 14));

    let reopened = reopen(&base, &user, today);
    let data = reopened.data();
    assert_eq!(data.goals[0].current_amount, 300.0);
    assert_eq!(data.subscriptions[0].next_renewal, date(2025, 7, 14));
    assert_eq!(data.transactions.len(), 2);
    assert!(data.last_modified.is_some());
}

#[test]
fn rejected_changes_are_not_persisted() {
    let base = setup_test_env();
    let user = unique_user();
    let today = date(2025, 6, 11);
    let mut session = new_session(&base, &user, today);

    let err = session.contribute_to_goal("missing", 10.0).unwrap_err();
    assert!(matches!(err, CashError::Core(CoreError::NotFound { .. })));

    let err = session
        .add_budget(Budget::new("Travel", -5.0, BudgetPeriod::Monthly, today))
        .unwrap_err();
    assert!(matches!(err, CashError::Core(CoreError::Validation(_))));
    assert!(reopen(&base, &user, today).data().budgets.is_empty());
}
