use std::io::Write;

use chrono::NaiveDate;
use colored::{ColoredString, Colorize};
use serde::Serialize;
use turbocash_core::{currency::format_amount, services::SubscriptionService};
use turbocash_domain::RiskLevel;

use crate::{
    config::Config,
    session::{BudgetRiskRow, UserSession},
    Result,
};

/// Machine-readable form of the risk table.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskReport<'a> {
    pub user_id: &'a str,
    pub as_of: NaiveDate,
    pub currency: &'a str,
    pub budgets: Vec<BudgetRiskRow>,
}

/// The profile currency, else the configured one.
pub fn display_currency<'a>(session: &'a UserSession, config: &'a Config) -> &'a str {
    session
        .data()
        .user
        .as_ref()
        .and_then(|user| user.currency.as_deref())
        .unwrap_or(&config.currency)
}

/// Writes the risk rows as pretty JSON.
pub fn render_report_json<W: Write>(
    session: &UserSession,
    config: &Config,
    out: &mut W,
) -> Result<()> {
    let report = RiskReport {
        user_id: session.user_id(),
        as_of: session.today(),
        currency: display_currency(session, config),
        budgets: session.risk_report(),
    };
    writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    Ok(())
}

/// Writes the budget risk table followed by upcoming renewals and the
/// month-to-date totals.
pub fn render_report<W: Write>(session: &UserSession, config: &Config, out: &mut W) -> Result<()> {
    let data = session.data();
    let currency = display_currency(session, config);
    let today = session.today();
    let owner = data
        .user
        .as_ref()
        .map(|user| user.display_name())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| session.user_id().to_string());

    let title = format!("Budget risk for {owner} as of {today}");
    writeln!(out, "{}", title.as_str().bold())?;

    let rows = session.risk_report();
    if rows.is_empty() {
        writeln!(out, "No budgets yet.")?;
    }
    for row in &rows {
        let runway = row
            .assessment
            .days_to_run_out
            .map(|days| format!("{days}d"))
            .unwrap_or_else(|| "-".into());
        writeln!(
            out,
            "{:<20} {:>12} / {:<12} {}  avg/day {}  runs out in {}  next period in {}d",
            row.category,
            format_amount(row.spent, currency),
            format_amount(row.allocated, currency),
            paint(row.risk_level()),
            format_amount(row.assessment.average_daily_spend, currency),
            runway,
            row.days_to_next_period,
        )?;
    }

    let within = i64::from(config.renewal_warning_days);
    let renewals = session.upcoming_renewals(within);
    if !renewals.is_empty() {
        writeln!(out)?;
        let heading = format!("Renewals within {within} days");
        writeln!(out, "{}", heading.as_str().bold())?;
        for subscription in renewals {
            writeln!(
                out,
                "{:<20} {:>12}  {} (in {}d)",
                subscription.name,
                format_amount(subscription.amount, currency),
                subscription.next_renewal,
                SubscriptionService::days_until_renewal(subscription, today),
            )?;
        }
    }

    let month = session.monthly_overview();
    writeln!(out)?;
    writeln!(
        out,
        "This month: income {}, expenses {}, savings {}",
        format_amount(month.income, currency),
        format_amount(month.expenses, currency),
        format_amount(month.savings, currency),
    )?;
    Ok(())
}

fn paint(level: RiskLevel) -> ColoredString {
    let label = level.label();
    match level.color_token() {
        "red" => label.red().bold(),
        "orange" => label.truecolor(255, 165, 0),
        "yellow" => label.yellow(),
        _ => label.green(),
    }
}
