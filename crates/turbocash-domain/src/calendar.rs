//! Calendar arithmetic used by budget periods and subscription renewals.
//!
//! Month and year steps roll over instead of clamping: when the target month
//! is shorter than the source day-of-month, the surplus days spill into the
//! following month (Jan 31 + 1 month = Mar 3 in a common year). Each step is
//! applied to the previous result, so a rolled-over date keeps its new day.

use chrono::{Datelike, Duration, NaiveDate};

use crate::common::BudgetPeriod;

/// Advances `date` by one unit of `period`.
///
/// Returns `None` for [`BudgetPeriod::Unrecognized`] or when the result would
/// fall outside the representable date range.
pub fn add_period(date: NaiveDate, period: &BudgetPeriod) -> Option<NaiveDate> {
    match period {
        BudgetPeriod::Weekly => date.checked_add_signed(Duration::days(7)),
        BudgetPeriod::Monthly => add_months(date, 1),
        BudgetPeriod::Yearly => add_years(date, 1),
        BudgetPeriod::Unrecognized(_) => None,
    }
}

/// Shifts `date` by `months` calendar months with day-of-month roll-over.
pub fn add_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let index = date.year().checked_mul(12)? + date.month0() as i32;
    let target = index.checked_add(months)?;
    let year = target.div_euclid(12);
    let month = target.rem_euclid(12) as u32 + 1;
    let limit = days_in_month(year, month);
    let day = date.day();
    if day <= limit {
        NaiveDate::from_ymd_opt(year, month, day)
    } else {
        NaiveDate::from_ymd_opt(year, month, limit)?
            .checked_add_signed(Duration::days(i64::from(day - limit)))
    }
}

/// Shifts `date` by `years` calendar years; Feb 29 rolls into Mar 1.
pub fn add_years(date: NaiveDate, years: i32) -> Option<NaiveDate> {
    add_months(date, years.checked_mul(12)?)
}

/// Number of days in the given month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

/// Whole days from `from` to `to`; negative when `to` precedes `from`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Sunday on or before `date`.
pub fn week_start_sunday(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_sunday();
    date - Duration::days(i64::from(offset))
}

/// January 1st of the year containing `date`.
pub fn year_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_addition_rolls_over_short_months() {
        assert_eq!(add_months(date(2025, 1, 31), 1), Some(date(2025, 3, 3)));
        assert_eq!(add_months(date(2024, 1, 31), 1), Some(date(2024, 3, 2)));
        assert_eq!(add_months(date(2025, 3, 31), 1), Some(date(2025, 5, 1)));
        assert_eq!(add_months(date(2025, 1, 15), 1), Some(date(2025, 2, 15)));
    }

    #[test]
    fn month_addition_crosses_year_boundaries() {
        assert_eq!(add_months(date(2025, 12, 10), 1), Some(date(2026, 1, 10)));
        assert_eq!(add_months(date(2025, 1, 10), -1), Some(date(2024, 12, 10)));
        assert_eq!(add_months(date(2025, 11, 30), 14), Some(date(2027, 1, 30)));
    }

    #[test]
    fn year_addition_rolls_leap_day_forward() {
        assert_eq!(add_years(date(2024, 2, 29), 1), Some(date(2025, 3, 1)));
        assert_eq!(add_years(date(2024, 2, 29), 4), Some(date(2028, 2, 29)));
    }

    #[test]
    fn period_steps_follow_cadence() {
        let start = date(2025, 6, 2);
        assert_eq!(add_period(start, &BudgetPeriod::Weekly), Some(date(2025, 6, 9)));
        assert_eq!(add_period(start, &BudgetPeriod::Monthly), Some(date(2025, 7, 2)));
        assert_eq!(add_period(start, &BudgetPeriod::Yearly), Some(date(2026, 6, 2)));
        assert_eq!(
            add_period(start, &BudgetPeriod::Unrecognized("daily".into())),
            None
        );
    }

    #[test]
    fn calendar_anchors() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2025, 12), 31);
        // 2025-06-04 is a Wednesday.
        assert_eq!(week_start_sunday(date(2025, 6, 4)), date(2025, 6, 1));
        assert_eq!(week_start_sunday(date(2025, 6, 1)), date(2025, 6, 1));
        assert_eq!(month_start(date(2025, 6, 4)), date(2025, 6, 1));
        assert_eq!(year_start(date(2025, 6, 4)), date(2025, 1, 1));
        assert_eq!(days_between(date(2025, 6, 1), date(2025, 6, 4)), 3);
        assert_eq!(days_between(date(2025, 6, 4), date(2025, 6, 1)), -3);
    }
}
