//! Billing cutoff date and period resolution.
//!
//! Maps an arbitrary transaction date plus the configured cutoff-day
//! setting to the canonical cutoff date and the full billing period. A
//! period labeled "YYYY-MM" runs from the day after the previous month's
//! cutoff through that month's cutoff; dates past the cutoff roll into the
//! following month's period.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// The configured billing cutoff day of month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutoffDay {
    /// Cutoff on the 5th.
    Day5,
    /// Cutoff on the 10th.
    Day10,
    /// Cutoff on the 15th.
    Day15,
    /// Cutoff on the 20th.
    Day20,
    /// Cutoff on the 25th.
    Day25,
    /// Cutoff on the last calendar day of the month.
    EndOfMonth,
}

impl CutoffDay {
    /// The actual cutoff day number within a given month.
    pub fn day_in_month(self, year: i32, month: u32) -> u32 {
        match self {
            CutoffDay::Day5 => 5,
            CutoffDay::Day10 => 10,
            CutoffDay::Day15 => 15,
            CutoffDay::Day20 => 20,
            CutoffDay::Day25 => 25,
            CutoffDay::EndOfMonth => last_day_of_month(year, month),
        }
    }
}

/// One resolved billing period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPeriod {
    /// First day of the period (day after the previous cutoff).
    pub period_start: NaiveDate,
    /// Last day of the period (the cutoff date itself).
    pub period_end: NaiveDate,
    /// Period label, "YYYY-MM".
    pub period_label: String,
}

/// Returns the last calendar day of a month, leap years included.
fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = roll_month(year, month, 1);
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or(NaiveDate::MAX);
    (first_of_next - Duration::days(1)).day()
}

/// Rolls a (year, month) pair forward or backward by whole months.
fn roll_month(year: i32, month: u32, offset: i32) -> (i32, u32) {
    let zero_based = year * 12 + (month as i32 - 1) + offset;
    (zero_based.div_euclid(12), (zero_based.rem_euclid(12) + 1) as u32)
}

/// The cutoff date falling within the given year/month.
fn cutoff_date_in(year: i32, month: u32, setting: CutoffDay) -> NaiveDate {
    let day = setting.day_in_month(year, month);
    // Fixed days are at most 25 and the end-of-month day always exists, so
    // the construction cannot fail for valid year/month input.
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MAX)
}

/// Resolves the canonical cutoff date governing a transaction date.
///
/// A date on or before its month's cutoff belongs to that cutoff; a later
/// date belongs to the following month's cutoff.
///
/// # Examples
///
/// ```
/// use dispatch_engine::calculation::{CutoffDay, calculate_cutoff_date};
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
/// assert_eq!(
///     calculate_cutoff_date(date, CutoffDay::Day10),
///     NaiveDate::from_ymd_opt(2024, 4, 10).unwrap()
/// );
/// assert_eq!(
///     calculate_cutoff_date(date, CutoffDay::Day20),
///     NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()
/// );
/// ```
pub fn calculate_cutoff_date(target_date: NaiveDate, setting: CutoffDay) -> NaiveDate {
    calculate_billing_period(target_date, setting).period_end
}

/// Resolves the full billing period containing a transaction date.
///
/// # Examples
///
/// ```
/// use dispatch_engine::calculation::{CutoffDay, calculate_billing_period};
/// use chrono::NaiveDate;
///
/// let period = calculate_billing_period(
///     NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
///     CutoffDay::Day10,
/// );
/// assert_eq!(period.period_start, NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
/// assert_eq!(period.period_end, NaiveDate::from_ymd_opt(2024, 4, 10).unwrap());
/// assert_eq!(period.period_label, "2024-04");
/// ```
pub fn calculate_billing_period(target_date: NaiveDate, setting: CutoffDay) -> BillingPeriod {
    let year = target_date.year();
    let month = target_date.month();
    let this_cutoff = cutoff_date_in(year, month, setting);

    let (label_year, label_month) = if target_date <= this_cutoff {
        (year, month)
    } else {
        roll_month(year, month, 1)
    };

    let period_end = cutoff_date_in(label_year, label_month, setting);
    let (prev_year, prev_month) = roll_month(label_year, label_month, -1);
    let period_start = cutoff_date_in(prev_year, prev_month, setting) + Duration::days(1);

    BillingPeriod {
        period_start,
        period_end,
        period_label: format!("{:04}-{:02}", label_year, label_month),
    }
}
