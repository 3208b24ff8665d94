//! Day category derivation.
//!
//! This module classifies a calendar date as WEEKDAY/SATURDAY/SUNDAY/
//! HOLIDAY through an injected holiday lookup. The holiday check takes
//! precedence over the weekday classification; the category is always
//! derived from the date, never independently assigned.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::ShiftWindow;

/// The WEEKDAY/SATURDAY/SUNDAY/HOLIDAY classification of a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayCategory {
    /// Monday through Friday, not a public holiday.
    Weekday,
    /// Saturday, not a public holiday.
    Saturday,
    /// Sunday, not a public holiday.
    Sunday,
    /// A public holiday; overrides the weekday classification.
    Holiday,
}

impl std::fmt::Display for DayCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayCategory::Weekday => write!(f, "Weekday"),
            DayCategory::Saturday => write!(f, "Saturday"),
            DayCategory::Sunday => write!(f, "Sunday"),
            DayCategory::Holiday => write!(f, "Holiday"),
        }
    }
}

/// Injected public-holiday lookup.
///
/// Any `Fn(NaiveDate) -> bool` can serve as the calendar, so callers can
/// pass a closure over whatever holiday source they have.
pub trait HolidayCalendar {
    /// Returns true when the date is a public holiday.
    fn is_holiday(&self, date: NaiveDate) -> bool;
}

impl<F> HolidayCalendar for F
where
    F: Fn(NaiveDate) -> bool,
{
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self(date)
    }
}

/// A holiday calendar backed by an explicit set of dates.
#[derive(Debug, Clone, Default)]
pub struct FixedHolidays {
    dates: HashSet<NaiveDate>,
}

impl FixedHolidays {
    /// Creates a calendar from the given holiday dates.
    pub fn new<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Self {
        FixedHolidays {
            dates: dates.into_iter().collect(),
        }
    }
}

impl HolidayCalendar for FixedHolidays {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }
}

/// Derives the day category for a date.
///
/// The holiday lookup takes precedence: a Saturday that is a public
/// holiday classifies as [`DayCategory::Holiday`].
///
/// # Examples
///
/// ```
/// use dispatch_engine::calculation::{DayCategory, FixedHolidays, day_category};
/// use chrono::NaiveDate;
///
/// let calendar = FixedHolidays::new([NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()]);
///
/// // 2024-01-01 is a Monday, but a public holiday.
/// let new_years = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// assert_eq!(day_category(new_years, &calendar), DayCategory::Holiday);
///
/// // 2024-03-16 is a Saturday.
/// let saturday = NaiveDate::from_ymd_opt(2024, 3, 16).unwrap();
/// assert_eq!(day_category(saturday, &calendar), DayCategory::Saturday);
/// ```
pub fn day_category<C: HolidayCalendar + ?Sized>(date: NaiveDate, calendar: &C) -> DayCategory {
    if calendar.is_holiday(date) {
        return DayCategory::Holiday;
    }
    match date.weekday() {
        Weekday::Sat => DayCategory::Saturday,
        Weekday::Sun => DayCategory::Sunday,
        _ => DayCategory::Weekday,
    }
}

impl ShiftWindow {
    /// The day category of this window, always re-derived from
    /// `anchor_date`; never stored on the window itself.
    pub fn day_category<C: HolidayCalendar + ?Sized>(&self, calendar: &C) -> DayCategory {
        day_category(self.anchor_date, calendar)
    }
}
