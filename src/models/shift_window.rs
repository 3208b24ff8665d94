//! Shift window value object.
//!
//! This module defines the [`ShiftWindow`] struct describing a single work
//! period: anchor date, day/night category, start and end times of day,
//! break minutes, and the contracted regulation-minute threshold.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Whether a shift is a day shift or a night shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftCategory {
    /// Daytime shift.
    Day,
    /// Nighttime shift (typically midnight-spanning).
    Night,
}

impl std::fmt::Display for ShiftCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShiftCategory::Day => write!(f, "day"),
            ShiftCategory::Night => write!(f, "night"),
        }
    }
}

/// Parses a zero-padded "HH:MM" time-of-day string.
///
/// # Arguments
///
/// * `field` - The field name reported on validation failure
/// * `value` - The "HH:MM" string to parse
///
/// # Errors
///
/// Returns [`EngineError::Validation`] when the string is not a valid
/// zero-padded "HH:MM" time.
///
/// # Examples
///
/// ```
/// use dispatch_engine::models::parse_time_of_day;
/// use chrono::NaiveTime;
///
/// let time = parse_time_of_day("start_time_of_day", "09:30").unwrap();
/// assert_eq!(time, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
/// assert!(parse_time_of_day("start_time_of_day", "9:30").is_err());
/// ```
pub fn parse_time_of_day(field: &str, value: &str) -> EngineResult<NaiveTime> {
    // Reject non-zero-padded forms up front; lexicographic ordering of these
    // strings is only valid when both operands are zero-padded.
    if value.len() != 5 || value.as_bytes()[2] != b':' {
        return Err(EngineError::Validation {
            field: field.to_string(),
            message: format!("expected zero-padded HH:MM, got '{}'", value),
        });
    }

    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| EngineError::Validation {
        field: field.to_string(),
        message: format!("expected zero-padded HH:MM, got '{}'", value),
    })
}

/// The date/time/break/regulation description of a single work period.
///
/// A `ShiftWindow` is embedded in every entity that describes a shift: the
/// schedule's planning default, each worker assignment, and each realized
/// result line. All timing quantities (start/end instants, midnight span,
/// regular/overtime minute split) are derived on read from these fields by
/// [`calculate_shift_timing`](crate::calculation::calculate_shift_timing)
/// and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftWindow {
    /// The calendar date anchoring the shift (time of day zeroed).
    pub anchor_date: NaiveDate,
    /// Day or night shift.
    pub shift_category: ShiftCategory,
    /// Shift start time of day as a zero-padded "HH:MM" string.
    pub start_time_of_day: String,
    /// Shift end time of day as a zero-padded "HH:MM" string.
    pub end_time_of_day: String,
    /// Unpaid break minutes subtracted from the worked span.
    pub break_minutes: i64,
    /// The contracted minute threshold beyond which work is overtime.
    pub regulation_work_minutes: i64,
    /// The shift's real start is the day after `anchor_date`.
    #[serde(default)]
    pub starts_next_day: bool,
}

impl ShiftWindow {
    /// Returns true when the shift crosses midnight.
    ///
    /// Lexicographic comparison of the two zero-padded "HH:MM" strings is
    /// equivalent to comparing the parsed times.
    ///
    /// # Examples
    ///
    /// ```
    /// use dispatch_engine::models::{ShiftCategory, ShiftWindow};
    /// use chrono::NaiveDate;
    ///
    /// let window = ShiftWindow {
    ///     anchor_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
    ///     shift_category: ShiftCategory::Night,
    ///     start_time_of_day: "22:00".to_string(),
    ///     end_time_of_day: "06:00".to_string(),
    ///     break_minutes: 60,
    ///     regulation_work_minutes: 480,
    ///     starts_next_day: false,
    /// };
    /// assert!(window.spans_midnight());
    /// ```
    pub fn spans_midnight(&self) -> bool {
        self.start_time_of_day > self.end_time_of_day
    }

    /// Returns true when the fields relevant to worked time are equal.
    ///
    /// Used to decide whether a schedule edit invalidates the arrangement
    /// notifications issued under the previous timing.
    pub fn time_fields_eq(&self, other: &ShiftWindow) -> bool {
        self.anchor_date == other.anchor_date
            && self.start_time_of_day == other.start_time_of_day
            && self.end_time_of_day == other.end_time_of_day
            && self.break_minutes == other.break_minutes
            && self.starts_next_day == other.starts_next_day
    }

    /// Copies the timing fields of `source` into this window.
    ///
    /// Worker assignment windows are synchronized from the schedule's
    /// planning window on every edit; only the timing fields travel, the
    /// assignment keeps its own identity fields.
    pub fn sync_time_fields_from(&mut self, source: &ShiftWindow) {
        self.anchor_date = source.anchor_date;
        self.shift_category = source.shift_category;
        self.start_time_of_day = source.start_time_of_day.clone();
        self.end_time_of_day = source.end_time_of_day.clone();
        self.break_minutes = source.break_minutes;
        self.regulation_work_minutes = source.regulation_work_minutes;
        self.starts_next_day = source.starts_next_day;
    }
}
