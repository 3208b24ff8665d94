//! Shift timing calculation.
//!
//! Turns a [`ShiftWindow`]'s raw date and time-of-day fields into precise
//! instants and the minute-level regular/overtime split, handling
//! midnight-spanning shifts and next-day starts. All quantities are pure
//! functions of the window's canonical fields and are never stored.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::{ShiftWindow, parse_time_of_day};

/// The derived timing of one shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftTiming {
    /// The precise shift start.
    pub starts_at: NaiveDateTime,
    /// The precise shift end.
    pub ends_at: NaiveDateTime,
    /// The shift crosses midnight.
    pub spans_midnight: bool,
    /// Worked minutes after subtracting the break; never negative.
    pub total_work_minutes: i64,
    /// Worked minutes up to the regulation threshold.
    pub regular_time_work_minutes: i64,
    /// Worked minutes beyond the regulation threshold.
    pub overtime_work_minutes: i64,
}

/// Calculates the timing of a shift window.
///
/// - the start instant is the anchor date at the start time of day, plus
///   one day when the shift starts the next day;
/// - the end instant additionally gains one day when the shift crosses
///   midnight (so 0, 1, or 2 days past the anchor in total);
/// - `total_work_minutes` floors at zero for malformed inputs (a break
///   longer than the span never produces negative work).
///
/// # Errors
///
/// Returns [`EngineError::Validation`](crate::error::EngineError::Validation)
/// when either time-of-day string is not zero-padded "HH:MM".
///
/// # Examples
///
/// ```
/// use dispatch_engine::calculation::calculate_shift_timing;
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
///
/// let timing = calculate_shift_timing(&window).unwrap();
/// assert!(timing.spans_midnight);
/// assert_eq!(timing.total_work_minutes, 420);
/// ```
pub fn calculate_shift_timing(window: &ShiftWindow) -> EngineResult<ShiftTiming> {
    let start_time = parse_time_of_day("start_time_of_day", &window.start_time_of_day)?;
    let end_time = parse_time_of_day("end_time_of_day", &window.end_time_of_day)?;

    let spans_midnight = window.spans_midnight();
    let start_offset_days = i64::from(window.starts_next_day);
    let end_offset_days = start_offset_days + i64::from(spans_midnight);

    let starts_at = window.anchor_date.and_time(start_time) + Duration::days(start_offset_days);
    let ends_at = window.anchor_date.and_time(end_time) + Duration::days(end_offset_days);

    let span_minutes = (ends_at - starts_at).num_minutes();
    let total_work_minutes = (span_minutes - window.break_minutes).max(0);
    let regular_time_work_minutes = total_work_minutes.min(window.regulation_work_minutes.max(0));
    let overtime_work_minutes = (total_work_minutes - window.regulation_work_minutes.max(0)).max(0);

    Ok(ShiftTiming {
        starts_at,
        ends_at,
        spans_midnight,
        total_work_minutes,
        regular_time_work_minutes,
        overtime_work_minutes,
    })
}
