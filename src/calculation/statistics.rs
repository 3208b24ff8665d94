//! Work statistics aggregation.
//!
//! Folds the combined worker list of a realized result into categorized
//! totals: base vs qualified workers, each with a trainee sub-bucket, plus
//! a grand total over every worker. A single linear pass; no worker ever
//! contributes to more than one top-level category.

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::WorkerAssignment;

use super::shift_time::{ShiftTiming, calculate_shift_timing};

/// Quantity and minute totals for one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeTotals {
    /// Number of workers counted into this bucket.
    pub quantity: u32,
    /// Summed regular-time minutes.
    pub regular_time_work_minutes: i64,
    /// Summed overtime minutes.
    pub overtime_work_minutes: i64,
    /// Summed total worked minutes.
    pub total_work_minutes: i64,
}

impl TimeTotals {
    fn accumulate(&mut self, timing: &ShiftTiming) {
        self.quantity += 1;
        self.regular_time_work_minutes += timing.regular_time_work_minutes;
        self.overtime_work_minutes += timing.overtime_work_minutes;
        self.total_work_minutes += timing.total_work_minutes;
    }
}

/// Totals for one worker category, with its trainee sub-bucket.
///
/// The trainee bucket is a subset of the category's own totals: a trainee
/// counts into both, never additively on top.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotals {
    /// The category's own totals, trainees included.
    #[serde(flatten)]
    pub totals: TimeTotals,
    /// The subset of the category worked by trainees.
    pub trainee: TimeTotals,
}

impl CategoryTotals {
    fn accumulate(&mut self, timing: &ShiftTiming, is_trainee: bool) {
        self.totals.accumulate(timing);
        if is_trainee {
            self.trainee.accumulate(timing);
        }
    }
}

/// The categorized work statistics of one realized result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkStatistics {
    /// Workers without the site qualification.
    pub base: CategoryTotals,
    /// Workers holding the site qualification.
    pub qualified: CategoryTotals,
    /// Every worker regardless of category.
    pub total: CategoryTotals,
}

/// Aggregates the statistics of a result's combined worker list.
///
/// Each worker's minutes come from its own shift window; the fold
/// classifies by the qualification flag and feeds the trainee sub-bucket
/// when the trainee flag is set.
///
/// # Errors
///
/// Propagates the validation error of any worker window whose time-of-day
/// fields fail to parse.
pub fn aggregate_statistics(workers: &[&WorkerAssignment]) -> EngineResult<WorkStatistics> {
    let mut statistics = WorkStatistics::default();

    for worker in workers {
        let timing = calculate_shift_timing(&worker.window)?;
        let bucket = if worker.is_qualified {
            &mut statistics.qualified
        } else {
            &mut statistics.base
        };
        bucket.accumulate(&timing, worker.is_trainee);
        statistics.total.accumulate(&timing, worker.is_trainee);
    }

    Ok(statistics)
}
