//! Schedule aggregate and its realized operation result.
//!
//! A [`Schedule`] owns two ordered rosters of worker assignments (direct
//! employees and outsourced slots). Ordering is significant for display;
//! assignment identity is by `worker_id`. Once a schedule carries a
//! back-reference to a realized [`OperationResult`] it becomes immutable
//! and non-deletable; that rule is enforced by the service layer.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::shift_window::ShiftWindow;
use super::worker::WorkerAssignment;

/// Forms the deterministic roster grouping key exposed to the query layer.
///
/// # Examples
///
/// ```
/// use dispatch_engine::models::{ShiftCategory, roster_grouping_key};
/// use chrono::NaiveDate;
///
/// let key = roster_grouping_key(
///     "SITE1",
///     ShiftCategory::Night,
///     NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
/// );
/// assert_eq!(key, "SITE1-night-2024-03-15");
/// ```
pub fn roster_grouping_key(
    site_id: &str,
    shift_category: super::shift_window::ShiftCategory,
    date: chrono::NaiveDate,
) -> String {
    format!("{}-{}-{}", site_id, shift_category, date)
}

/// A planned dispatch of workers to one site for one shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Unique schedule id.
    pub id: String,
    /// The client site this schedule covers.
    pub site_id: String,
    /// The planning default shift window; assignment windows are
    /// synchronized from it on edit.
    pub window: ShiftWindow,
    /// The number of workers the site requires.
    pub required_personnel: u32,
    /// The site requires at least one qualified worker.
    pub qualification_required: bool,
    /// Assigned direct employees, in display order.
    pub employees: Vec<WorkerAssignment>,
    /// Assigned outsourced slots, in display order.
    pub outsourcers: Vec<WorkerAssignment>,
    /// Back-reference to the realized result; set once, then the schedule
    /// is immutable.
    pub operation_result_id: Option<String>,
}

impl Schedule {
    /// Creates an empty schedule for a site.
    pub fn new(id: &str, site_id: &str, window: ShiftWindow, required_personnel: u32) -> Self {
        Schedule {
            id: id.to_string(),
            site_id: site_id.to_string(),
            window,
            required_personnel,
            qualification_required: false,
            employees: Vec::new(),
            outsourcers: Vec::new(),
            operation_result_id: None,
        }
    }

    /// Returns the combined roster, employees first, in display order.
    pub fn workers(&self) -> Vec<&WorkerAssignment> {
        self.employees.iter().chain(self.outsourcers.iter()).collect()
    }

    /// Returns the roster grouping key for this schedule.
    pub fn grouping_key(&self) -> String {
        roster_grouping_key(
            &self.site_id,
            self.window.shift_category,
            self.window.anchor_date,
        )
    }

    /// Returns true once the schedule has been realized into a result.
    pub fn is_realized(&self) -> bool {
        self.operation_result_id.is_some()
    }

    /// Validates that every `worker_id` is unique across the whole roster.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] naming the first duplicated id.
    pub fn validate_roster(&self) -> EngineResult<()> {
        let mut seen = std::collections::HashSet::new();
        for worker in self.workers() {
            if !seen.insert(worker.worker_id.as_str()) {
                return Err(EngineError::Validation {
                    field: "worker_id".to_string(),
                    message: format!("duplicate worker id '{}' on roster", worker.worker_id),
                });
            }
        }
        Ok(())
    }

    /// Synchronizes every assignment's window from the schedule's planning
    /// window. Called by the service layer on every edit.
    pub fn sync_worker_windows(&mut self) {
        let window = self.window.clone();
        for worker in self.employees.iter_mut().chain(self.outsourcers.iter_mut()) {
            worker.window.sync_time_fields_from(&window);
        }
    }

    /// Moves an employee within the employee sequence.
    ///
    /// Indices are validated against the employee collection's own bounds;
    /// the outsourcer sequence is never involved.
    pub fn move_employee(&mut self, from: usize, to: usize) -> EngineResult<()> {
        Self::move_within(&mut self.employees, from, to, "employees")
    }

    /// Moves an outsourced slot within the outsourcer sequence.
    pub fn move_outsourcer(&mut self, from: usize, to: usize) -> EngineResult<()> {
        Self::move_within(&mut self.outsourcers, from, to, "outsourcers")
    }

    fn move_within(
        sequence: &mut Vec<WorkerAssignment>,
        from: usize,
        to: usize,
        field: &str,
    ) -> EngineResult<()> {
        if from >= sequence.len() || to >= sequence.len() {
            return Err(EngineError::Validation {
                field: field.to_string(),
                message: format!(
                    "move {} -> {} out of bounds for length {}",
                    from,
                    to,
                    sequence.len()
                ),
            });
        }
        let worker = sequence.remove(from);
        sequence.insert(to, worker);
        Ok(())
    }
}

/// The realized counterpart of a schedule.
///
/// Structurally parallel to [`Schedule`]; each assignment may diverge from
/// the originating schedule (different realized hours).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    /// Unique result id.
    pub id: String,
    /// The schedule this result realizes.
    pub schedule_id: String,
    /// The client site.
    pub site_id: String,
    /// The realized shift window.
    pub window: ShiftWindow,
    /// Realized direct employees.
    pub employees: Vec<WorkerAssignment>,
    /// Realized outsourced slots.
    pub outsourcers: Vec<WorkerAssignment>,
}

impl OperationResult {
    /// Creates a result from a schedule, copying its roster as realized.
    pub fn from_schedule(id: &str, schedule: &Schedule) -> Self {
        OperationResult {
            id: id.to_string(),
            schedule_id: schedule.id.clone(),
            site_id: schedule.site_id.clone(),
            window: schedule.window.clone(),
            employees: schedule.employees.clone(),
            outsourcers: schedule.outsourcers.clone(),
        }
    }

    /// Returns the combined realized roster, employees first.
    pub fn workers(&self) -> Vec<&WorkerAssignment> {
        self.employees.iter().chain(self.outsourcers.iter()).collect()
    }
}
