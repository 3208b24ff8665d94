//! Worker assignment model.
//!
//! This module defines the [`WorkerAssignment`] value object placed on a
//! schedule's roster, and the deterministic worker-id formation rules for
//! employees and outsourced slots.

use serde::{Deserialize, Serialize};

use super::shift_window::ShiftWindow;

/// Forms the worker id for a direct employee: the employee id verbatim.
pub fn employee_worker_id(employee_id: &str) -> String {
    employee_id.to_string()
}

/// Forms the worker id for an outsourced slot.
///
/// The slot index allows one outsourcer to fill several units on the same
/// roster while keeping worker ids unique.
///
/// # Examples
///
/// ```
/// use dispatch_engine::models::outsourcer_worker_id;
///
/// assert_eq!(outsourcer_worker_id("OUT7", 0), "OUT7:0");
/// assert_eq!(outsourcer_worker_id("OUT7", 1), "OUT7:1");
/// ```
pub fn outsourcer_worker_id(outsourcer_id: &str, index: usize) -> String {
    format!("{}:{}", outsourcer_id, index)
}

/// A worker assigned to one slot of a schedule or result roster.
///
/// Assignments are owned by their schedule and have no independent
/// lifecycle. Identity within a roster is by `worker_id`; ordering within
/// the employees/outsourcers sequences is significant for display only.
/// The dispatch lifecycle status lives on the pair's arrangement
/// notification document, not on the roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerAssignment {
    /// Employee id verbatim, or `outsourcerId:index` for outsourced slots.
    pub worker_id: String,
    /// True for a direct employee, false for an outsourced worker.
    pub is_employee: bool,
    /// Worker holds the qualification the site may require.
    pub is_qualified: bool,
    /// Worker is under supervised on-the-job training.
    pub is_trainee: bool,
    /// The shift window this worker is assigned to, synchronized from the
    /// owning schedule on edit.
    pub window: ShiftWindow,
}

impl WorkerAssignment {
    /// Creates an assignment for a direct employee.
    pub fn employee(employee_id: &str, window: ShiftWindow) -> Self {
        WorkerAssignment {
            worker_id: employee_worker_id(employee_id),
            is_employee: true,
            is_qualified: false,
            is_trainee: false,
            window,
        }
    }

    /// Creates an assignment for one outsourced slot.
    pub fn outsourcer(outsourcer_id: &str, index: usize, window: ShiftWindow) -> Self {
        WorkerAssignment {
            worker_id: outsourcer_worker_id(outsourcer_id, index),
            is_employee: false,
            is_qualified: false,
            is_trainee: false,
            window,
        }
    }

    /// Returns a copy flagged as qualified.
    pub fn qualified(mut self) -> Self {
        self.is_qualified = true;
        self
    }

    /// Returns a copy flagged as a trainee.
    pub fn trainee(mut self) -> Self {
        self.is_trainee = true;
        self
    }
}
