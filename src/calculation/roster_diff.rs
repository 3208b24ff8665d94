//! Roster change detection.
//!
//! Compares a schedule's current roster against the snapshot captured at
//! load time and classifies additions, removals, and in-place updates.
//! The result drives arrangement-notification invalidation: removed and
//! updated workers lose their notifications inside the committing edit's
//! transaction.

use crate::models::WorkerAssignment;

/// The classified difference between two rosters.
///
/// The three sets are disjoint by construction: a worker id appears in at
/// most one of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterDiff {
    /// Present in current, absent from the snapshot.
    pub added: Vec<WorkerAssignment>,
    /// Present in the snapshot, absent from current. Returned from the
    /// snapshot since they no longer exist in current.
    pub removed: Vec<WorkerAssignment>,
    /// Present in both with a changed time field or qualification/trainee
    /// flag; returned from current.
    pub updated: Vec<WorkerAssignment>,
}

impl RosterDiff {
    /// Returns true when nothing changed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }

    /// Worker ids that must lose their notifications (removed + updated).
    pub fn invalidated_worker_ids(&self) -> Vec<String> {
        self.removed
            .iter()
            .chain(self.updated.iter())
            .map(|w| w.worker_id.clone())
            .collect()
    }
}

/// Returns true iff the sorted worker-id sets of the two rosters differ.
///
/// Ordering changes alone do not count as a change.
///
/// # Examples
///
/// ```
/// use dispatch_engine::calculation::id_set_changed;
/// use dispatch_engine::models::{ShiftCategory, ShiftWindow, WorkerAssignment};
/// use chrono::NaiveDate;
///
/// let window = ShiftWindow {
///     anchor_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
///     shift_category: ShiftCategory::Day,
///     start_time_of_day: "09:00".to_string(),
///     end_time_of_day: "18:00".to_string(),
///     break_minutes: 60,
///     regulation_work_minutes: 480,
///     starts_next_day: false,
/// };
/// let a = WorkerAssignment::employee("A", window.clone());
/// let b = WorkerAssignment::employee("B", window);
///
/// // Reordering is not a change.
/// assert!(!id_set_changed(&[&a, &b], &[&b.clone(), &a.clone()]));
/// assert!(id_set_changed(&[&a], &[&b]));
/// ```
pub fn id_set_changed(current: &[&WorkerAssignment], before: &[&WorkerAssignment]) -> bool {
    sorted_ids(current) != sorted_ids(before)
}

fn sorted_ids<'a>(roster: &[&'a WorkerAssignment]) -> Vec<&'a str> {
    let mut ids: Vec<&str> = roster.iter().map(|w| w.worker_id.as_str()).collect();
    ids.sort_unstable();
    ids
}

/// Returns true when any field that affects the worker's arrangement
/// differs between the two versions of the same assignment.
fn assignment_changed(current: &WorkerAssignment, before: &WorkerAssignment) -> bool {
    current.window.start_time_of_day != before.window.start_time_of_day
        || current.window.starts_next_day != before.window.starts_next_day
        || current.window.end_time_of_day != before.window.end_time_of_day
        || current.window.break_minutes != before.window.break_minutes
        || current.is_qualified != before.is_qualified
        || current.is_trainee != before.is_trainee
}

/// Classifies the difference between the current roster and a snapshot.
///
/// An empty snapshot yields `added == current` with empty `removed` and
/// `updated`.
pub fn diff_rosters(current: &[&WorkerAssignment], before: &[&WorkerAssignment]) -> RosterDiff {
    let find_in = |roster: &[&WorkerAssignment], id: &str| -> Option<WorkerAssignment> {
        roster.iter().find(|w| w.worker_id == id).map(|w| (*w).clone())
    };

    let mut diff = RosterDiff::default();

    for worker in current {
        match find_in(before, &worker.worker_id) {
            None => diff.added.push((*worker).clone()),
            Some(previous) => {
                if assignment_changed(worker, &previous) {
                    diff.updated.push((*worker).clone());
                }
            }
        }
    }

    for worker in before {
        if find_in(current, &worker.worker_id).is_none() {
            diff.removed.push((*worker).clone());
        }
    }

    diff
}
