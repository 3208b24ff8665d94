//! Schedule service.
//!
//! Implements the consistency-critical schedule flows: the snapshot-diff
//! edit pipeline (diff the roster against the pre-edit snapshot, invalidate
//! the affected notifications, and commit the schedule in one transaction),
//! immutability enforcement once a schedule is realized, deletion with
//! notification purge, and realization into an operation result.

use tracing::info;
use uuid::Uuid;

use crate::calculation::{RosterDiff, diff_rosters};
use crate::error::{EngineError, EngineResult};
use crate::models::{OperationResult, Schedule};

use super::arrangement::ArrangementService;
use super::document::DocumentStore;

/// The collection holding schedule documents.
pub const SCHEDULES_COLLECTION: &str = "schedules";
/// The collection holding operation result documents.
pub const RESULTS_COLLECTION: &str = "operation_results";

/// Service for schedule mutation, deletion, and realization.
pub struct ScheduleService<'a, S: DocumentStore> {
    store: &'a S,
    arrangements: ArrangementService<'a, S>,
}

impl<'a, S: DocumentStore> ScheduleService<'a, S> {
    /// Creates a service over the given store.
    pub fn new(store: &'a S) -> Self {
        ScheduleService {
            store,
            arrangements: ArrangementService::new(store),
        }
    }

    /// Creates a schedule document.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] when the roster carries a
    /// duplicate worker id.
    pub fn create(&self, schedule: &Schedule) -> EngineResult<()> {
        schedule
            .validate_roster()
            .map_err(|e| e.in_operation("create_schedule", format!("schedule_id={}", schedule.id)))?;
        self.store
            .create(SCHEDULES_COLLECTION, &schedule.id, schedule, None)?;
        info!(schedule_id = %schedule.id, site_id = %schedule.site_id, "schedule created");
        Ok(())
    }

    /// Fetches a schedule by id.
    pub fn fetch(&self, schedule_id: &str) -> EngineResult<Schedule> {
        self.store
            .fetch_one(SCHEDULES_COLLECTION, schedule_id)?
            .ok_or_else(|| EngineError::NotFound {
                entity: "Schedule".to_string(),
                id: schedule_id.to_string(),
            })
    }

    /// Commits an edit of `schedule` against the snapshot loaded before the
    /// edit.
    ///
    /// The assignment windows are synchronized from the schedule's planning
    /// window, the roster is diffed against the snapshot, and the affected
    /// notifications are invalidated in the same transaction that writes
    /// the schedule: every notification when the planning window's timing
    /// changed, otherwise only those of removed and updated workers.
    ///
    /// Returns the roster diff so the caller can arrange newly added
    /// workers.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ImmutabilityViolation`] when the snapshot
    /// already carries a realized result, and [`EngineError::Validation`]
    /// on a duplicate worker id.
    pub fn update(&self, schedule: &mut Schedule, before: &Schedule) -> EngineResult<RosterDiff> {
        let detail = format!("schedule_id={}", schedule.id);

        if before.is_realized() {
            return Err(EngineError::ImmutabilityViolation {
                schedule_id: schedule.id.clone(),
                message: "schedule already has an operation result".to_string(),
            }
            .in_operation("update_schedule", detail));
        }
        schedule
            .validate_roster()
            .map_err(|e| e.in_operation("update_schedule", detail.clone()))?;

        schedule.sync_worker_windows();
        let diff = diff_rosters(&schedule.workers(), &before.workers());

        // A timing change on the planning window invalidates every
        // notification; otherwise only removed/updated workers lose theirs.
        let invalidate_all = !schedule.window.time_fields_eq(&before.window);
        let worker_ids = if invalidate_all {
            Vec::new()
        } else {
            diff.invalidated_worker_ids()
        };
        let skip_invalidation = !invalidate_all && worker_ids.is_empty();

        self.store.run_in_transaction(|tx| {
            if !skip_invalidation {
                self.arrangements.invalidate(&schedule.id, &worker_ids, Some(tx))?;
            }
            tx.put(SCHEDULES_COLLECTION, &schedule.id, schedule)
        })?;

        info!(
            schedule_id = %schedule.id,
            added = diff.added.len(),
            removed = diff.removed.len(),
            updated = diff.updated.len(),
            invalidate_all,
            "schedule updated"
        );
        Ok(diff)
    }

    /// Deletes a schedule and purges all of its notifications atomically.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ImmutabilityViolation`] when the schedule has
    /// been realized.
    pub fn delete(&self, schedule: &Schedule) -> EngineResult<()> {
        if schedule.is_realized() {
            return Err(EngineError::ImmutabilityViolation {
                schedule_id: schedule.id.clone(),
                message: "realized schedules cannot be deleted".to_string(),
            }
            .in_operation("delete_schedule", format!("schedule_id={}", schedule.id)));
        }

        self.store.run_in_transaction(|tx| {
            self.arrangements.invalidate(&schedule.id, &[], Some(tx))?;
            tx.delete(SCHEDULES_COLLECTION, &schedule.id);
            Ok(())
        })?;
        info!(schedule_id = %schedule.id, "schedule deleted");
        Ok(())
    }

    /// Realizes a schedule into an operation result.
    ///
    /// Copies the roster into a new result, stores it, and writes the
    /// back-reference onto the schedule in the same transaction. From then
    /// on the schedule is immutable.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnsupportedOperation`] when the schedule was
    /// already realized.
    pub fn realize(&self, schedule: &mut Schedule) -> EngineResult<OperationResult> {
        if schedule.is_realized() {
            return Err(EngineError::UnsupportedOperation {
                operation: "realize_schedule".to_string(),
                message: format!("schedule '{}' already has an operation result", schedule.id),
            });
        }

        let result_id = Uuid::new_v4().to_string();
        let result = OperationResult::from_schedule(&result_id, schedule);
        schedule.operation_result_id = Some(result_id.clone());

        self.store.run_in_transaction(|tx| {
            tx.put(RESULTS_COLLECTION, &result.id, &result)?;
            tx.put(SCHEDULES_COLLECTION, &schedule.id, schedule)
        })?;

        info!(schedule_id = %schedule.id, result_id = %result.id, "schedule realized");
        Ok(result)
    }

    /// Fetches an operation result by id.
    pub fn fetch_result(&self, result_id: &str) -> EngineResult<OperationResult> {
        self.store
            .fetch_one(RESULTS_COLLECTION, result_id)?
            .ok_or_else(|| EngineError::NotFound {
                entity: "OperationResult".to_string(),
                id: result_id.to_string(),
            })
    }
}
