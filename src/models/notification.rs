//! Arrangement notification model and per-worker status lifecycle.
//!
//! One notification document exists per `(schedule, worker)` pair, keyed
//! deterministically so recreation overwrites rather than duplicates. The
//! status lifecycle is `TEMPORARY → ARRANGED → CONFIRMED → ARRIVED →
//! LEAVED`, with `CANCELED` reachable from `ARRIVED` by administrative
//! action only. Transitions are pure methods taking the caller's clock, so
//! the service layer stays deterministic under test.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Forms the deterministic notification document key for a pair.
///
/// # Examples
///
/// ```
/// use dispatch_engine::models::notification_doc_key;
///
/// assert_eq!(notification_doc_key("S1", "E1"), "S1-E1");
/// assert_eq!(notification_doc_key("S1", "E1"), "S1-E1"); // stable
/// ```
pub fn notification_doc_key(schedule_id: &str, worker_id: &str) -> String {
    format!("{}-{}", schedule_id, worker_id)
}

/// Lifecycle status of a worker's arrangement on a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrangementStatus {
    /// Provisionally slotted; not yet notified.
    Temporary,
    /// Arranged and notified; awaiting worker confirmation.
    Arranged,
    /// Worker confirmed the dispatch.
    Confirmed,
    /// Worker arrived on site.
    Arrived,
    /// Worker left site; realized times recorded.
    Leaved,
    /// Canceled after arrival by administrative action.
    Canceled,
}

impl std::fmt::Display for ArrangementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ArrangementStatus::Temporary => "temporary",
            ArrangementStatus::Arranged => "arranged",
            ArrangementStatus::Confirmed => "confirmed",
            ArrangementStatus::Arrived => "arrived",
            ArrangementStatus::Leaved => "leaved",
            ArrangementStatus::Canceled => "canceled",
        };
        write!(f, "{}", label)
    }
}

/// The per-worker record tracking a dispatch's milestones.
///
/// Owned by the `(schedule, worker)` pair but persisted as its own document
/// for query and notification purposes. Created when a worker is first
/// arranged, overwritten on every status transition, bulk-deleted when the
/// owning schedule's timing changes or the worker is removed, and
/// permanently removed when the schedule is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrangementNotification {
    /// The owning schedule id.
    pub schedule_id: String,
    /// The assigned worker id.
    pub worker_id: String,
    /// Current lifecycle status.
    pub status: ArrangementStatus,
    /// Realized shift start; defaults to the scheduled start until LEAVED.
    pub actual_start_time: Option<NaiveDateTime>,
    /// Realized shift end; defaults to the scheduled end until LEAVED.
    pub actual_end_time: Option<NaiveDateTime>,
    /// Realized break minutes; defaults to the scheduled break until LEAVED.
    pub actual_break_minutes: Option<i64>,
    /// When the worker confirmed the dispatch.
    pub confirmed_at: Option<NaiveDateTime>,
    /// When the worker arrived on site.
    pub arrived_at: Option<NaiveDateTime>,
    /// When the worker left site.
    pub leaved_at: Option<NaiveDateTime>,
}

impl ArrangementNotification {
    /// Creates a notification in the given pre-confirmation status with the
    /// scheduled times as realized defaults and all milestones cleared.
    fn with_scheduled_times(
        schedule_id: &str,
        worker_id: &str,
        status: ArrangementStatus,
        scheduled_start: NaiveDateTime,
        scheduled_end: NaiveDateTime,
        scheduled_break_minutes: i64,
    ) -> Self {
        ArrangementNotification {
            schedule_id: schedule_id.to_string(),
            worker_id: worker_id.to_string(),
            status,
            actual_start_time: Some(scheduled_start),
            actual_end_time: Some(scheduled_end),
            actual_break_minutes: Some(scheduled_break_minutes),
            confirmed_at: None,
            arrived_at: None,
            leaved_at: None,
        }
    }

    /// Creates a provisional (TEMPORARY) notification.
    pub fn temporary(
        schedule_id: &str,
        worker_id: &str,
        scheduled_start: NaiveDateTime,
        scheduled_end: NaiveDateTime,
        scheduled_break_minutes: i64,
    ) -> Self {
        Self::with_scheduled_times(
            schedule_id,
            worker_id,
            ArrangementStatus::Temporary,
            scheduled_start,
            scheduled_end,
            scheduled_break_minutes,
        )
    }

    /// Creates an ARRANGED notification.
    pub fn arranged(
        schedule_id: &str,
        worker_id: &str,
        scheduled_start: NaiveDateTime,
        scheduled_end: NaiveDateTime,
        scheduled_break_minutes: i64,
    ) -> Self {
        Self::with_scheduled_times(
            schedule_id,
            worker_id,
            ArrangementStatus::Arranged,
            scheduled_start,
            scheduled_end,
            scheduled_break_minutes,
        )
    }

    /// Returns the deterministic document key for this notification.
    pub fn doc_key(&self) -> String {
        notification_doc_key(&self.schedule_id, &self.worker_id)
    }

    /// Records the worker's confirmation.
    ///
    /// Idempotent on the timestamp: an already-set `confirmed_at` is
    /// preserved. Milestones after confirmation are cleared.
    pub fn confirm(&mut self, now: NaiveDateTime) {
        self.status = ArrangementStatus::Confirmed;
        self.confirmed_at = self.confirmed_at.or(Some(now));
        self.arrived_at = None;
        self.leaved_at = None;
    }

    /// Records the worker's arrival on site.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] when the dispatch was never
    /// confirmed.
    pub fn arrive(&mut self, now: NaiveDateTime) -> EngineResult<()> {
        if self.confirmed_at.is_none() {
            return Err(EngineError::Validation {
                field: "confirmed_at".to_string(),
                message: "arrival requires a prior confirmation".to_string(),
            });
        }
        self.status = ArrangementStatus::Arrived;
        self.arrived_at = self.arrived_at.or(Some(now));
        Ok(())
    }

    /// Records the worker leaving site with the realized times.
    ///
    /// Earlier milestones are preserved if already set.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] when any of the realized start,
    /// end, or break minutes is missing.
    pub fn leave(
        &mut self,
        now: NaiveDateTime,
        actual_start_time: Option<NaiveDateTime>,
        actual_end_time: Option<NaiveDateTime>,
        actual_break_minutes: Option<i64>,
    ) -> EngineResult<()> {
        let missing = [
            ("actual_start_time", actual_start_time.is_none()),
            ("actual_end_time", actual_end_time.is_none()),
            ("actual_break_minutes", actual_break_minutes.is_none()),
        ]
        .iter()
        .find(|(_, is_missing)| *is_missing)
        .map(|(field, _)| *field);

        if let Some(field) = missing {
            return Err(EngineError::Validation {
                field: field.to_string(),
                message: "leaving requires the realized shift times".to_string(),
            });
        }

        self.status = ArrangementStatus::Leaved;
        self.actual_start_time = actual_start_time;
        self.actual_end_time = actual_end_time;
        self.actual_break_minutes = actual_break_minutes;
        self.leaved_at = self.leaved_at.or(Some(now));
        Ok(())
    }

    /// Cancels the dispatch by administrative action.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] unless the worker has arrived;
    /// cancellation is only reachable from ARRIVED.
    pub fn cancel(&mut self) -> EngineResult<()> {
        if self.status != ArrangementStatus::Arrived {
            return Err(EngineError::Validation {
                field: "status".to_string(),
                message: format!("cannot cancel from status '{}'", self.status),
            });
        }
        self.status = ArrangementStatus::Canceled;
        Ok(())
    }

    /// Administrative reset after the assignment itself changed.
    ///
    /// Reverts to ARRANGED with the (possibly new) scheduled times as
    /// realized defaults and all milestones cleared.
    pub fn reset_to_arranged(
        &mut self,
        scheduled_start: NaiveDateTime,
        scheduled_end: NaiveDateTime,
        scheduled_break_minutes: i64,
    ) {
        self.status = ArrangementStatus::Arranged;
        self.actual_start_time = Some(scheduled_start);
        self.actual_end_time = Some(scheduled_end);
        self.actual_break_minutes = Some(scheduled_break_minutes);
        self.confirmed_at = None;
        self.arrived_at = None;
        self.leaved_at = None;
    }
}
