//! Arrangement notification service.
//!
//! Persists the per-worker notification lifecycle on top of the document
//! store: provisionally reserving and arranging workers, recording
//! confirmation/arrival/departure milestones, administrative resets and
//! cancellation, and the bulk invalidation that runs inside a schedule
//! edit's transaction.

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::calculation::calculate_shift_timing;
use crate::error::{EngineError, EngineResult};
use crate::models::{ArrangementNotification, WorkerAssignment, notification_doc_key};

use super::document::{DocumentStore, Transaction};

/// The collection holding arrangement notification documents.
pub const NOTIFICATIONS_COLLECTION: &str = "arrangement_notifications";

/// Service for the per-worker arrangement notification lifecycle.
pub struct ArrangementService<'a, S: DocumentStore> {
    store: &'a S,
}

impl<'a, S: DocumentStore> ArrangementService<'a, S> {
    /// Creates a service over the given store.
    pub fn new(store: &'a S) -> Self {
        ArrangementService { store }
    }

    /// Provisionally slots a worker on a schedule, creating (or
    /// overwriting) the notification document in TEMPORARY status.
    /// Arranging the same pair later promotes the document to ARRANGED.
    pub fn reserve(
        &self,
        schedule_id: &str,
        worker: &WorkerAssignment,
        tx: Option<&mut Transaction>,
    ) -> EngineResult<ArrangementNotification> {
        let notification =
            self.slot("reserve", schedule_id, worker, ArrangementNotification::temporary, tx)?;
        debug!(schedule_id, worker_id = %worker.worker_id, "worker provisionally slotted");
        Ok(notification)
    }

    /// Arranges a worker on a schedule, creating (or overwriting) the
    /// notification document with the scheduled times as realized defaults.
    pub fn arrange(
        &self,
        schedule_id: &str,
        worker: &WorkerAssignment,
        tx: Option<&mut Transaction>,
    ) -> EngineResult<ArrangementNotification> {
        let notification =
            self.slot("arrange", schedule_id, worker, ArrangementNotification::arranged, tx)?;
        debug!(schedule_id, worker_id = %worker.worker_id, "worker arranged");
        Ok(notification)
    }

    fn slot(
        &self,
        operation: &str,
        schedule_id: &str,
        worker: &WorkerAssignment,
        build: fn(&str, &str, NaiveDateTime, NaiveDateTime, i64) -> ArrangementNotification,
        tx: Option<&mut Transaction>,
    ) -> EngineResult<ArrangementNotification> {
        let timing = calculate_shift_timing(&worker.window).map_err(|e| {
            e.in_operation(
                operation,
                format!("schedule_id={} worker_id={}", schedule_id, worker.worker_id),
            )
        })?;
        let notification = build(
            schedule_id,
            &worker.worker_id,
            timing.starts_at,
            timing.ends_at,
            worker.window.break_minutes,
        );
        self.store.create(
            NOTIFICATIONS_COLLECTION,
            &notification.doc_key(),
            &notification,
            tx,
        )?;
        Ok(notification)
    }

    /// Fetches the notification of a `(schedule, worker)` pair.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when no notification exists.
    pub fn fetch(&self, schedule_id: &str, worker_id: &str) -> EngineResult<ArrangementNotification> {
        let key = notification_doc_key(schedule_id, worker_id);
        self.store
            .fetch_one(NOTIFICATIONS_COLLECTION, &key)?
            .ok_or_else(|| EngineError::NotFound {
                entity: "ArrangementNotification".to_string(),
                id: key,
            })
    }

    /// All notifications currently on a schedule, in worker-id order.
    pub fn fetch_for_schedule(&self, schedule_id: &str) -> EngineResult<Vec<ArrangementNotification>> {
        let prefix = format!("{}-", schedule_id);
        Ok(self
            .store
            .fetch_prefix(NOTIFICATIONS_COLLECTION, &prefix)?
            .into_iter()
            .map(|(_, notification)| notification)
            .collect())
    }

    /// Records the worker's confirmation.
    pub fn confirm(
        &self,
        schedule_id: &str,
        worker_id: &str,
        now: NaiveDateTime,
    ) -> EngineResult<ArrangementNotification> {
        self.transition("confirm", schedule_id, worker_id, |notification| {
            notification.confirm(now);
            Ok(())
        })
    }

    /// Records the worker's arrival.
    pub fn arrive(
        &self,
        schedule_id: &str,
        worker_id: &str,
        now: NaiveDateTime,
    ) -> EngineResult<ArrangementNotification> {
        self.transition("arrive", schedule_id, worker_id, |notification| {
            notification.arrive(now)
        })
    }

    /// Records the worker leaving with the realized times.
    pub fn leave(
        &self,
        schedule_id: &str,
        worker_id: &str,
        now: NaiveDateTime,
        actual_start_time: Option<NaiveDateTime>,
        actual_end_time: Option<NaiveDateTime>,
        actual_break_minutes: Option<i64>,
    ) -> EngineResult<ArrangementNotification> {
        self.transition("leave", schedule_id, worker_id, |notification| {
            notification.leave(now, actual_start_time, actual_end_time, actual_break_minutes)
        })
    }

    /// Cancels an arrived worker's dispatch by administrative action.
    pub fn cancel(&self, schedule_id: &str, worker_id: &str) -> EngineResult<ArrangementNotification> {
        self.transition("cancel", schedule_id, worker_id, |notification| {
            notification.cancel()
        })
    }

    /// Administrative reset back to ARRANGED after the assignment changed,
    /// re-deriving the scheduled times from the worker's current window.
    pub fn reset(
        &self,
        schedule_id: &str,
        worker: &WorkerAssignment,
    ) -> EngineResult<ArrangementNotification> {
        let timing = calculate_shift_timing(&worker.window).map_err(|e| {
            e.in_operation(
                "reset",
                format!("schedule_id={} worker_id={}", schedule_id, worker.worker_id),
            )
        })?;
        self.transition("reset", schedule_id, &worker.worker_id, |notification| {
            notification.reset_to_arranged(timing.starts_at, timing.ends_at, worker.window.break_minutes);
            Ok(())
        })
    }

    fn transition<F>(
        &self,
        operation: &str,
        schedule_id: &str,
        worker_id: &str,
        apply: F,
    ) -> EngineResult<ArrangementNotification>
    where
        F: FnOnce(&mut ArrangementNotification) -> EngineResult<()>,
    {
        let detail = format!("schedule_id={} worker_id={}", schedule_id, worker_id);
        let mut notification = self
            .fetch(schedule_id, worker_id)
            .map_err(|e| e.in_operation(operation, detail.clone()))?;
        let before_status = notification.status;

        apply(&mut notification).map_err(|e| {
            e.in_operation(operation, format!("{} status={}", detail, before_status))
        })?;

        // Every transition overwrites the single document for the pair.
        self.store.update(
            NOTIFICATIONS_COLLECTION,
            &notification.doc_key(),
            &notification,
            None,
        )?;
        debug!(
            schedule_id,
            worker_id,
            from = %before_status,
            to = %notification.status,
            "arrangement transition"
        );
        Ok(notification)
    }

    /// Bulk-deletes notification documents for a schedule.
    ///
    /// With an empty `worker_ids` list every notification of the schedule
    /// is deleted (a no-op when there are none); a non-empty list deletes
    /// only the matching per-worker documents. All deletions commit
    /// atomically: inside `tx` when given, else in a freshly opened
    /// transaction.
    ///
    /// Returns the number of documents deleted.
    pub fn invalidate(
        &self,
        schedule_id: &str,
        worker_ids: &[String],
        tx: Option<&mut Transaction>,
    ) -> EngineResult<usize> {
        let deleted = match tx {
            Some(tx) => self.invalidate_in(schedule_id, worker_ids, tx)?,
            None => self.store.run_in_transaction(|tx| {
                self.invalidate_in(schedule_id, worker_ids, tx)
            })?,
        };
        if deleted > 0 {
            info!(schedule_id, deleted, "invalidated arrangement notifications");
        }
        Ok(deleted)
    }

    fn invalidate_in(
        &self,
        schedule_id: &str,
        worker_ids: &[String],
        tx: &mut Transaction,
    ) -> EngineResult<usize> {
        let keys: Vec<String> = if worker_ids.is_empty() {
            let prefix = format!("{}-", schedule_id);
            self.store
                .fetch_prefix::<ArrangementNotification>(NOTIFICATIONS_COLLECTION, &prefix)?
                .into_iter()
                .map(|(key, _)| key)
                .collect()
        } else {
            let mut keys = Vec::new();
            for worker_id in worker_ids {
                let key = notification_doc_key(schedule_id, worker_id);
                let exists = self
                    .store
                    .fetch_one::<ArrangementNotification>(NOTIFICATIONS_COLLECTION, &key)?
                    .is_some();
                if exists {
                    keys.push(key);
                }
            }
            keys
        };

        for key in &keys {
            tx.delete(NOTIFICATIONS_COLLECTION, key);
        }
        Ok(keys.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArrangementStatus, ShiftCategory, ShiftWindow};
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn make_window() -> ShiftWindow {
        ShiftWindow {
            anchor_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            shift_category: ShiftCategory::Day,
            start_time_of_day: "09:00".to_string(),
            end_time_of_day: "18:00".to_string(),
            break_minutes: 60,
            regulation_work_minutes: 480,
            starts_next_day: false,
        }
    }

    fn ts(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn arrange_worker(store: &MemoryStore, worker_id: &str) {
        let service = ArrangementService::new(store);
        let worker = WorkerAssignment::employee(worker_id, make_window());
        service.arrange("S1", &worker, None).unwrap();
    }

    /// AS-001: arranging creates the notification at the deterministic key
    #[test]
    fn test_arrange_creates_document() {
        let store = MemoryStore::new();
        arrange_worker(&store, "E1");

        let service = ArrangementService::new(&store);
        let notification = service.fetch("S1", "E1").unwrap();
        assert_eq!(notification.status, ArrangementStatus::Arranged);
        assert_eq!(notification.actual_start_time, Some(ts(9, 0)));
        assert_eq!(notification.actual_end_time, Some(ts(18, 0)));
        assert_eq!(notification.actual_break_minutes, Some(60));
    }

    /// AS-002: re-arranging overwrites, never duplicates
    #[test]
    fn test_arrange_overwrites() {
        let store = MemoryStore::new();
        arrange_worker(&store, "E1");
        arrange_worker(&store, "E1");
        assert_eq!(store.count(NOTIFICATIONS_COLLECTION), 1);
    }

    /// AS-003: full milestone sequence persists each transition
    #[test]
    fn test_transition_sequence() {
        let store = MemoryStore::new();
        arrange_worker(&store, "E1");
        let service = ArrangementService::new(&store);

        service.confirm("S1", "E1", ts(8, 30)).unwrap();
        service.arrive("S1", "E1", ts(8, 55)).unwrap();
        let notification = service
            .leave("S1", "E1", ts(18, 5), Some(ts(9, 0)), Some(ts(18, 0)), Some(45))
            .unwrap();

        assert_eq!(notification.status, ArrangementStatus::Leaved);

        let persisted = service.fetch("S1", "E1").unwrap();
        assert_eq!(persisted, notification);
        assert_eq!(persisted.confirmed_at, Some(ts(8, 30)));
    }

    /// AS-004: transition on a missing pair is NotFound with context
    #[test]
    fn test_transition_missing_notification() {
        let store = MemoryStore::new();
        let service = ArrangementService::new(&store);
        let err = service.confirm("S1", "ghost", ts(8, 30)).unwrap_err();
        let rendered = err.to_string();
        assert!(rendered.contains("confirm"));
        assert!(rendered.contains("ghost"));
    }

    /// AS-005: invalid transition leaves the document untouched
    #[test]
    fn test_failed_transition_not_persisted() {
        let store = MemoryStore::new();
        arrange_worker(&store, "E1");
        let service = ArrangementService::new(&store);

        // Arrival without confirmation fails.
        assert!(service.arrive("S1", "E1", ts(8, 55)).is_err());
        let persisted = service.fetch("S1", "E1").unwrap();
        assert_eq!(persisted.status, ArrangementStatus::Arranged);
    }

    /// AS-006: empty worker list deletes every notification of the schedule
    #[test]
    fn test_invalidate_all() {
        let store = MemoryStore::new();
        arrange_worker(&store, "E1");
        arrange_worker(&store, "E2");
        let service = ArrangementService::new(&store);
        // A different schedule's notification must survive.
        let other = WorkerAssignment::employee("E1", make_window());
        service.arrange("S2", &other, None).unwrap();

        let deleted = service.invalidate("S1", &[], None).unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(store.count(NOTIFICATIONS_COLLECTION), 1);
        assert!(service.fetch("S2", "E1").is_ok());
    }

    /// AS-007: non-empty list deletes only the matching documents
    #[test]
    fn test_invalidate_selected() {
        let store = MemoryStore::new();
        arrange_worker(&store, "E1");
        arrange_worker(&store, "E2");
        let service = ArrangementService::new(&store);

        let deleted = service.invalidate("S1", &["E1".to_string()], None).unwrap();
        assert_eq!(deleted, 1);
        assert!(service.fetch("S1", "E1").is_err());
        assert!(service.fetch("S1", "E2").is_ok());
    }

    /// AS-008: empty list with no notifications is a no-op
    #[test]
    fn test_invalidate_empty_is_noop() {
        let store = MemoryStore::new();
        let service = ArrangementService::new(&store);
        let deleted = service.invalidate("S1", &[], None).unwrap();
        assert_eq!(deleted, 0);
    }

    /// AS-009: ids without documents count zero deletions
    #[test]
    fn test_invalidate_unknown_ids() {
        let store = MemoryStore::new();
        arrange_worker(&store, "E1");
        let service = ArrangementService::new(&store);
        let deleted = service.invalidate("S1", &["ghost".to_string()], None).unwrap();
        assert_eq!(deleted, 0);
        assert!(service.fetch("S1", "E1").is_ok());
    }

    /// AS-010: invalidation joins an injected transaction
    #[test]
    fn test_invalidate_inside_injected_transaction() {
        let store = MemoryStore::new();
        arrange_worker(&store, "E1");
        let service = ArrangementService::new(&store);

        let result: EngineResult<()> = store.run_in_transaction(|tx| {
            service.invalidate("S1", &[], Some(tx))?;
            Err(EngineError::Validation {
                field: "test".to_string(),
                message: "abort".to_string(),
            })
        });

        // The enclosing transaction failed, so the deletion never applied.
        assert!(result.is_err());
        assert!(service.fetch("S1", "E1").is_ok());
    }

    /// AS-011: reset reverts to ARRANGED with fresh scheduled defaults
    #[test]
    fn test_reset_reverts_to_arranged() {
        let store = MemoryStore::new();
        arrange_worker(&store, "E1");
        let service = ArrangementService::new(&store);

        service.confirm("S1", "E1", ts(8, 30)).unwrap();
        service.arrive("S1", "E1", ts(8, 55)).unwrap();

        let mut worker = WorkerAssignment::employee("E1", make_window());
        worker.window.start_time_of_day = "10:00".to_string();
        let notification = service.reset("S1", &worker).unwrap();

        assert_eq!(notification.status, ArrangementStatus::Arranged);
        assert_eq!(notification.actual_start_time, Some(ts(10, 0)));
        assert_eq!(notification.confirmed_at, None);
        assert_eq!(notification.arrived_at, None);
    }

    /// AS-012: a reserved worker stays TEMPORARY until arranged
    #[test]
    fn test_reserve_then_arrange_promotes() {
        let store = MemoryStore::new();
        let service = ArrangementService::new(&store);
        let worker = WorkerAssignment::employee("E1", make_window());

        service.reserve("S1", &worker, None).unwrap();
        let provisional = service.fetch("S1", "E1").unwrap();
        assert_eq!(provisional.status, ArrangementStatus::Temporary);
        assert_eq!(provisional.actual_start_time, Some(ts(9, 0)));
        assert_eq!(provisional.actual_end_time, Some(ts(18, 0)));
        assert_eq!(provisional.confirmed_at, None);

        // Arranging the same pair overwrites the provisional document.
        service.arrange("S1", &worker, None).unwrap();
        let arranged = service.fetch("S1", "E1").unwrap();
        assert_eq!(arranged.status, ArrangementStatus::Arranged);
        assert_eq!(store.count(NOTIFICATIONS_COLLECTION), 1);
    }

    #[test]
    fn test_fetch_for_schedule_orders_by_worker_id() {
        let store = MemoryStore::new();
        arrange_worker(&store, "E2");
        arrange_worker(&store, "E1");
        let service = ArrangementService::new(&store);

        let notifications = service.fetch_for_schedule("S1").unwrap();
        let ids: Vec<&str> = notifications.iter().map(|n| n.worker_id.as_str()).collect();
        assert_eq!(ids, vec!["E1", "E2"]);
    }
}
