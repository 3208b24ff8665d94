//! Comprehensive integration tests for the Shift Dispatch & Billing Engine.
//!
//! This test suite covers the full dispatch lifecycle including:
//! - Schedule creation and worker arrangement
//! - Snapshot-diff edits and notification invalidation
//! - The per-worker milestone lifecycle
//! - Overnight (midnight-spanning) shifts
//! - Realization into operation results
//! - Statistics aggregation and billing issuance
//! - Error cases

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::str::FromStr;

use dispatch_engine::calculation::{aggregate_statistics, calculate_shift_timing};
use dispatch_engine::config::ConfigLoader;
use dispatch_engine::error::EngineError;
use dispatch_engine::models::{
    ArrangementStatus, Schedule, ShiftCategory, ShiftWindow, WorkerAssignment,
};
use dispatch_engine::store::{
    ArrangementService, BillingService, MemoryStore, NOTIFICATIONS_COLLECTION, ScheduleService,
};

// =============================================================================
// Test Helpers
// =============================================================================

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn anchor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

fn ts(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn day_window() -> ShiftWindow {
    ShiftWindow {
        anchor_date: anchor(),
        shift_category: ShiftCategory::Day,
        start_time_of_day: "09:00".to_string(),
        end_time_of_day: "18:00".to_string(),
        break_minutes: 60,
        regulation_work_minutes: 480,
        starts_next_day: false,
    }
}

fn night_window() -> ShiftWindow {
    ShiftWindow {
        anchor_date: anchor(),
        shift_category: ShiftCategory::Night,
        start_time_of_day: "22:00".to_string(),
        end_time_of_day: "06:00".to_string(),
        break_minutes: 60,
        regulation_work_minutes: 480,
        starts_next_day: false,
    }
}

fn make_schedule(id: &str, window: ShiftWindow) -> Schedule {
    let mut schedule = Schedule::new(id, "SITE1", window.clone(), 3);
    schedule
        .employees
        .push(WorkerAssignment::employee("E1", window.clone()));
    schedule
        .employees
        .push(WorkerAssignment::employee("E2", window.clone()).qualified());
    schedule
        .outsourcers
        .push(WorkerAssignment::outsourcer("OUT7", 0, window));
    schedule
}

/// Creates the schedule and arranges every worker on it.
fn seed_arranged(store: &MemoryStore, id: &str, window: ShiftWindow) -> Schedule {
    let schedules = ScheduleService::new(store);
    let arrangements = ArrangementService::new(store);
    let schedule = make_schedule(id, window);
    schedules.create(&schedule).unwrap();
    for worker in schedule.workers() {
        arrangements.arrange(&schedule.id, worker, None).unwrap();
    }
    schedule
}

// =============================================================================
// SECTION 1: Schedule Creation and Arrangement
// =============================================================================

#[test]
fn test_create_schedule_and_arrange_workers() {
    // Three workers arranged; three notification documents at
    // deterministic keys, all ARRANGED with scheduled times as defaults.
    let store = MemoryStore::new();
    let schedule = seed_arranged(&store, "S1", day_window());

    let arrangements = ArrangementService::new(&store);
    let notifications = arrangements.fetch_for_schedule("S1").unwrap();
    assert_eq!(notifications.len(), 3);
    for notification in &notifications {
        assert_eq!(notification.status, ArrangementStatus::Arranged);
        assert_eq!(notification.actual_start_time, Some(ts(15, 9, 0)));
        assert_eq!(notification.actual_end_time, Some(ts(15, 18, 0)));
        assert_eq!(notification.actual_break_minutes, Some(60));
    }

    // Outsourced slots carry the composite id.
    assert!(arrangements.fetch("S1", "OUT7:0").is_ok());
    assert_eq!(schedule.grouping_key(), "SITE1-day-2024-03-15");
}

#[test]
fn test_overnight_shift_crosses_midnight() {
    // 22:00-06:00 ends on the following calendar day.
    let store = MemoryStore::new();
    seed_arranged(&store, "S1", night_window());

    let arrangements = ArrangementService::new(&store);
    let notification = arrangements.fetch("S1", "E1").unwrap();
    assert_eq!(notification.actual_start_time, Some(ts(15, 22, 0)));
    assert_eq!(notification.actual_end_time, Some(ts(16, 6, 0)));

    let timing = calculate_shift_timing(&night_window()).unwrap();
    assert!(timing.spans_midnight);
    assert_eq!(timing.total_work_minutes, 420);
    assert_eq!(timing.overtime_work_minutes, 0);
}

#[test]
fn test_duplicate_worker_id_rejected() {
    let store = MemoryStore::new();
    let mut schedule = make_schedule("S1", day_window());
    schedule
        .outsourcers
        .push(WorkerAssignment::outsourcer("OUT7", 0, day_window()));

    let err = ScheduleService::new(&store).create(&schedule).unwrap_err();
    assert!(err.to_string().contains("OUT7:0"));
}

// =============================================================================
// SECTION 2: Snapshot-Diff Edits and Invalidation
// =============================================================================

#[test]
fn test_roster_edit_invalidates_removed_worker_only() {
    let store = MemoryStore::new();
    let before = seed_arranged(&store, "S1", day_window());
    let schedules = ScheduleService::new(&store);
    let arrangements = ArrangementService::new(&store);

    let mut current = before.clone();
    current.employees.retain(|w| w.worker_id != "E2");

    let diff = schedules.update(&mut current, &before).unwrap();
    assert_eq!(diff.removed.len(), 1);
    assert!(diff.added.is_empty());

    // Only the removed worker lost its notification.
    assert!(arrangements.fetch("S1", "E2").is_err());
    assert!(arrangements.fetch("S1", "E1").is_ok());
    assert!(arrangements.fetch("S1", "OUT7:0").is_ok());
}

#[test]
fn test_timing_change_invalidates_every_notification() {
    let store = MemoryStore::new();
    let before = seed_arranged(&store, "S1", day_window());
    let schedules = ScheduleService::new(&store);

    let mut current = before.clone();
    current.window.end_time_of_day = "19:00".to_string();

    schedules.update(&mut current, &before).unwrap();
    assert_eq!(store.count(NOTIFICATIONS_COLLECTION), 0);

    // The edit also synchronized every assignment window.
    let fetched = schedules.fetch("S1").unwrap();
    for worker in fetched.workers() {
        assert_eq!(worker.window.end_time_of_day, "19:00");
    }
}

#[test]
fn test_edit_with_arrange_of_added_workers() {
    // The returned diff drives re-arrangement of the added workers.
    let store = MemoryStore::new();
    let before = seed_arranged(&store, "S1", day_window());
    let schedules = ScheduleService::new(&store);
    let arrangements = ArrangementService::new(&store);

    let mut current = before.clone();
    current
        .employees
        .push(WorkerAssignment::employee("E3", day_window()));

    let diff = schedules.update(&mut current, &before).unwrap();
    assert_eq!(diff.added.len(), 1);
    for worker in &diff.added {
        arrangements.arrange(&current.id, worker, None).unwrap();
    }

    assert_eq!(store.count(NOTIFICATIONS_COLLECTION), 4);
    assert!(arrangements.fetch("S1", "E3").is_ok());
}

#[test]
fn test_qualification_flip_invalidates_worker() {
    let store = MemoryStore::new();
    let before = seed_arranged(&store, "S1", day_window());
    let schedules = ScheduleService::new(&store);
    let arrangements = ArrangementService::new(&store);

    let mut current = before.clone();
    current.employees[0].is_qualified = true;

    let diff = schedules.update(&mut current, &before).unwrap();
    assert_eq!(diff.updated.len(), 1);
    assert!(arrangements.fetch("S1", "E1").is_err());
    assert!(arrangements.fetch("S1", "E2").is_ok());
}

#[test]
fn test_delete_purges_schedule_and_notifications() {
    let store = MemoryStore::new();
    let schedule = seed_arranged(&store, "S1", day_window());
    // A second schedule's documents must survive the purge.
    seed_arranged(&store, "S2", day_window());

    let schedules = ScheduleService::new(&store);
    schedules.delete(&schedule).unwrap();

    assert!(schedules.fetch("S1").is_err());
    assert!(schedules.fetch("S2").is_ok());
    assert_eq!(store.count(NOTIFICATIONS_COLLECTION), 3);
}

// =============================================================================
// SECTION 3: Milestone Lifecycle
// =============================================================================

#[test]
fn test_full_milestone_lifecycle() {
    // ARRANGED -> CONFIRMED -> ARRIVED -> LEAVED with realized times.
    let store = MemoryStore::new();
    seed_arranged(&store, "S1", day_window());
    let arrangements = ArrangementService::new(&store);

    arrangements.confirm("S1", "E1", ts(14, 20, 0)).unwrap();
    arrangements.arrive("S1", "E1", ts(15, 8, 50)).unwrap();
    let notification = arrangements
        .leave(
            "S1",
            "E1",
            ts(15, 18, 10),
            Some(ts(15, 9, 0)),
            Some(ts(15, 18, 0)),
            Some(45),
        )
        .unwrap();

    assert_eq!(notification.status, ArrangementStatus::Leaved);
    assert_eq!(notification.confirmed_at, Some(ts(14, 20, 0)));
    assert_eq!(notification.arrived_at, Some(ts(15, 8, 50)));
    assert_eq!(notification.leaved_at, Some(ts(15, 18, 10)));
    assert_eq!(notification.actual_break_minutes, Some(45));

    // Other workers on the schedule are untouched.
    let other = arrangements.fetch("S1", "E2").unwrap();
    assert_eq!(other.status, ArrangementStatus::Arranged);
}

#[test]
fn test_cancel_after_arrival() {
    let store = MemoryStore::new();
    seed_arranged(&store, "S1", day_window());
    let arrangements = ArrangementService::new(&store);

    // Cancellation before arrival is rejected.
    let err = arrangements.cancel("S1", "E1").unwrap_err();
    assert!(err.to_string().contains("cannot cancel"));

    arrangements.confirm("S1", "E1", ts(14, 20, 0)).unwrap();
    arrangements.arrive("S1", "E1", ts(15, 8, 50)).unwrap();
    let notification = arrangements.cancel("S1", "E1").unwrap();
    assert_eq!(notification.status, ArrangementStatus::Canceled);
}

#[test]
fn test_leave_without_realized_times_rejected() {
    let store = MemoryStore::new();
    seed_arranged(&store, "S1", day_window());
    let arrangements = ArrangementService::new(&store);

    arrangements.confirm("S1", "E1", ts(14, 20, 0)).unwrap();
    arrangements.arrive("S1", "E1", ts(15, 8, 50)).unwrap();
    let err = arrangements
        .leave("S1", "E1", ts(15, 18, 10), None, Some(ts(15, 18, 0)), Some(45))
        .unwrap_err();
    assert!(err.to_string().contains("actual_start_time"));

    // The failed transition left the document at ARRIVED.
    let persisted = arrangements.fetch("S1", "E1").unwrap();
    assert_eq!(persisted.status, ArrangementStatus::Arrived);
}

// =============================================================================
// SECTION 4: Realization and Statistics
// =============================================================================

#[test]
fn test_realize_then_schedule_is_immutable() {
    let store = MemoryStore::new();
    let mut schedule = seed_arranged(&store, "S1", day_window());
    let schedules = ScheduleService::new(&store);

    let result = schedules.realize(&mut schedule).unwrap();
    assert_eq!(result.schedule_id, "S1");
    assert_eq!(result.workers().len(), 3);

    // Edits and deletes are rejected from now on.
    let before = schedules.fetch("S1").unwrap();
    let mut current = before.clone();
    current.employees.pop();
    assert!(matches!(
        schedules.update(&mut current, &before).unwrap_err(),
        EngineError::OperationFailed { .. }
    ));
    assert!(schedules.delete(&before).is_err());
}

#[test]
fn test_statistics_from_realized_result() {
    let store = MemoryStore::new();
    let mut schedule = seed_arranged(&store, "S1", day_window());
    let schedules = ScheduleService::new(&store);

    let result = schedules.realize(&mut schedule).unwrap();
    let stats = aggregate_statistics(&result.workers()).unwrap();

    // E1 and OUT7:0 are base; E2 is qualified. 480 worked minutes each.
    assert_eq!(stats.base.totals.quantity, 2);
    assert_eq!(stats.qualified.totals.quantity, 1);
    assert_eq!(stats.total.totals.quantity, 3);
    assert_eq!(stats.total.totals.total_work_minutes, 1440);
    assert_eq!(stats.total.totals.overtime_work_minutes, 0);
}

// =============================================================================
// SECTION 5: Billing Issuance
// =============================================================================

#[test]
fn test_billing_from_realized_results_with_config() {
    // Full pipeline: realize two schedules, bill them under the shipped
    // configuration. 2 base * 18000 + 1 qualified * 22000 per result.
    let store = MemoryStore::new();
    let schedules = ScheduleService::new(&store);
    let billing = BillingService::new(&store);
    let loader = ConfigLoader::load("./config/billing").unwrap();

    let mut first = seed_arranged(&store, "S1", day_window());
    let mut second = seed_arranged(&store, "S2", day_window());
    let result_a = schedules.realize(&mut first).unwrap();
    let result_b = schedules.realize(&mut second).unwrap();

    let record = billing
        .issue(
            "C1",
            "SITE1",
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            &[&result_a, &result_b],
            &loader.terms().unit_prices,
            loader.terms().policy(),
            Decimal::ZERO,
            loader.terms().cutoff_day,
            loader.config().tax_table(),
            loader.rounding(),
        )
        .unwrap();

    assert_eq!(record.id, "C1-SITE1-2024-03");
    assert_eq!(record.result_ids, vec![result_a.id, result_b.id]);
    assert_eq!(record.subtotal, decimal("116000"));
    assert_eq!(record.tax, decimal("11600"));
    assert_eq!(record.total, decimal("127600"));

    // The record is fetchable and issuance is once-only.
    assert_eq!(billing.fetch(&record.id).unwrap(), record);
    let err = billing
        .issue(
            "C1",
            "SITE1",
            NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
            &[&billing_noop_result(&store)],
            &loader.terms().unit_prices,
            loader.terms().policy(),
            Decimal::ZERO,
            loader.terms().cutoff_day,
            loader.config().tax_table(),
            loader.rounding(),
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::UnsupportedOperation { .. }));
}

/// Realizes a throwaway schedule for the reissue check.
fn billing_noop_result(store: &MemoryStore) -> dispatch_engine::models::OperationResult {
    let schedules = ScheduleService::new(store);
    let mut schedule = seed_arranged(store, "S9", day_window());
    schedules.realize(&mut schedule).unwrap()
}

#[test]
fn test_billing_applies_historical_tax_rate() {
    // A 2015 billing date resolves the 8% rate.
    let store = MemoryStore::new();
    let schedules = ScheduleService::new(&store);
    let billing = BillingService::new(&store);
    let loader = ConfigLoader::load("./config/billing").unwrap();

    let mut schedule = seed_arranged(&store, "S1", day_window());
    let result = schedules.realize(&mut schedule).unwrap();

    let record = billing
        .issue(
            "C1",
            "SITE1",
            NaiveDate::from_ymd_opt(2015, 6, 30).unwrap(),
            &[&result],
            &loader.terms().unit_prices,
            loader.terms().policy(),
            Decimal::ZERO,
            loader.terms().cutoff_day,
            loader.config().tax_table(),
            loader.rounding(),
        )
        .unwrap();

    assert_eq!(record.month, "2015-06");
    assert_eq!(record.subtotal, decimal("58000"));
    assert_eq!(record.tax, decimal("4640"));
}

// =============================================================================
// SECTION 6: Error Cases
// =============================================================================

#[test]
fn test_fetch_missing_schedule() {
    let store = MemoryStore::new();
    let err = ScheduleService::new(&store).fetch("ghost").unwrap_err();
    assert_eq!(err.to_string(), "Schedule not found: ghost");
}

#[test]
fn test_transition_on_missing_notification_carries_context() {
    let store = MemoryStore::new();
    let err = ArrangementService::new(&store)
        .confirm("S1", "ghost", ts(15, 8, 0))
        .unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains("confirm"));
    assert!(rendered.contains("worker_id=ghost"));
}

#[test]
fn test_malformed_window_rejected_at_arrange() {
    let store = MemoryStore::new();
    let mut window = day_window();
    window.start_time_of_day = "9:00".to_string(); // not zero-padded

    let worker = WorkerAssignment::employee("E1", window);
    let err = ArrangementService::new(&store)
        .arrange("S1", &worker, None)
        .unwrap_err();
    assert!(err.to_string().contains("start_time_of_day"));
    assert_eq!(store.count(NOTIFICATIONS_COLLECTION), 0);
}
