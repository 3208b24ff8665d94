//! Data models for the Shift Dispatch & Billing Engine.
//!
//! This module contains the core value objects and aggregates: the
//! [`ShiftWindow`] embedded wherever a shift is described, worker
//! assignments, the [`Schedule`] aggregate and its realized
//! [`OperationResult`], the per-worker [`ArrangementNotification`], and
//! billing records.

mod billing;
mod notification;
mod schedule;
mod shift_window;
mod worker;

pub use billing::{BillingRecord, UnitPrices};
pub use notification::{ArrangementNotification, ArrangementStatus, notification_doc_key};
pub use schedule::{OperationResult, Schedule, roster_grouping_key};
pub use shift_window::{ShiftCategory, ShiftWindow, parse_time_of_day};
pub use worker::{WorkerAssignment, employee_worker_id, outsourcer_worker_id};
