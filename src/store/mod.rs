//! Persistence seam and transactional services.
//!
//! The engine treats document storage as an external collaborator behind
//! the [`DocumentStore`] trait. The services in this module implement the
//! consistency-critical flows on top of it: the per-worker arrangement
//! lifecycle with bulk invalidation, the snapshot-diff schedule edit
//! pipeline, and billing record issuance.

mod arrangement;
mod billing;
mod document;
mod schedule;

pub use arrangement::{ArrangementService, NOTIFICATIONS_COLLECTION};
pub use billing::{BILLING_COLLECTION, BillingService};
pub use document::{DocumentStore, MemoryStore, Transaction};
pub use schedule::{RESULTS_COLLECTION, SCHEDULES_COLLECTION, ScheduleService};
