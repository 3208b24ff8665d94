//! Shift Dispatch & Billing Engine
//!
//! This crate provides the core scheduling, dispatch-tracking, and billing
//! computations for a contract-labor workforce assigned to client sites:
//! shift-time arithmetic (including midnight-spanning shifts), roster change
//! detection, per-category work statistics, billing-period cutoff resolution,
//! historical consumption-tax lookup, invoice calculation, and the per-worker
//! arrangement notification lifecycle.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
