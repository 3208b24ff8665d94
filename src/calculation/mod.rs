//! Calculation logic for the Shift Dispatch & Billing Engine.
//!
//! This module contains the pure calculation functions: shift timing
//! (including midnight-spanning shifts and the regular/overtime minute
//! split), day category derivation with holiday precedence, roster change
//! detection, work statistics aggregation, billing-period cutoff
//! resolution, historical tax-rate lookup, and invoice calculation.

mod billing;
mod cutoff;
mod day_category;
mod roster_diff;
mod shift_time;
mod statistics;
mod tax;

pub use billing::{
    BillableQuantities, BillableResult, BillingPolicy, BillingSummary, BillingUnitType,
    BreakHandling, billable_quantities, calculate_billing,
};
pub use cutoff::{BillingPeriod, CutoffDay, calculate_billing_period, calculate_cutoff_date};
pub use day_category::{DayCategory, FixedHolidays, HolidayCalendar, day_category};
pub use roster_diff::{RosterDiff, diff_rosters, id_set_changed};
pub use shift_time::{ShiftTiming, calculate_shift_timing};
pub use statistics::{CategoryTotals, TimeTotals, WorkStatistics, aggregate_statistics};
pub use tax::{RoundingMode, TaxRateEntry, TaxRateTable};
