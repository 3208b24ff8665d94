//! Invoice calculation.
//!
//! Combines per-result billable quantities and overtime totals with the
//! contracted unit prices, an adjustment delta, and the historical tax
//! table to produce the subtotal/tax/total of a billing record. The
//! billing-unit policy (per day vs per hour, break handling) is an
//! explicit switch driving the quantity term, testable on its own.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::{UnitPrices, WorkerAssignment};

use super::shift_time::{ShiftTiming, calculate_shift_timing};
use super::statistics::{WorkStatistics, aggregate_statistics};
use super::tax::{RoundingMode, TaxRateTable};

const MINUTES_PER_HOUR: Decimal = Decimal::from_parts(60, 0, 0, false, 0);

/// How one billable unit is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingUnitType {
    /// One unit per whole shift, regardless of actual minutes.
    PerDay,
    /// Units are worked hours.
    PerHour,
}

/// Whether break minutes count toward per-hour billing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakHandling {
    /// Breaks are not billed.
    ExcludeBreak,
    /// Breaks are billed as worked time.
    IncludeBreak,
}

/// The explicit billing-unit policy of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPolicy {
    /// Per-day or per-hour counting.
    pub unit_type: BillingUnitType,
    /// Break handling under per-hour counting; ignored per day.
    pub break_handling: BreakHandling,
}

impl BillingPolicy {
    /// The billable quantity one shift contributes under this policy.
    ///
    /// # Examples
    ///
    /// ```
    /// use dispatch_engine::calculation::{
    ///     BillingPolicy, BillingUnitType, BreakHandling, calculate_shift_timing,
    /// };
    /// use dispatch_engine::models::{ShiftCategory, ShiftWindow};
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
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
    /// let timing = calculate_shift_timing(&window).unwrap();
    ///
    /// let per_day = BillingPolicy {
    ///     unit_type: BillingUnitType::PerDay,
    ///     break_handling: BreakHandling::ExcludeBreak,
    /// };
    /// assert_eq!(per_day.billable_quantity(&timing), Decimal::ONE);
    ///
    /// let per_hour = BillingPolicy {
    ///     unit_type: BillingUnitType::PerHour,
    ///     break_handling: BreakHandling::ExcludeBreak,
    /// };
    /// assert_eq!(per_hour.billable_quantity(&timing), Decimal::new(8, 0));
    /// ```
    pub fn billable_quantity(&self, timing: &ShiftTiming) -> Decimal {
        match self.unit_type {
            BillingUnitType::PerDay => Decimal::ONE,
            BillingUnitType::PerHour => {
                let break_minutes = (timing.ends_at - timing.starts_at).num_minutes()
                    - timing.total_work_minutes;
                let billable_minutes = match self.break_handling {
                    BreakHandling::ExcludeBreak => timing.total_work_minutes,
                    BreakHandling::IncludeBreak => timing.total_work_minutes + break_minutes,
                };
                Decimal::from(billable_minutes) / MINUTES_PER_HOUR
            }
        }
    }
}

/// Per-category billable quantities of one result under a unit policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillableQuantities {
    /// Billable units worked by base-category workers.
    pub base: Decimal,
    /// Billable units worked by qualified workers.
    pub qualified: Decimal,
}

/// Folds a result's worker list into per-category billable quantities
/// under the given policy.
///
/// # Errors
///
/// Propagates the validation error of any worker window whose time-of-day
/// fields fail to parse.
pub fn billable_quantities(
    workers: &[&WorkerAssignment],
    policy: BillingPolicy,
) -> EngineResult<BillableQuantities> {
    let mut quantities = BillableQuantities::default();
    for worker in workers {
        let timing = calculate_shift_timing(&worker.window)?;
        let quantity = policy.billable_quantity(&timing);
        if worker.is_qualified {
            quantities.qualified += quantity;
        } else {
            quantities.base += quantity;
        }
    }
    Ok(quantities)
}

/// One realized result's contribution to an invoice: its aggregated
/// statistics, the billable quantities under the contract's unit policy,
/// and the unit prices contracted for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillableResult {
    /// The result's categorized work statistics.
    pub statistics: WorkStatistics,
    /// Per-category billable quantities under the contract's unit policy.
    pub quantities: BillableQuantities,
    /// The unit prices to bill it under.
    pub unit_prices: UnitPrices,
}

impl BillableResult {
    /// Builds the billable view of one result's worker list under the
    /// contract's unit policy.
    ///
    /// # Errors
    ///
    /// Propagates the validation error of any worker window whose
    /// time-of-day fields fail to parse.
    pub fn from_workers(
        workers: &[&WorkerAssignment],
        policy: BillingPolicy,
        unit_prices: UnitPrices,
    ) -> EngineResult<Self> {
        Ok(BillableResult {
            statistics: aggregate_statistics(workers)?,
            quantities: billable_quantities(workers, policy)?,
            unit_prices,
        })
    }
}

/// The derived figures of one billing record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingSummary {
    /// Sum of all result lines plus the adjustment.
    pub subtotal: Decimal,
    /// Rounded tax on the subtotal.
    pub tax: Decimal,
    /// Subtotal plus tax.
    pub total: Decimal,
}

/// The pre-tax amount one result contributes. The quantity term carries
/// the unit policy (days or hours); overtime premiums bill on top at the
/// hourly overtime prices.
fn result_line(result: &BillableResult) -> Decimal {
    let stats = &result.statistics;
    let prices = &result.unit_prices;

    result.quantities.base * prices.unit_price_base
        + Decimal::from(stats.base.totals.overtime_work_minutes) / MINUTES_PER_HOUR
            * prices.overtime_unit_price_base
        + result.quantities.qualified * prices.unit_price_qualified
        + Decimal::from(stats.qualified.totals.overtime_work_minutes) / MINUTES_PER_HOUR
            * prices.overtime_unit_price_qualified
}

/// Calculates an invoice's subtotal, tax, and total.
///
/// # Errors
///
/// Returns [`EngineError::UnresolvedRate`](crate::error::EngineError::UnresolvedRate)
/// when the billing date precedes the tax table's earliest entry.
pub fn calculate_billing(
    results: &[BillableResult],
    adjustment: Decimal,
    billing_date: NaiveDate,
    rate_table: &TaxRateTable,
    rounding: RoundingMode,
) -> EngineResult<BillingSummary> {
    let subtotal: Decimal = results.iter().map(result_line).sum::<Decimal>() + adjustment;
    let tax = rate_table.tax(subtotal, billing_date, rounding)?;
    Ok(BillingSummary {
        subtotal,
        tax,
        total: subtotal + tax,
    })
}
