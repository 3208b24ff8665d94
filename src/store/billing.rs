//! Billing record issuance.
//!
//! Aggregates realized results into a customer/site/month billing record
//! using the cutoff resolver, statistics aggregator, billing calculator,
//! and historical tax table. A record is issued once; re-creating it for
//! the same period is explicitly disabled.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use crate::calculation::{
    BillableResult, BillingPolicy, CutoffDay, RoundingMode, TaxRateTable, calculate_billing,
    calculate_billing_period,
};
use crate::error::{EngineError, EngineResult};
use crate::models::{BillingRecord, OperationResult, UnitPrices};

use super::document::DocumentStore;

/// The collection holding billing record documents.
pub const BILLING_COLLECTION: &str = "billing_records";

/// Service issuing billing records from realized results.
pub struct BillingService<'a, S: DocumentStore> {
    store: &'a S,
}

impl<'a, S: DocumentStore> BillingService<'a, S> {
    /// Creates a service over the given store.
    pub fn new(store: &'a S) -> Self {
        BillingService { store }
    }

    /// Issues the billing record covering the given results.
    ///
    /// The billing period (and the record's month label) is resolved from
    /// the billing date and the configured cutoff day; the billable
    /// quantities follow the contract's unit policy; the tax rate is the
    /// one in force on the billing date.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnsupportedOperation`] when a record for the
    /// same customer/site/month already exists, and propagates unresolved
    /// tax rates and worker-window validation failures.
    #[allow(clippy::too_many_arguments)]
    pub fn issue(
        &self,
        customer_id: &str,
        site_id: &str,
        billing_date: NaiveDate,
        results: &[&OperationResult],
        unit_prices: &UnitPrices,
        policy: BillingPolicy,
        adjustment: Decimal,
        cutoff_day: CutoffDay,
        rate_table: &TaxRateTable,
        rounding: RoundingMode,
    ) -> EngineResult<BillingRecord> {
        let period = calculate_billing_period(billing_date, cutoff_day);
        let record_id = BillingRecord::record_id(customer_id, site_id, &period.period_label);

        let existing: Option<BillingRecord> = self.store.fetch_one(BILLING_COLLECTION, &record_id)?;
        if existing.is_some() {
            return Err(EngineError::UnsupportedOperation {
                operation: "recreate_billing_record".to_string(),
                message: format!("billing record '{}' already exists", record_id),
            });
        }

        let mut billables = Vec::with_capacity(results.len());
        for result in results {
            let billable =
                BillableResult::from_workers(&result.workers(), policy, unit_prices.clone())
                    .map_err(|e| {
                        e.in_operation("issue_billing", format!("result_id={}", result.id))
                    })?;
            billables.push(billable);
        }

        let summary = calculate_billing(&billables, adjustment, billing_date, rate_table, rounding)
            .map_err(|e| e.in_operation("issue_billing", format!("record_id={}", record_id)))?;

        let record = BillingRecord {
            id: record_id,
            customer_id: customer_id.to_string(),
            site_id: site_id.to_string(),
            month: period.period_label,
            result_ids: results.iter().map(|r| r.id.clone()).collect(),
            adjustment,
            subtotal: summary.subtotal,
            tax: summary.tax,
            total: summary.total,
        };
        self.store.create(BILLING_COLLECTION, &record.id, &record, None)?;
        info!(
            record_id = %record.id,
            subtotal = %record.subtotal,
            total = %record.total,
            "billing record issued"
        );
        Ok(record)
    }

    /// Fetches a billing record by id.
    pub fn fetch(&self, record_id: &str) -> EngineResult<BillingRecord> {
        self.store
            .fetch_one(BILLING_COLLECTION, record_id)?
            .ok_or_else(|| EngineError::NotFound {
                entity: "BillingRecord".to_string(),
                id: record_id.to_string(),
            })
    }
}
