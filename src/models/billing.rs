//! Billing record and unit price models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The contracted unit prices for one customer/site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPrices {
    /// Price per base-category unit.
    pub unit_price_base: Decimal,
    /// Price per overtime hour for base-category workers.
    pub overtime_unit_price_base: Decimal,
    /// Price per qualified-category unit.
    pub unit_price_qualified: Decimal,
    /// Price per overtime hour for qualified workers.
    pub overtime_unit_price_qualified: Decimal,
}

/// A customer/site/month billing aggregate.
///
/// Holds the realized results the invoice covers, the manual adjustment
/// delta, and the derived figures produced by the billing calculator. The
/// derived figures are only ever written at creation; a record is never
/// recalculated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingRecord {
    /// Unique record id (deterministic: `customerId-siteId-month`).
    pub id: String,
    /// The billed customer.
    pub customer_id: String,
    /// The billed site.
    pub site_id: String,
    /// Billing period label, "YYYY-MM".
    pub month: String,
    /// The operation results covered by this record.
    pub result_ids: Vec<String>,
    /// Manual adjustment applied before tax.
    pub adjustment: Decimal,
    /// Derived subtotal (lines + adjustment).
    pub subtotal: Decimal,
    /// Derived tax on the subtotal.
    pub tax: Decimal,
    /// Derived total (subtotal + tax).
    pub total: Decimal,
}

impl BillingRecord {
    /// Forms the deterministic billing record id.
    pub fn record_id(customer_id: &str, site_id: &str, month: &str) -> String {
        format!("{}-{}-{}", customer_id, site_id, month)
    }
}
