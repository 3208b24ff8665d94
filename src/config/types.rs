//! Configuration types for billing contracts.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use serde::Deserialize;

use crate::calculation::{
    BillingPolicy, BillingUnitType, BreakHandling, CutoffDay, RoundingMode, TaxRateEntry,
    TaxRateTable,
};
use crate::models::UnitPrices;

/// Contract billing terms from billing.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct BillingTerms {
    /// The contracted billing cutoff day.
    pub cutoff_day: CutoffDay,
    /// Rounding applied to computed tax.
    pub rounding: RoundingMode,
    /// Per-day or per-hour billing.
    pub unit_type: BillingUnitType,
    /// Whether break minutes bill under per-hour counting.
    pub break_handling: BreakHandling,
    /// The contracted unit prices.
    pub unit_prices: UnitPrices,
}

impl BillingTerms {
    /// The billing-unit policy these terms describe.
    pub fn policy(&self) -> BillingPolicy {
        BillingPolicy {
            unit_type: self.unit_type,
            break_handling: self.break_handling,
        }
    }
}

/// Tax rate history from tax_rates.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxRatesConfig {
    /// Historical rate entries; order in the file is not significant.
    pub tax_rates: Vec<TaxRateEntry>,
}

/// The complete billing configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct BillingConfig {
    terms: BillingTerms,
    tax_table: TaxRateTable,
}

impl BillingConfig {
    /// Creates a config from its component parts.
    pub fn new(terms: BillingTerms, tax_rates: TaxRatesConfig) -> Self {
        Self {
            terms,
            tax_table: TaxRateTable::new(tax_rates.tax_rates),
        }
    }

    /// Returns the contract billing terms.
    pub fn terms(&self) -> &BillingTerms {
        &self.terms
    }

    /// Returns the historical tax rate table, sorted by effective date.
    pub fn tax_table(&self) -> &TaxRateTable {
        &self.tax_table
    }
}
