//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading billing
//! configurations from YAML files.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fs;
use std::path::Path;

use crate::calculation::RoundingMode;
use crate::error::{EngineError, EngineResult};

use super::types::{BillingConfig, BillingTerms, TaxRatesConfig};

/// Loads and provides access to billing configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory
/// and provides access to the contract terms and tax rate history.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/billing/
/// ├── billing.yaml    # Cutoff, rounding, unit policy, unit prices
/// └── tax_rates.yaml  # Historical consumption tax rates
/// ```
///
/// # Example
///
/// ```no_run
/// use dispatch_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/billing").unwrap();
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
/// let rate = loader.tax_rate_on(date).unwrap();
/// println!("Tax rate: {}", rate);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: BillingConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ConfigNotFound`] when a required file is
    /// missing and [`EngineError::ConfigParseError`] when a file contains
    /// invalid YAML.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let billing_path = path.join("billing.yaml");
        let terms = Self::load_yaml::<BillingTerms>(&billing_path)?;

        let tax_rates_path = path.join("tax_rates.yaml");
        let tax_rates = Self::load_yaml::<TaxRatesConfig>(&tax_rates_path)?;
        if tax_rates.tax_rates.is_empty() {
            return Err(EngineError::ConfigParseError {
                path: tax_rates_path.display().to_string(),
                message: "tax_rates must contain at least one entry".to_string(),
            });
        }

        Ok(Self {
            config: BillingConfig::new(terms, tax_rates),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying billing configuration.
    pub fn config(&self) -> &BillingConfig {
        &self.config
    }

    /// Returns the contract billing terms.
    pub fn terms(&self) -> &BillingTerms {
        self.config.terms()
    }

    /// Gets the tax rate in force on a given date.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnresolvedRate`] when the date precedes the
    /// table's earliest entry.
    pub fn tax_rate_on(&self, date: NaiveDate) -> EngineResult<Decimal> {
        self.config.tax_table().rate_on(date)
    }

    /// Returns the configured tax rounding policy.
    pub fn rounding(&self) -> RoundingMode {
        self.terms().rounding
    }
}
