//! Configuration loading and management for the dispatch engine.
//!
//! This module provides functionality to load billing configuration from
//! YAML files: the contracted cutoff day, rounding policy, billing-unit
//! policy, unit prices, and the historical tax rate table.
//!
//! # Example
//!
//! ```no_run
//! use dispatch_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/billing").unwrap();
//! println!("Cutoff: {:?}", config.terms().cutoff_day);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{BillingConfig, BillingTerms, TaxRatesConfig};
