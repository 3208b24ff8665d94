//! Historical tax-rate resolution.
//!
//! Resolves the consumption-tax rate applicable on a given date from an
//! append-only historical table and computes the rounded tax amount. The
//! rounding policy is threaded as an explicit parameter; there is no
//! process-global rounding state.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Monetary rounding policy applied when computing tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Round down to the next whole currency unit.
    Floor,
    /// Round half away from zero.
    HalfUp,
    /// Round up to the next whole currency unit.
    Ceiling,
}

impl RoundingMode {
    fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::Floor => RoundingStrategy::ToNegativeInfinity,
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::Ceiling => RoundingStrategy::ToPositiveInfinity,
        }
    }

    /// Rounds an amount to whole currency units under this policy.
    pub fn round(self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(0, self.strategy())
    }
}

/// One historical rate entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRateEntry {
    /// The date this rate came into force.
    pub effective_date: NaiveDate,
    /// The rate as a fraction (e.g. 0.10 for 10%).
    pub rate: Decimal,
}

/// The append-only historical rate table, sorted ascending by effective
/// date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRateTable {
    entries: Vec<TaxRateEntry>,
}

impl TaxRateTable {
    /// Creates a table from entries, sorting them ascending.
    pub fn new(mut entries: Vec<TaxRateEntry>) -> Self {
        entries.sort_by_key(|e| e.effective_date);
        TaxRateTable { entries }
    }

    /// The Japanese consumption-tax history.
    pub fn japan_consumption_tax() -> Self {
        fn entry(y: i32, m: u32, d: u32, rate: Decimal) -> TaxRateEntry {
            TaxRateEntry {
                effective_date: NaiveDate::from_ymd_opt(y, m, d).expect("valid historical date"),
                rate,
            }
        }
        TaxRateTable::new(vec![
            entry(1989, 4, 1, Decimal::new(3, 2)),
            entry(1997, 4, 1, Decimal::new(5, 2)),
            entry(2014, 4, 1, Decimal::new(8, 2)),
            entry(2019, 10, 1, Decimal::new(10, 2)),
        ])
    }

    /// The historical entries, ascending.
    pub fn entries(&self) -> &[TaxRateEntry] {
        &self.entries
    }

    /// Resolves the rate in force on a date.
    ///
    /// The entry with the largest effective date on or before the query
    /// date wins.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnresolvedRate`] when the query date precedes
    /// the table's earliest entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use dispatch_engine::calculation::TaxRateTable;
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let table = TaxRateTable::japan_consumption_tax();
    /// let eve = NaiveDate::from_ymd_opt(2019, 9, 30).unwrap();
    /// assert_eq!(table.rate_on(eve).unwrap(), Decimal::new(8, 2));
    /// ```
    pub fn rate_on(&self, date: NaiveDate) -> EngineResult<Decimal> {
        self.entries
            .iter()
            .rfind(|e| e.effective_date <= date)
            .map(|e| e.rate)
            .ok_or(EngineError::UnresolvedRate { date })
    }

    /// Computes the rounded tax on an amount at the rate in force on the
    /// given date.
    pub fn tax(&self, amount: Decimal, date: NaiveDate, rounding: RoundingMode) -> EngineResult<Decimal> {
        let rate = self.rate_on(date)?;
        Ok(rounding.round(amount * rate))
    }
}

impl Default for TaxRateTable {
    fn default() -> Self {
        Self::japan_consumption_tax()
    }
}
