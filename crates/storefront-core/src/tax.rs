//! # Tax Module
//!
//! Destination-based tax rates.
//!
//! ```text
//! rate_for(destination)
//!   1. region_rates["US-CA"]   (if a region is set and listed)
//!   2. rates["US"]             (country rate)
//!   3. default_rate            (10%)
//!
//! tax = round_half_away(taxable_amount × rate)
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Destination, TaxRate};
use crate::validation;

/// Per-country tax rates with optional region overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxTable {
    /// Country code → rate.
    pub rates: BTreeMap<String, TaxRate>,

    /// Qualified region code (`US-CA`) → rate. Consulted before `rates`.
    #[serde(default)]
    pub region_rates: BTreeMap<String, TaxRate>,

    /// Rate for countries not in `rates`.
    pub default_rate: TaxRate,
}

impl TaxTable {
    pub fn new(default_rate: TaxRate) -> Self {
        TaxTable {
            rates: BTreeMap::new(),
            region_rates: BTreeMap::new(),
            default_rate,
        }
    }

    pub fn with_rate(mut self, country: impl Into<String>, rate: TaxRate) -> Self {
        self.rates.insert(country.into(), rate);
        self
    }

    pub fn with_region_rate(mut self, region: impl Into<String>, rate: TaxRate) -> Self {
        self.region_rates.insert(region.into(), rate);
        self
    }

    /// Rate for a destination.
    ///
    /// ## Errors
    /// `InvalidDestination` for a malformed destination.
    pub fn rate_for(&self, destination: &Destination) -> CoreResult<TaxRate> {
        let destination = destination.normalize()?;

        let region_rate = destination
            .region_code()
            .and_then(|r| self.region_rates.get(r));

        Ok(region_rate
            .or_else(|| self.rates.get(&destination.country))
            .copied()
            .unwrap_or(self.default_rate))
    }

    /// Tax owed on a taxable amount (subtotal after discount).
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::Money;
    /// use storefront_core::tax::TaxTable;
    /// use storefront_core::types::{Destination, TaxRate};
    ///
    /// let table = TaxTable::new(TaxRate::from_bps(1000)).with_rate("ES", TaxRate::from_bps(2100));
    /// let tax = table.calculate_tax(&Destination::country("ES"), Money::from_cents(3600)).unwrap();
    /// assert_eq!(tax.cents(), 756);
    /// ```
    ///
    /// ## Errors
    /// A negative taxable amount is a validation error, not clamped.
    pub fn calculate_tax(&self, destination: &Destination, taxable: Money) -> CoreResult<Money> {
        if taxable.is_negative() {
            return Err(ValidationError::MustBePositive {
                field: "taxable_amount".to_string(),
            }
            .into());
        }

        let rate = self.rate_for(destination)?;
        Ok(taxable.calculate_tax(rate))
    }

    /// Checks every rate is within 0-100%.
    pub fn validate(&self) -> CoreResult<()> {
        validation::validate_rate_bps("default_rate", self.default_rate.bps())?;
        for (code, rate) in self.rates.iter().chain(self.region_rates.iter()) {
            validation::validate_rate_bps(code, rate.bps())?;
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
