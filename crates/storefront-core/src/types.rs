//! # Domain Types
//!
//! Value types shared by every pricing component.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    LineItem     │   │   Destination   │   │     Totals      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  product_id     │   │  country (ISO)  │   │  subtotal       │       │
//! │  │  variant_id?    │   │  region?        │   │  discount       │       │
//! │  │  name           │   │  postal_code?   │   │  shipping       │       │
//! │  │  unit_price     │   └─────────────────┘   │  tax            │       │
//! │  │  quantity ≥ 1   │                         │  total          │       │
//! │  └─────────────────┘   ┌─────────────────┐   └─────────────────┘       │
//! │                        │    TaxRate      │                              │
//! │                        │  bps (u32)      │                              │
//! │                        │  2100 = 21%     │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::validation;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 2100 bps = 21% (Spanish IVA) and
/// 725 bps = 7.25% (US average).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage, e.g. `21.0` or `7.25`.
    ///
    /// Only for human-entered configuration (environment overrides).
    /// Negative or non-finite input yields a zero rate; the caller
    /// validates the range.
    pub fn from_percentage(pct: f64) -> Self {
        if !pct.is_finite() || pct <= 0.0 {
            return TaxRate(0);
        }
        TaxRate((pct * 100.0).round() as u32)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One line of a cart or order.
///
/// The unit price is frozen when the product is added, so later catalog
/// price changes do not reprice an open cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    /// Product identifier.
    pub product_id: String,

    /// Selected variant (size, color), if any.
    #[serde(default)]
    pub variant_id: Option<String>,

    /// Display name at time of adding.
    #[serde(default)]
    pub name: String,

    /// Unit price at time of adding. Must be ≥ 0.
    pub unit_price: Money,

    /// Quantity. Must be ≥ 1.
    pub quantity: i64,
}

impl LineItem {
    pub fn new(product_id: impl Into<String>, unit_price: Money, quantity: i64) -> Self {
        LineItem {
            product_id: product_id.into(),
            variant_id: None,
            name: String::new(),
            unit_price,
            quantity,
        }
    }

    pub fn with_variant(mut self, variant_id: impl Into<String>) -> Self {
        self.variant_id = Some(variant_id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Checks the line item invariants (quantity ≥ 1, unit price ≥ 0).
    pub fn validate(&self) -> CoreResult<()> {
        validation::validate_quantity(self.quantity)?;
        validation::validate_price_cents(self.unit_price.cents())?;
        Ok(())
    }

    /// Returns `unit_price × quantity`, or `None` on overflow.
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.checked_mul_quantity(self.quantity)
    }

    /// Returns true when this line is for the given product and variant.
    pub fn matches(&self, product_id: &str, variant_id: Option<&str>) -> bool {
        self.product_id == product_id && self.variant_id.as_deref() == variant_id
    }
}

// =============================================================================
// Destination
// =============================================================================

/// Where an order ships to. Only used for shipping and tax lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Destination {
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,

    /// Region/state code, either bare (`CN`) or qualified (`ES-CN`).
    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub postal_code: Option<String>,
}

impl Destination {
    /// Creates a destination for a country with no region or postal code.
    pub fn country(code: impl Into<String>) -> Self {
        Destination {
            country: code.into(),
            region: None,
            postal_code: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_postal_code(mut self, postal_code: impl Into<String>) -> Self {
        self.postal_code = Some(postal_code.into());
        self
    }

    /// Returns a validated copy with trimmed, upper-cased codes.
    ///
    /// ## Rules
    /// - country: two ASCII letters (`es` → `ES`)
    /// - region: qualified as `CC-RR` (`CN` → `ES-CN`); blank → `None`
    /// - postal code: trimmed; blank → `None`
    ///
    /// ## Errors
    /// `CoreError::InvalidDestination` when the country or region is malformed.
    pub fn normalize(&self) -> CoreResult<Destination> {
        let country = validation::validate_country_code(&self.country)
            .map_err(CoreError::invalid_destination)?;
        let region = match self.region.as_deref() {
            Some(r) => validation::normalize_region_code(&country, r)
                .map_err(CoreError::invalid_destination)?,
            None => None,
        };
        let postal_code = self
            .postal_code
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        Ok(Destination {
            country,
            region,
            postal_code,
        })
    }

    /// Returns the qualified region code (`ES-CN`) if one is set.
    ///
    /// Expects a normalized destination.
    pub fn region_code(&self) -> Option<&str> {
        self.region.as_deref()
    }
}

// =============================================================================
// Totals
// =============================================================================

/// The priced result of an order.
///
/// Always freshly produced by [`crate::totals::compute_totals`]; never
/// mutated in place.
///
/// ## Invariants
/// - `total == subtotal − discount + shipping + tax`
/// - `discount ≤ subtotal`
/// - every field ≥ 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Totals {
    pub subtotal: Money,
    pub discount: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
}

impl Totals {
    /// Subtotal after discount, before shipping. The tax base.
    pub fn taxable_amount(&self) -> Money {
        self.subtotal.saturating_sub_to_zero(self.discount)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
