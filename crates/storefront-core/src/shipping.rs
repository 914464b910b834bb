//! # Shipping Module
//!
//! Shipping zones, methods and the rate resolver.
//!
//! ## Resolution Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Shipping Resolution                                │
//! │                                                                         │
//! │  Destination { country: "ES", region: "ES-CN" }                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Denylist? (CU, IR, KP, SY) ──yes──► ShippingRestricted                │
//! │       │ no                                                              │
//! │       ▼                                                                 │
//! │  First zone listing the country whose excluded_regions                 │
//! │  do not contain the region                                             │
//! │       │ none                                                            │
//! │       ▼                                                                 │
//! │  Fallback zone ("rest_world")                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Zone methods, price → 0 when subtotal ≥ free_threshold                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Threshold comparisons use the pre-discount subtotal.

use std::collections::HashSet;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::Destination;
use crate::validation;

// =============================================================================
// Shipping Method
// =============================================================================

/// Estimated delivery time in calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DeliveryWindow {
    pub min_days: u32,
    pub max_days: u32,
}

impl DeliveryWindow {
    /// Shown when no method can be resolved for an estimate.
    pub const FALLBACK: DeliveryWindow = DeliveryWindow {
        min_days: 7,
        max_days: 21,
    };

    pub const fn new(min_days: u32, max_days: u32) -> Self {
        DeliveryWindow { min_days, max_days }
    }
}

/// A way of shipping an order within a zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShippingMethod {
    /// Unique across the whole table (`standard_es`, `express_eu`...).
    pub id: String,

    pub name: String,

    /// Price before any free-shipping threshold.
    pub price: Money,

    pub delivery: DeliveryWindow,

    /// Subtotal at or above which this method is free.
    #[serde(default)]
    pub free_threshold: Option<Money>,

    /// Destination may charge import duties on delivery.
    #[serde(default)]
    pub customs_fees: bool,

    /// Shopper must choose a pickup point.
    #[serde(default)]
    pub needs_location_selector: bool,
}

impl ShippingMethod {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: Money,
        delivery: DeliveryWindow,
    ) -> Self {
        ShippingMethod {
            id: id.into(),
            name: name.into(),
            price,
            delivery,
            free_threshold: None,
            customs_fees: false,
            needs_location_selector: false,
        }
    }

    pub fn with_free_threshold(mut self, threshold: Money) -> Self {
        self.free_threshold = Some(threshold);
        self
    }

    pub fn with_customs_fees(mut self) -> Self {
        self.customs_fees = true;
        self
    }

    pub fn with_location_selector(mut self) -> Self {
        self.needs_location_selector = true;
        self
    }

    /// Returns true when the subtotal reaches the free-shipping threshold.
    pub fn qualifies_for_free_shipping(&self, subtotal: Money) -> bool {
        matches!(self.free_threshold, Some(threshold) if subtotal >= threshold)
    }

    /// Price actually charged for this subtotal.
    pub fn effective_price(&self, subtotal: Money) -> Money {
        if self.qualifies_for_free_shipping(subtotal) {
            Money::zero()
        } else {
            self.price
        }
    }

    /// Amount still missing for free shipping ("add 10,01 € more").
    ///
    /// `None` when the method has no threshold or the threshold is met.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::Money;
    /// use storefront_core::shipping::{DeliveryWindow, ShippingMethod};
    ///
    /// let standard = ShippingMethod::new("standard_es", "Estándar", Money::from_cents(495), DeliveryWindow::new(1, 3))
    ///     .with_free_threshold(Money::from_cents(5000));
    /// assert_eq!(standard.free_shipping_gap(Money::from_cents(3999)), Some(Money::from_cents(1001)));
    /// assert_eq!(standard.free_shipping_gap(Money::from_cents(5000)), None);
    /// ```
    pub fn free_shipping_gap(&self, subtotal: Money) -> Option<Money> {
        let threshold = self.free_threshold?;
        if subtotal >= threshold {
            None
        } else {
            Some(threshold.saturating_sub_to_zero(subtotal))
        }
    }

    /// Delivery dates counted in calendar days from `from`.
    pub fn estimate_delivery(&self, from: NaiveDate) -> DeliveryEstimate {
        DeliveryEstimate {
            method_id: Some(self.id.clone()),
            min_days: self.delivery.min_days,
            max_days: self.delivery.max_days,
            earliest: Some(add_days(from, self.delivery.min_days)),
            latest: Some(add_days(from, self.delivery.max_days)),
        }
    }

    fn validate(&self) -> CoreResult<()> {
        validation::validate_price_cents(self.price.cents())?;
        if let Some(threshold) = self.free_threshold {
            validation::validate_price_cents(threshold.cents())?;
        }
        if self.delivery.min_days > self.delivery.max_days {
            return Err(CoreError::InvalidCatalog {
                reason: format!("method {} has min_days > max_days", self.id),
            });
        }
        Ok(())
    }
}

fn add_days(from: NaiveDate, days: u32) -> NaiveDate {
    from.checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX)
}

// =============================================================================
// Shipping Zone
// =============================================================================

/// A group of countries sharing the same shipping methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShippingZone {
    pub id: String,

    pub name: String,

    /// ISO alpha-2 codes. Empty for the fallback zone.
    #[serde(default)]
    pub countries: Vec<String>,

    /// Qualified region codes (`ES-CN`) carved out of a listed country.
    #[serde(default)]
    pub excluded_regions: Vec<String>,

    pub methods: Vec<ShippingMethod>,
}

impl ShippingZone {
    /// Returns true when this zone serves the (normalized) destination.
    pub fn covers(&self, destination: &Destination) -> bool {
        let listed = self.countries.iter().any(|c| *c == destination.country);
        let excluded = destination
            .region_code()
            .is_some_and(|r| self.excluded_regions.iter().any(|x| x == r));
        listed && !excluded
    }

    pub fn method(&self, method_id: &str) -> Option<&ShippingMethod> {
        self.methods.iter().find(|m| m.id == method_id)
    }
}

// =============================================================================
// Quotes & Estimates
// =============================================================================

/// A shipping method priced for a specific order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShippingQuote {
    pub zone_id: String,
    pub method_id: String,
    pub name: String,

    /// Price before the free-shipping threshold.
    pub base_price: Money,

    /// Price charged.
    pub price: Money,

    pub delivery: DeliveryWindow,
    pub customs_fees: bool,
    pub needs_location_selector: bool,

    /// Amount still missing for this method to become free.
    pub amount_to_free_shipping: Option<Money>,
}

impl ShippingQuote {
    fn new(zone: &ShippingZone, method: &ShippingMethod, subtotal: Money) -> Self {
        ShippingQuote {
            zone_id: zone.id.clone(),
            method_id: method.id.clone(),
            name: method.name.clone(),
            base_price: method.price,
            price: method.effective_price(subtotal),
            delivery: method.delivery,
            customs_fees: method.customs_fees,
            needs_location_selector: method.needs_location_selector,
            amount_to_free_shipping: method.free_shipping_gap(subtotal),
        }
    }

    /// True when the threshold made this method free.
    pub fn is_free(&self) -> bool {
        self.price.is_zero()
    }
}

/// Delivery estimate for a method.
///
/// Dates are `None` for the fallback window (method could not be resolved).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DeliveryEstimate {
    pub method_id: Option<String>,
    pub min_days: u32,
    pub max_days: u32,
    #[ts(as = "Option<String>")]
    pub earliest: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub latest: Option<NaiveDate>,
}

impl DeliveryEstimate {
    pub fn fallback() -> Self {
        DeliveryEstimate {
            method_id: None,
            min_days: DeliveryWindow::FALLBACK.min_days,
            max_days: DeliveryWindow::FALLBACK.max_days,
            earliest: None,
            latest: None,
        }
    }
}

// =============================================================================
// Shipping Table
// =============================================================================

/// The full zone table plus the shipping denylist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShippingTable {
    /// Zones in match order; the first covering zone wins.
    pub zones: Vec<ShippingZone>,

    /// Zone used when no other zone covers the destination.
    pub fallback_zone: String,

    /// Countries never shipped to.
    #[serde(default)]
    pub restricted_countries: Vec<String>,
}

impl ShippingTable {
    /// Returns false for denylisted countries. Case-insensitive.
    pub fn is_eligible_for_shipping(&self, country: &str) -> bool {
        let country = country.trim();
        !self
            .restricted_countries
            .iter()
            .any(|c| c.eq_ignore_ascii_case(country))
    }

    /// Fails with `ShippingRestricted` for denylisted destinations.
    pub fn ensure_shippable(&self, destination: &Destination) -> CoreResult<()> {
        if self.is_eligible_for_shipping(&destination.country) {
            Ok(())
        } else {
            Err(CoreError::ShippingRestricted {
                country: destination.country.trim().to_ascii_uppercase(),
            })
        }
    }

    /// Resolves the zone serving a destination.
    ///
    /// ## Errors
    /// - `InvalidDestination` for a malformed destination
    /// - `ShippingRestricted` for a denylisted country
    /// - `InvalidCatalog` when the fallback zone is missing
    pub fn resolve_zone(&self, destination: &Destination) -> CoreResult<&ShippingZone> {
        let destination = destination.normalize()?;
        self.ensure_shippable(&destination)?;

        self.zones
            .iter()
            .find(|z| z.covers(&destination))
            .or_else(|| self.zones.iter().find(|z| z.id == self.fallback_zone))
            .ok_or_else(|| CoreError::InvalidCatalog {
                reason: format!("fallback zone {} not found", self.fallback_zone),
            })
    }

    /// Lists every method of the destination's zone, priced for `subtotal`.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::catalog::PricingCatalog;
    /// use storefront_core::money::Money;
    /// use storefront_core::types::Destination;
    ///
    /// let catalog = PricingCatalog::default();
    /// let quotes = catalog.shipping
    ///     .available_methods(&Destination::country("ES"), Money::from_cents(6000))
    ///     .unwrap();
    /// assert_eq!(quotes[0].method_id, "standard_es");
    /// assert!(quotes[0].is_free());
    /// ```
    pub fn available_methods(
        &self,
        destination: &Destination,
        subtotal: Money,
    ) -> CoreResult<Vec<ShippingQuote>> {
        ensure_subtotal(subtotal)?;
        let zone = self.resolve_zone(destination)?;
        Ok(zone
            .methods
            .iter()
            .map(|m| ShippingQuote::new(zone, m, subtotal))
            .collect())
    }

    /// Prices one selected method.
    ///
    /// ## Errors
    /// `UnknownShippingMethod` when the zone does not offer `method_id`,
    /// plus everything [`ShippingTable::resolve_zone`] returns.
    pub fn quote(
        &self,
        destination: &Destination,
        method_id: &str,
        subtotal: Money,
    ) -> CoreResult<ShippingQuote> {
        ensure_subtotal(subtotal)?;
        let zone = self.resolve_zone(destination)?;
        let method = zone
            .method(method_id.trim())
            .ok_or_else(|| CoreError::UnknownShippingMethod {
                method_id: method_id.trim().to_string(),
                zone_id: zone.id.clone(),
            })?;
        Ok(ShippingQuote::new(zone, method, subtotal))
    }

    /// Prices the zone's default method (the first one listed).
    ///
    /// Used when the shopper has not picked a method yet.
    pub fn default_quote(
        &self,
        destination: &Destination,
        subtotal: Money,
    ) -> CoreResult<ShippingQuote> {
        ensure_subtotal(subtotal)?;
        let zone = self.resolve_zone(destination)?;
        let method = zone.methods.first().ok_or_else(|| CoreError::InvalidCatalog {
            reason: format!("shipping zone {} has no methods", zone.id),
        })?;
        Ok(ShippingQuote::new(zone, method, subtotal))
    }

    /// Delivery estimate for a method, counted from `from`.
    ///
    /// A method the zone does not offer yields the 7-21 day fallback
    /// window with no dates. A denylisted country is still an error.
    pub fn estimate_delivery(
        &self,
        destination: &Destination,
        method_id: &str,
        from: NaiveDate,
    ) -> CoreResult<DeliveryEstimate> {
        let zone = self.resolve_zone(destination)?;
        Ok(zone
            .method(method_id.trim())
            .map(|m| m.estimate_delivery(from))
            .unwrap_or_else(DeliveryEstimate::fallback))
    }

    /// Checks table consistency: unique zone and method ids, fallback
    /// zone present, non-negative prices, sane delivery windows.
    pub fn validate(&self) -> CoreResult<()> {
        let mut zone_ids = HashSet::new();
        let mut method_ids = HashSet::new();

        for zone in &self.zones {
            if !zone_ids.insert(zone.id.as_str()) {
                return Err(CoreError::InvalidCatalog {
                    reason: format!("duplicate shipping zone {}", zone.id),
                });
            }
            if zone.methods.is_empty() {
                return Err(CoreError::InvalidCatalog {
                    reason: format!("shipping zone {} has no methods", zone.id),
                });
            }
            for method in &zone.methods {
                if !method_ids.insert(method.id.as_str()) {
                    return Err(CoreError::InvalidCatalog {
                        reason: format!("duplicate shipping method {}", method.id),
                    });
                }
                method.validate()?;
            }
        }

        if !zone_ids.contains(self.fallback_zone.as_str()) {
            return Err(CoreError::InvalidCatalog {
                reason: format!("fallback zone {} not found", self.fallback_zone),
            });
        }

        Ok(())
    }
}

/// Threshold math is only defined for non-negative subtotals.
fn ensure_subtotal(subtotal: Money) -> CoreResult<()> {
    if subtotal.is_negative() {
        return Err(ValidationError::MustBePositive {
            field: "subtotal".to_string(),
        }
        .into());
    }
    Ok(())
}

/// Resolves the shipping charge for an order.
///
/// A blank or missing `method_id` picks the zone's default method; any
/// other id must be offered by the destination's zone. A negative
/// subtotal is a validation error.
///
/// ## Example
/// ```rust
/// use storefront_core::catalog::PricingCatalog;
/// use storefront_core::money::Money;
/// use storefront_core::shipping::resolve_shipping;
/// use storefront_core::types::Destination;
///
/// let catalog = PricingCatalog::default();
/// let fr = Destination::country("FR");
/// let quote = resolve_shipping(&catalog.shipping, &fr, None, Money::from_cents(2000)).unwrap();
/// assert_eq!(quote.method_id, "standard_eu");
/// assert_eq!(quote.price.cents(), 995);
/// ```
pub fn resolve_shipping(
    table: &ShippingTable,
    destination: &Destination,
    method_id: Option<&str>,
    subtotal: Money,
) -> CoreResult<ShippingQuote> {
    match method_id.map(str::trim).filter(|m| !m.is_empty()) {
        Some(method_id) => table.quote(destination, method_id, subtotal),
        None => table.default_quote(destination, subtotal),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
