//! # Pricing Catalog
//!
//! The read-only rule data every pricing call consumes: coupons, shipping
//! zones and tax rates.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  storefront.toml [catalog] ──► PricingCatalog ──► Arc (app state)      │
//! │        (or the seeded default below)     │                              │
//! │                                          ├──► evaluate_discount        │
//! │                                          ├──► ShippingTable::quote     │
//! │                                          └──► TaxTable::calculate_tax  │
//! │                                                                         │
//! │  Loaded once at startup, validated, then never mutated.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::discount::{self, Coupon};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::shipping::{DeliveryWindow, ShippingMethod, ShippingTable, ShippingZone};
use crate::tax::TaxTable;
use crate::types::TaxRate;

/// Coupons, shipping table and tax table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct PricingCatalog {
    pub coupons: Vec<Coupon>,
    pub shipping: ShippingTable,
    pub tax: TaxTable,
}

impl PricingCatalog {
    /// Finds a coupon by code, ignoring case.
    pub fn coupon(&self, code: &str) -> Option<&Coupon> {
        discount::find_coupon(&self.coupons, code)
    }

    /// Checks the whole catalog.
    ///
    /// ## Rules
    /// - coupon codes unique (case-insensitive), rates ≤ 100%, amounts ≥ 0
    /// - shipping zone and method ids unique, fallback zone present
    /// - tax rates ≤ 100%
    pub fn validate(&self) -> CoreResult<()> {
        let mut codes = HashSet::new();
        for coupon in &self.coupons {
            coupon.validate()?;
            if !codes.insert(coupon.code.trim().to_ascii_uppercase()) {
                return Err(CoreError::InvalidCatalog {
                    reason: format!("duplicate coupon code {}", coupon.code),
                });
            }
        }

        self.shipping.validate()?;
        self.tax.validate()?;
        Ok(())
    }
}

impl Default for PricingCatalog {
    fn default() -> Self {
        PricingCatalog {
            coupons: default_coupons(),
            shipping: default_shipping_table(),
            tax: default_tax_table(),
        }
    }
}

// =============================================================================
// Seeded Data
// =============================================================================

fn default_coupons() -> Vec<Coupon> {
    vec![
        Coupon::percentage("DESCUENTO10", 1000).with_description("10% de descuento"),
        Coupon::fixed("BIENVENIDO", Money::from_cents(500))
            .with_description("5 € de descuento en tu primer pedido"),
        Coupon::percentage("PRIMAVERA", 1500).with_description("15% de descuento de primavera"),
        Coupon::free_shipping("ENVIOGRATIS").with_description("Envío gratis"),
    ]
}

fn zone(id: &str, name: &str, countries: &[&str], methods: Vec<ShippingMethod>) -> ShippingZone {
    ShippingZone {
        id: id.to_string(),
        name: name.to_string(),
        countries: countries.iter().map(|c| c.to_string()).collect(),
        excluded_regions: Vec::new(),
        methods,
    }
}

fn method(id: &str, name: &str, cents: i64, min_days: u32, max_days: u32) -> ShippingMethod {
    ShippingMethod::new(
        id,
        name,
        Money::from_cents(cents),
        DeliveryWindow::new(min_days, max_days),
    )
}

fn default_shipping_table() -> ShippingTable {
    let mut spain = zone(
        "spain",
        "España Peninsular",
        &["ES"],
        vec![
            method("standard_es", "Envío Estándar", 495, 1, 3)
                .with_free_threshold(Money::from_cents(5000)),
            method("express_es", "Envío Express 24h", 995, 1, 1),
            method("pickup_point", "Recogida en punto de conveniencia", 350, 2, 4)
                .with_location_selector(),
        ],
    );
    // Canarias, Ceuta, Melilla
    spain.excluded_regions = vec!["ES-CN".into(), "ES-CE".into(), "ES-ML".into()];

    let zones = vec![
        spain,
        zone(
            "eu",
            "Unión Europea",
            &["FR", "IT", "DE", "PT", "BE", "NL", "LU", "AT", "IE"],
            vec![
                method("standard_eu", "Envío Estándar UE", 995, 3, 5)
                    .with_free_threshold(Money::from_cents(10_000)),
                method("express_eu", "Envío Express UE", 1495, 1, 2),
            ],
        ),
        zone(
            "europe_non_eu",
            "Europa (No UE)",
            &["GB", "CH", "NO"],
            vec![
                method("standard_non_eu", "Envío Estándar Europa", 1295, 4, 7).with_customs_fees(),
                method("express_non_eu", "Envío Express Europa", 1995, 2, 3).with_customs_fees(),
            ],
        ),
        zone(
            "north_america",
            "Norteamérica",
            &["US", "CA", "MX"],
            vec![
                method("standard_na", "Envío Internacional Estándar", 1995, 7, 12)
                    .with_customs_fees(),
                method("express_na", "Envío Internacional Express", 2995, 3, 5)
                    .with_customs_fees(),
            ],
        ),
        zone(
            "latam",
            "Latinoamérica",
            &["AR", "BR", "CL", "CO", "PE"],
            vec![method("standard_latam", "Envío Internacional Estándar", 2495, 10, 15)
                .with_customs_fees()],
        ),
        zone(
            "asia_pacific",
            "Asia-Pacífico",
            &["CN", "JP", "KR", "AU", "NZ"],
            vec![method("standard_asia", "Envío Internacional Estándar", 2995, 12, 18)
                .with_customs_fees()],
        ),
        zone(
            "rest_world",
            "Resto del mundo",
            &[],
            vec![method("standard_world", "Envío Internacional Estándar", 3495, 15, 21)
                .with_customs_fees()],
        ),
    ];

    ShippingTable {
        zones,
        fallback_zone: "rest_world".to_string(),
        restricted_countries: ["CU", "IR", "KP", "SY"].iter().map(|c| c.to_string()).collect(),
    }
}

fn default_tax_table() -> TaxTable {
    TaxTable::new(TaxRate::from_bps(1000))
        .with_rate("US", TaxRate::from_bps(725))
        .with_rate("CA", TaxRate::from_bps(500))
        .with_rate("MX", TaxRate::from_bps(1600))
        .with_rate("ES", TaxRate::from_bps(2100))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_is_valid() {
        assert!(PricingCatalog::default().validate().is_ok());
    }

    #[test]
    fn test_coupon_lookup_ignores_case() {
        let catalog = PricingCatalog::default();
        assert_eq!(catalog.coupon("bienvenido").map(|c| c.code.as_str()), Some("BIENVENIDO"));
        assert!(catalog.coupon("NOPE").is_none());
    }

    #[test]
    fn test_duplicate_coupon_rejected() {
        let mut catalog = PricingCatalog::default();
        catalog.coupons.push(Coupon::percentage("descuento10", 500));
        assert!(matches!(
            catalog.validate(),
            Err(CoreError::InvalidCatalog { .. })
        ));
    }

    #[test]
    fn test_invalid_tax_rate_rejected() {
        let mut catalog = PricingCatalog::default();
        catalog.tax.default_rate = TaxRate::from_bps(20_000);
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_seeded_tax_rates() {
        let tax = PricingCatalog::default().tax;
        assert_eq!(tax.rates["ES"].bps(), 2100);
        assert_eq!(tax.rates["MX"].bps(), 1600);
        assert_eq!(tax.default_rate.bps(), 1000);
    }

    #[test]
    fn test_catalog_json_shape() {
        let json = serde_json::to_value(PricingCatalog::default()).unwrap();
        assert_eq!(json["shipping"]["fallback_zone"], "rest_world");
        assert_eq!(json["coupons"][1]["kind"]["type"], "fixed");
        assert_eq!(json["coupons"][1]["kind"]["amount"], 500);
    }
}
