//! # Cart Aggregate
//!
//! The shopper's cart as explicit state. The caller owns it, mutates it
//! through these methods and hands it to a store for persistence.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Operations                                   │
//! │                                                                         │
//! │  Front end action       HTTP endpoint                Cart change        │
//! │  ────────────────       ─────────────                ───────────        │
//! │                                                                         │
//! │  Add to cart ─────────► POST   /items ─────────────► add_item()        │
//! │                                                       (merge same      │
//! │                                                        product+variant)│
//! │  Change quantity ─────► PUT    /items/{product} ────► update_quantity()│
//! │                                                       (0 removes)      │
//! │  Remove ──────────────► DELETE /items/{product} ────► remove_item()    │
//! │                                                                         │
//! │  Apply coupon ────────► POST   /coupon ─────────────► apply_coupon()   │
//! │                                                                         │
//! │  Checkout address ────► PUT    /destination ────────► set_destination()│
//! │                                                                         │
//! │  Review ──────────────► GET    /totals ─────────────► quote()          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::catalog::PricingCatalog;
use crate::discount::Coupon;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::totals::{self, OrderQuote};
use crate::types::{Destination, LineItem, Totals};
use crate::validation;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// A shopping cart.
///
/// ## Invariants
/// - Lines are unique by (product, variant); adding again sums quantities
/// - Every line has 1 ≤ quantity ≤ 999
/// - At most 100 distinct lines
/// - `coupon_code` is always a canonical catalog code
/// - `destination` is always normalized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    #[ts(as = "String")]
    pub id: Uuid,

    #[serde(default)]
    pub items: Vec<LineItem>,

    #[serde(default)]
    pub coupon_code: Option<String>,

    #[serde(default)]
    pub destination: Option<Destination>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new(id: Uuid) -> Self {
        Cart {
            id,
            items: Vec::new(),
            coupon_code: None,
            destination: None,
        }
    }

    /// Adds a line, or increases the quantity of a matching line.
    ///
    /// ## Errors
    /// - validation error for quantity < 1 or a negative price
    /// - `QuantityTooLarge` when the merged quantity exceeds 999
    /// - `CartTooLarge` when a new line would exceed 100 lines
    pub fn add_item(&mut self, item: LineItem) -> CoreResult<()> {
        item.validate()?;

        if let Some(line) = self
            .items
            .iter_mut()
            .find(|l| l.matches(&item.product_id, item.variant_id.as_deref()))
        {
            let merged = line.quantity + item.quantity;
            if merged > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: merged,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            line.quantity = merged;
            return Ok(());
        }

        validation::validate_cart_size(self.items.len())
            .map_err(|_| CoreError::CartTooLarge { max: MAX_CART_ITEMS })?;

        self.items.push(item);
        Ok(())
    }

    /// Sets the quantity of a line. Zero removes it.
    pub fn update_quantity(
        &mut self,
        product_id: &str,
        variant_id: Option<&str>,
        quantity: i64,
    ) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_item(product_id, variant_id);
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }
        validation::validate_quantity(quantity)?;

        let line = self
            .items
            .iter_mut()
            .find(|l| l.matches(product_id, variant_id))
            .ok_or_else(|| CoreError::ItemNotFound {
                product_id: product_id.to_string(),
            })?;
        line.quantity = quantity;
        Ok(())
    }

    /// Removes a line.
    pub fn remove_item(&mut self, product_id: &str, variant_id: Option<&str>) -> CoreResult<()> {
        let before = self.items.len();
        self.items.retain(|l| !l.matches(product_id, variant_id));

        if self.items.len() == before {
            Err(CoreError::ItemNotFound {
                product_id: product_id.to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Empties the cart and drops the coupon. The destination is kept.
    pub fn clear(&mut self) {
        self.items.clear();
        self.coupon_code = None;
    }

    /// Attaches a coupon after checking it exists in the catalog.
    ///
    /// Stores the canonical code (`descuento10` → `DESCUENTO10`). Expiry
    /// and usage limits are the caller's job ([`Coupon::check_redeemable`]).
    pub fn apply_coupon<'c>(
        &mut self,
        catalog: &'c PricingCatalog,
        code: &str,
    ) -> CoreResult<&'c Coupon> {
        let coupon = catalog
            .coupon(code)
            .ok_or_else(|| CoreError::InvalidCoupon {
                code: code.trim().to_string(),
            })?;
        self.coupon_code = Some(coupon.code.clone());
        Ok(coupon)
    }

    pub fn remove_coupon(&mut self) {
        self.coupon_code = None;
    }

    /// Sets the shipping destination, normalized.
    pub fn set_destination(&mut self, destination: &Destination) -> CoreResult<()> {
        self.destination = Some(destination.normalize()?);
        Ok(())
    }

    /// Total quantity across all lines (the cart badge number).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|l| l.quantity).sum()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn subtotal(&self) -> CoreResult<Money> {
        totals::subtotal(&self.items)
    }

    /// Prices the cart with its own coupon and destination.
    ///
    /// ## Errors
    /// `InvalidDestination` when no destination has been set, plus any
    /// error from [`totals::price_order`].
    pub fn quote(
        &self,
        catalog: &PricingCatalog,
        shipping_method: Option<&str>,
    ) -> CoreResult<OrderQuote> {
        let destination = self
            .destination
            .as_ref()
            .ok_or_else(|| CoreError::InvalidDestination {
                reason: "destination is required".to_string(),
            })?;

        totals::price_order(
            catalog,
            &self.items,
            self.coupon_code.as_deref(),
            destination,
            shipping_method,
        )
    }

    pub fn totals(
        &self,
        catalog: &PricingCatalog,
        shipping_method: Option<&str>,
    ) -> CoreResult<Totals> {
        self.quote(catalog, shipping_method).map(|q| q.totals)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cart() -> Cart {
        Cart::new(Uuid::nil())
    }

    fn item(id: &str, cents: i64, qty: i64) -> LineItem {
        LineItem::new(id, Money::from_cents(cents), qty)
    }

    #[test]
    fn test_add_item() {
        let mut cart = cart();
        cart.add_item(item("1", 8999, 2)).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.subtotal().unwrap().cents(), 17_998);
    }

    #[test]
    fn test_add_same_product_merges() {
        let mut cart = cart();
        cart.add_item(item("1", 8999, 2)).unwrap();
        cart.add_item(item("1", 8999, 3)).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_variants_are_separate_lines() {
        let mut cart = cart();
        cart.add_item(item("2", 2999, 1).with_variant("2-M")).unwrap();
        cart.add_item(item("2", 2999, 1).with_variant("2-L")).unwrap();
        cart.add_item(item("2", 2999, 1).with_variant("2-M")).unwrap();

        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.items[0].quantity, 2);
    }

    #[test]
    fn test_add_rejects_bad_quantity() {
        let mut cart = cart();
        assert!(cart.add_item(item("1", 100, 0)).is_err());
        assert!(cart.add_item(item("1", 100, -2)).is_err());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_merge_cannot_exceed_max_quantity() {
        let mut cart = cart();
        cart.add_item(item("1", 100, 998)).unwrap();
        let err = cart.add_item(item("1", 100, 2)).unwrap_err();
        assert_eq!(
            err,
            CoreError::QuantityTooLarge {
                requested: 1000,
                max: MAX_ITEM_QUANTITY
            }
        );
        assert_eq!(cart.item_count(), 998);
    }

    #[test]
    fn test_max_lines() {
        let mut cart = cart();
        for i in 0..MAX_CART_ITEMS {
            cart.add_item(item(&i.to_string(), 100, 1)).unwrap();
        }
        let err = cart.add_item(item("extra", 100, 1)).unwrap_err();
        assert_eq!(err, CoreError::CartTooLarge { max: MAX_CART_ITEMS });

        // Merging into an existing line still works
        assert!(cart.add_item(item("0", 100, 1)).is_ok());
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = cart();
        cart.add_item(item("1", 8999, 1)).unwrap();

        cart.update_quantity("1", None, 4).unwrap();
        assert_eq!(cart.item_count(), 4);

        cart.update_quantity("1", None, 0).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_errors() {
        let mut cart = cart();
        cart.add_item(item("1", 8999, 1)).unwrap();

        assert!(matches!(
            cart.update_quantity("9", None, 2),
            Err(CoreError::ItemNotFound { .. })
        ));
        assert!(matches!(
            cart.update_quantity("1", None, 1000),
            Err(CoreError::QuantityTooLarge { .. })
        ));
        assert!(matches!(
            cart.update_quantity("1", None, -1),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_remove_item() {
        let mut cart = cart();
        cart.add_item(item("1", 8999, 1)).unwrap();
        cart.add_item(item("2", 2999, 1)).unwrap();

        cart.remove_item("1", None).unwrap();
        assert_eq!(cart.line_count(), 1);
        assert!(cart.remove_item("1", None).is_err());
    }

    #[test]
    fn test_clear_keeps_destination() {
        let catalog = PricingCatalog::default();
        let mut cart = cart();
        cart.add_item(item("1", 8999, 1)).unwrap();
        cart.apply_coupon(&catalog, "DESCUENTO10").unwrap();
        cart.set_destination(&Destination::country("es")).unwrap();

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.coupon_code, None);
        assert_eq!(cart.destination.map(|d| d.country).as_deref(), Some("ES"));
    }

    #[test]
    fn test_apply_coupon_stores_canonical_code() {
        let catalog = PricingCatalog::default();
        let mut cart = cart();

        let coupon = cart.apply_coupon(&catalog, " primavera ").unwrap();
        assert_eq!(coupon.code, "PRIMAVERA");
        assert_eq!(cart.coupon_code.as_deref(), Some("PRIMAVERA"));

        assert!(matches!(
            cart.apply_coupon(&catalog, "NOPE"),
            Err(CoreError::InvalidCoupon { .. })
        ));
        // Failed apply keeps the previous coupon
        assert_eq!(cart.coupon_code.as_deref(), Some("PRIMAVERA"));

        cart.remove_coupon();
        assert_eq!(cart.coupon_code, None);
    }

    #[test]
    fn test_quote_requires_destination() {
        let catalog = PricingCatalog::default();
        let mut cart = cart();
        cart.add_item(item("1", 1000, 1)).unwrap();

        assert!(matches!(
            cart.totals(&catalog, None),
            Err(CoreError::InvalidDestination { .. })
        ));
    }

    #[test]
    fn test_cart_totals() {
        let catalog = PricingCatalog::default();
        let mut cart = cart();
        cart.add_item(item("2", 2000, 2)).unwrap();
        cart.apply_coupon(&catalog, "descuento10").unwrap();
        cart.set_destination(&Destination::country("ES")).unwrap();

        let totals = cart.totals(&catalog, Some("standard_es")).unwrap();
        assert_eq!(totals.total.cents(), 4851);
    }

    #[test]
    fn test_json_snapshot_roundtrip() {
        let mut cart = cart();
        cart.add_item(item("3", 14_999, 1).with_name("Smartwatch Fitness Pro"))
            .unwrap();

        let json = serde_json::to_string(&cart).unwrap();
        let back: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cart);
    }
}
