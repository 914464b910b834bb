//! # Order Totals
//!
//! The single place an order is priced. Every call site (cart endpoint,
//! ad-hoc quote, checkout review) goes through [`price_order`].
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        price_order()                                    │
//! │                                                                         │
//! │  0. destination.normalize() + denylist        → ShippingRestricted     │
//! │  1. subtotal  = Σ unit_price × quantity       (checked)                │
//! │  2. discount  = evaluate_discount(code, subtotal)  + free_shipping flag │
//! │  3. shipping  = 0 if free_shipping                                     │
//! │                 else resolve_shipping(destination, method, subtotal)   │
//! │  4. taxable   = max(0, subtotal − discount)                            │
//! │  5. tax       = taxable × rate_for(destination)                        │
//! │  6. total     = subtotal − discount + shipping + tax   (checked)       │
//! │                                                                         │
//! │  Any error aborts the pipeline. There are no partial totals.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::PricingCatalog;
use crate::discount::{evaluate_discount, AppliedDiscount};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::shipping::{resolve_shipping, ShippingQuote};
use crate::types::{Destination, LineItem, TaxRate, Totals};
use crate::MAX_CART_ITEMS;

/// Totals plus the pieces that produced them, for checkout review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderQuote {
    pub totals: Totals,

    pub discount: AppliedDiscount,

    /// Selected method, `None` when a coupon waived shipping.
    pub shipping: Option<ShippingQuote>,

    pub tax_rate: TaxRate,

    /// Normalized destination the order was priced for.
    pub destination: Destination,
}

/// Sums `unit_price × quantity` over the items.
///
/// Each item is validated (quantity in 1..=999, unit price within
/// bounds) and at most [`MAX_CART_ITEMS`] lines are accepted. Item order
/// does not matter.
pub fn subtotal(items: &[LineItem]) -> CoreResult<Money> {
    if items.len() > MAX_CART_ITEMS {
        return Err(CoreError::CartTooLarge { max: MAX_CART_ITEMS });
    }

    items.iter().try_fold(Money::zero(), |acc, item| {
        item.validate()?;
        item.line_total()
            .and_then(|line| acc.checked_add(line))
            .ok_or(CoreError::AmountOverflow { context: "subtotal" })
    })
}

/// Prices an order.
///
/// ## Arguments
/// * `catalog` - coupons, shipping and tax rules
/// * `items` - cart lines
/// * `coupon_code` - shopper-entered code; blank means no coupon
/// * `destination` - shipping address country/region
/// * `shipping_method` - selected method id; `None` picks the zone's first
///   method
///
/// ## Example
/// ```rust
/// use storefront_core::catalog::PricingCatalog;
/// use storefront_core::money::Money;
/// use storefront_core::totals::price_order;
/// use storefront_core::types::{Destination, LineItem};
///
/// let catalog = PricingCatalog::default();
/// let items = vec![LineItem::new("2", Money::from_cents(2000), 2)];
/// let quote = price_order(
///     &catalog,
///     &items,
///     Some("DESCUENTO10"),
///     &Destination::country("ES"),
///     Some("standard_es"),
/// )
/// .unwrap();
///
/// assert_eq!(quote.totals.discount.cents(), 400);
/// assert_eq!(quote.totals.tax.cents(), 756);
/// assert_eq!(quote.totals.total.cents(), 4851);
/// ```
pub fn price_order(
    catalog: &PricingCatalog,
    items: &[LineItem],
    coupon_code: Option<&str>,
    destination: &Destination,
    shipping_method: Option<&str>,
) -> CoreResult<OrderQuote> {
    let destination = destination.normalize()?;
    catalog.shipping.ensure_shippable(&destination)?;

    let subtotal = subtotal(items)?;

    let discount = evaluate_discount(&catalog.coupons, coupon_code, subtotal)?;

    let shipping = if discount.free_shipping {
        None
    } else {
        Some(resolve_shipping(
            &catalog.shipping,
            &destination,
            shipping_method,
            subtotal,
        )?)
    };
    let shipping_cost = shipping.as_ref().map_or(Money::zero(), |q| q.price);

    let taxable = subtotal.saturating_sub_to_zero(discount.amount);

    let tax_rate = catalog.tax.rate_for(&destination)?;
    let tax = taxable.calculate_tax(tax_rate);

    let total = subtotal
        .checked_sub(discount.amount)
        .and_then(|t| t.checked_add(shipping_cost))
        .and_then(|t| t.checked_add(tax))
        .ok_or(CoreError::AmountOverflow { context: "total" })?;

    Ok(OrderQuote {
        totals: Totals {
            subtotal,
            discount: discount.amount,
            shipping: shipping_cost,
            tax,
            total,
        },
        discount,
        shipping,
        tax_rate,
        destination,
    })
}

/// Prices an order and returns only the totals.
pub fn compute_totals(
    catalog: &PricingCatalog,
    items: &[LineItem],
    coupon_code: Option<&str>,
    destination: &Destination,
    shipping_method: Option<&str>,
) -> CoreResult<Totals> {
    price_order(catalog, items, coupon_code, destination, shipping_method).map(|q| q.totals)
}

// =============================================================================
// Unit Tests
// =============================================================================
