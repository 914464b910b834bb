//! # storefront-core: Pure Pricing Logic for the Storefront
//!
//! This crate holds every pricing rule of the storefront as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Storefront Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Front end (Next.js)                          │   │
//! │  │    Catalog ──► Cart ──► Checkout (address/payment/review)      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    storefront-api (axum)                        │   │
//! │  │    /api/carts, /api/pricing/quote, /api/shipping/methods...    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ storefront-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │ discount │ │ shipping │ │   tax    │ │  totals  │          │   │
//! │  │   │ Coupon   │ │ Zone     │ │ TaxTable │ │ price_   │          │   │
//! │  │   │          │ │ Method   │ │          │ │ order    │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │  money   │ │   cart   │ │ checkout │ │validation│          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK • NO NETWORK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type, rounding, currency formatting
//! - [`types`] - LineItem, Destination, TaxRate, Totals
//! - [`discount`] - Coupons and the discount evaluator
//! - [`shipping`] - Zones, methods, quotes, delivery estimates
//! - [`tax`] - Per-country tax table
//! - [`totals`] - The order totals aggregator
//! - [`catalog`] - Coupons + shipping + tax as one read-only catalog
//! - [`cart`] - Cart aggregate
//! - [`checkout`] - Steps, address validation, order numbers, payment methods
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::{compute_totals, Destination, LineItem, Money, PricingCatalog};
//!
//! let catalog = PricingCatalog::default();
//! let items = vec![LineItem::new("1", Money::from_cents(10_000), 1)];
//!
//! // 100.00 to Spain: free standard shipping, 21% IVA
//! let totals = compute_totals(&catalog, &items, None, &Destination::country("ES"), Some("standard_es")).unwrap();
//! assert_eq!(totals.shipping.cents(), 0);
//! assert_eq!(totals.tax.cents(), 2100);
//! assert_eq!(totals.total.cents(), 12_100);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod discount;
pub mod error;
pub mod money;
pub mod shipping;
pub mod tax;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::Cart;
pub use catalog::PricingCatalog;
pub use discount::{evaluate_discount, AppliedDiscount, Coupon, DiscountKind};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{CurrencyFormat, Money};
pub use shipping::{resolve_shipping, DeliveryEstimate, ShippingQuote, ShippingTable};
pub use tax::TaxTable;
pub use totals::{compute_totals, price_order, OrderQuote};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
///
/// Catches typos like 1000 instead of 10.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum unit price in cents (1,000,000.00).
///
/// Keeps every line total and cart sum far inside `i64`.
pub const MAX_UNIT_PRICE_CENTS: i64 = 100_000_000;
