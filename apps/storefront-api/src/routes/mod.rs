//! # HTTP Routes
//!
//! JSON endpoints used by the storefront front end.
//!
//! ## Route Organization
//! ```text
//! routes/
//! ├── mod.rs       ◄─── You are here (router assembly, health, shared DTOs)
//! ├── cart.rs      ◄─── /api/carts/...
//! ├── products.rs  ◄─── /api/products, /api/products/{id}
//! ├── pricing.rs   ◄─── /api/pricing/quote
//! ├── shipping.rs  ◄─── /api/shipping/methods, /api/shipping/estimate
//! └── checkout.rs  ◄─── /api/checkout/...
//! ```
//!
//! ## How a Request Flows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  fetch('/api/carts/{id}/totals?shipping_method=standard_es')           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  TraceLayer ──► Router ──► handler(State<AppState>, Path, Query)       │
//! │                                │                                        │
//! │                                ▼                                        │
//! │                   storefront_core::price_order(...)                     │
//! │                                │                                        │
//! │                                ▼                                        │
//! │  ◄── 200 Json<QuoteResponse>  or  4xx/5xx Json<ApiError>               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Money is always integer cents. Fields ending in `_display` carry the
//! same amount formatted with the configured [`CurrencyFormat`].

pub mod cart;
pub mod checkout;
pub mod pricing;
pub mod products;
pub mod shipping;

use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use storefront_core::validation;
use storefront_core::{CurrencyFormat, Destination, Money, Totals};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(cart::router())
        .merge(products::router())
        .merge(pricing::router())
        .merge(shipping::router())
        .merge(checkout::router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Parses a cart id path segment.
pub(crate) fn parse_cart_id(id: &str) -> Result<Uuid, ApiError> {
    validation::validate_cart_id(id).map_err(|e| ApiError::validation(e.to_string()))?;
    Uuid::parse_str(id.trim()).map_err(|e| ApiError::validation(e.to_string()))
}

/// Builds a destination from query parameters.
pub(crate) fn destination_from_query(country: &str, region: Option<&str>) -> Destination {
    let destination = Destination::country(country);
    match region.map(str::trim).filter(|r| !r.is_empty()) {
        Some(region) => destination.with_region(region),
        None => destination,
    }
}

/// Totals rendered for display.
#[derive(Debug, Clone, Serialize)]
pub struct TotalsDisplay {
    pub subtotal: String,
    pub discount: String,
    pub shipping: String,
    pub tax: String,
    pub total: String,
}

impl TotalsDisplay {
    pub fn new(totals: &Totals, currency: &CurrencyFormat) -> Self {
        TotalsDisplay {
            subtotal: currency.format(totals.subtotal),
            discount: currency.format(totals.discount),
            shipping: currency.format(totals.shipping),
            tax: currency.format(totals.tax),
            total: currency.format(totals.total),
        }
    }
}

/// Formats an amount, or `None` for no amount.
pub(crate) fn display_opt(amount: Option<Money>, currency: &CurrencyFormat) -> Option<String> {
    amount.map(|a| currency.format(a))
}

// =============================================================================
// Test Support
// =============================================================================
