//! # Pricing Routes
//!
//! Prices an ad-hoc cart snapshot, for callers that keep the cart on the
//! client side.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use storefront_core::{
    price_order, AppliedDiscount, CurrencyFormat, Destination, LineItem, OrderQuote, ShippingQuote,
    Totals,
};
use tracing::debug;

use super::{display_opt, TotalsDisplay};
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/pricing/quote", post(quote))
}

/// Ad-hoc cart snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteRequest {
    pub items: Vec<LineItem>,

    #[serde(default)]
    pub coupon_code: Option<String>,

    pub destination: Destination,

    #[serde(default)]
    pub shipping_method: Option<String>,
}

/// Selected shipping method with display prices.
#[derive(Debug, Clone, Serialize)]
pub struct ShippingView {
    #[serde(flatten)]
    pub quote: ShippingQuote,
    pub price_display: String,
    pub amount_to_free_shipping_display: Option<String>,
}

impl ShippingView {
    pub fn new(quote: ShippingQuote, currency: &CurrencyFormat) -> Self {
        ShippingView {
            price_display: currency.format(quote.price),
            amount_to_free_shipping_display: display_opt(quote.amount_to_free_shipping, currency),
            quote,
        }
    }
}

/// Priced order returned by every totals endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteResponse {
    pub totals: Totals,
    pub display: TotalsDisplay,
    pub discount: AppliedDiscount,
    pub shipping: Option<ShippingView>,
    pub tax_rate_bps: u32,
    pub destination: Destination,
}

impl QuoteResponse {
    pub fn new(quote: OrderQuote, currency: &CurrencyFormat) -> Self {
        QuoteResponse {
            display: TotalsDisplay::new(&quote.totals, currency),
            totals: quote.totals,
            discount: quote.discount,
            shipping: quote.shipping.map(|s| ShippingView::new(s, currency)),
            tax_rate_bps: quote.tax_rate.bps(),
            destination: quote.destination,
        }
    }
}

/// Prices a cart snapshot without storing anything.
///
/// ## Request
/// ```json
/// {
///   "items": [{ "product_id": "2", "unit_price": 2000, "quantity": 2 }],
///   "coupon_code": "DESCUENTO10",
///   "destination": { "country": "ES" },
///   "shipping_method": "standard_es"
/// }
/// ```
async fn quote(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, ApiError> {
    debug!(
        items = request.items.len(),
        country = %request.destination.country,
        coupon = ?request.coupon_code,
        method = ?request.shipping_method,
        "pricing quote"
    );

    let quote = price_order(
        &state.config.catalog,
        &request.items,
        request.coupon_code.as_deref(),
        &request.destination,
        request.shipping_method.as_deref(),
    )?;

    Ok(Json(QuoteResponse::new(quote, &state.config.currency)))
}
