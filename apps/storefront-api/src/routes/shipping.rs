//! # Shipping Routes
//!
//! Live shipping estimate for the cart page and delivery dates for
//! checkout.
//!
//! ```text
//! GET /api/shipping/methods?country=ES&subtotal=4000
//!   ┌────────────────────────────────────────────────────────┐
//!   │  Envío Estándar        4,95 €   (te faltan 10,00 €)    │
//!   │  Envío Express 24h     9,95 €                          │
//!   │  Recogida en punto     3,50 €   [elegir punto]         │
//!   └────────────────────────────────────────────────────────┘
//!
//! GET /api/shipping/estimate?country=ES&method=standard_es
//!   → { min_days: 1, max_days: 3, earliest, latest }
//! ```

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use storefront_core::{DeliveryEstimate, Money};
use tracing::debug;

use super::destination_from_query;
use super::pricing::ShippingView;
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/shipping/methods", get(methods))
        .route("/api/shipping/estimate", get(estimate))
}

#[derive(Debug, Deserialize)]
pub struct MethodsQuery {
    pub country: String,
    pub region: Option<String>,

    /// Cart subtotal in cents, for free-shipping thresholds.
    #[serde(default)]
    pub subtotal: i64,
}

#[derive(Debug, Serialize)]
pub struct MethodsResponse {
    pub zone_id: Option<String>,
    pub methods: Vec<ShippingView>,
}

/// Lists the methods offered to a destination, priced for a subtotal.
async fn methods(
    State(state): State<AppState>,
    Query(query): Query<MethodsQuery>,
) -> Result<Json<MethodsResponse>, ApiError> {
    debug!(country = %query.country, region = ?query.region, subtotal = query.subtotal, "shipping methods");

    let subtotal = Money::from_cents(query.subtotal);
    if subtotal.is_negative() {
        return Err(ApiError::validation("subtotal must not be negative"));
    }

    let destination = destination_from_query(&query.country, query.region.as_deref());
    let quotes = state
        .config
        .catalog
        .shipping
        .available_methods(&destination, subtotal)?;

    let currency = &state.config.currency;
    Ok(Json(MethodsResponse {
        zone_id: quotes.first().map(|q| q.zone_id.clone()),
        methods: quotes
            .into_iter()
            .map(|q| ShippingView::new(q, currency))
            .collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct EstimateQuery {
    pub country: String,
    pub region: Option<String>,
    pub method: String,
}

/// Delivery window for a method, counted from today.
///
/// An unknown method yields the 7-21 day fallback without dates.
async fn estimate(
    State(state): State<AppState>,
    Query(query): Query<EstimateQuery>,
) -> Result<Json<DeliveryEstimate>, ApiError> {
    debug!(country = %query.country, method = %query.method, "delivery estimate");

    let destination = destination_from_query(&query.country, query.region.as_deref());
    let today = Utc::now().date_naive();
    let estimate = state
        .config
        .catalog
        .shipping
        .estimate_delivery(&destination, &query.method, today)?;

    Ok(Json(estimate))
}
