//! # Cart Routes
//!
//! Server-side carts: lines, coupon, destination and totals.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Address  │────►│  Totals  │       │
//! │  │  Cart    │     │          │     │  set     │     │ (review) │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │   POST /carts      POST /items      PUT /destination  GET /totals      │
//! │                    PUT  /items/{p}                                      │
//! │                    DELETE /items/{p}                                    │
//! │                    POST /coupon                                         │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   DELETE /carts/{id} ─────────────► (back to empty)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use storefront_core::validation;
use storefront_core::{Cart, CurrencyFormat, Destination, LineItem, Money};
use tracing::{debug, info};
use uuid::Uuid;

use super::parse_cart_id;
use super::pricing::QuoteResponse;
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/carts", post(create_cart))
        .route("/api/carts/{id}", get(get_cart).delete(clear_cart))
        .route("/api/carts/{id}/items", post(add_item))
        .route(
            "/api/carts/{id}/items/{product_id}",
            put(update_item).delete(remove_item),
        )
        .route(
            "/api/carts/{id}/coupon",
            post(apply_coupon).delete(remove_coupon),
        )
        .route("/api/carts/{id}/destination", put(set_destination))
        .route("/api/carts/{id}/totals", get(totals))
}

// =============================================================================
// Response Types
// =============================================================================

/// One cart line with display prices.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub item: LineItem,
    pub line_total: Money,
    pub unit_price_display: String,
    pub line_total_display: String,
}

/// Cart contents plus running subtotal.
///
/// Full totals need a destination; see `GET /api/carts/{id}/totals`.
#[derive(Debug, Clone, Serialize)]
pub struct CartResponse {
    pub id: Uuid,
    pub items: Vec<CartLine>,
    pub item_count: i64,
    pub subtotal: Money,
    pub subtotal_display: String,
    pub coupon_code: Option<String>,
    pub destination: Option<Destination>,
}

impl CartResponse {
    pub fn new(cart: &Cart, currency: &CurrencyFormat) -> Result<Self, ApiError> {
        let subtotal = cart.subtotal()?;

        let items = cart
            .items
            .iter()
            .map(|item| {
                // Bounded by the subtotal check above
                let line_total = item.line_total().unwrap_or_default();
                CartLine {
                    unit_price_display: currency.format(item.unit_price),
                    line_total_display: currency.format(line_total),
                    line_total,
                    item: item.clone(),
                }
            })
            .collect();

        Ok(CartResponse {
            id: cart.id,
            items,
            item_count: cart.item_count(),
            subtotal,
            subtotal_display: currency.format(subtotal),
            coupon_code: cart.coupon_code.clone(),
            destination: cart.destination.clone(),
        })
    }
}

fn cart_not_found(id: Uuid) -> ApiError {
    ApiError::not_found("Cart", &id.to_string())
}

fn respond(state: &AppState, cart: &Cart) -> Result<Json<CartResponse>, ApiError> {
    CartResponse::new(cart, &state.config.currency).map(Json)
}

// =============================================================================
// Handlers
// =============================================================================

/// Creates an empty cart.
async fn create_cart(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<CartResponse>), ApiError> {
    let cart = state.carts.create()?;
    debug!(cart_id = %cart.id, "create cart");
    Ok((StatusCode::CREATED, respond(&state, &cart)?))
}

async fn get_cart(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let id = parse_cart_id(&id)?;
    debug!(cart_id = %id, "get cart");

    state
        .carts
        .with_cart(id, |cart| respond(&state, cart))
        .ok_or_else(|| cart_not_found(id))?
}

/// Empties the cart and gives its coupon redemption back.
async fn clear_cart(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let id = parse_cart_id(&id)?;
    debug!(cart_id = %id, "clear cart");

    let (response, released) = state
        .carts
        .with_cart_mut(id, |cart| {
            let released = cart.coupon_code.clone();
            cart.clear();
            respond(&state, cart).map(|r| (r, released))
        })?
        .ok_or_else(|| cart_not_found(id))?;

    if let Some(code) = released {
        state.redemptions.release(&code);
    }
    Ok(response)
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,

    #[serde(default)]
    pub variant_id: Option<String>,

    /// Defaults to 1.
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// Adds a product at its current catalog price.
async fn add_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let id = parse_cart_id(&id)?;
    let quantity = request.quantity.unwrap_or(1);
    debug!(cart_id = %id, product_id = %request.product_id, quantity = %quantity, "add item");

    validation::validate_product_id(&request.product_id)
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let product = state
        .products
        .get(&request.product_id)
        .ok_or_else(|| ApiError::not_found("Product", &request.product_id))?;

    let mut item = LineItem::new(product.id.clone(), product.price, quantity)
        .with_name(product.name.clone());
    let variant = request
        .variant_id
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    if let Some(variant) = variant {
        if !product.variants.is_empty() && !product.has_variant(&variant) {
            return Err(ApiError::validation(format!(
                "product {} has no variant {}",
                product.id, variant
            )));
        }
        item = item.with_variant(variant);
    }

    state
        .carts
        .with_cart_mut(id, |cart| {
            cart.add_item(item)?;
            respond(&state, cart)
        })?
        .ok_or_else(|| cart_not_found(id))
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i64,

    #[serde(default)]
    pub variant_id: Option<String>,
}

/// Sets a line's quantity. Zero removes the line.
async fn update_item(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(String, String)>,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let id = parse_cart_id(&id)?;
    debug!(cart_id = %id, product_id = %product_id, quantity = %request.quantity, "update item");

    state
        .carts
        .with_cart_mut(id, |cart| {
            cart.update_quantity(&product_id, request.variant_id.as_deref(), request.quantity)?;
            respond(&state, cart)
        })?
        .ok_or_else(|| cart_not_found(id))
}

#[derive(Debug, Deserialize)]
pub struct VariantQuery {
    pub variant_id: Option<String>,
}

async fn remove_item(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(String, String)>,
    Query(query): Query<VariantQuery>,
) -> Result<Json<CartResponse>, ApiError> {
    let id = parse_cart_id(&id)?;
    debug!(cart_id = %id, product_id = %product_id, "remove item");

    state
        .carts
        .with_cart_mut(id, |cart| {
            cart.remove_item(&product_id, query.variant_id.as_deref())?;
            respond(&state, cart)
        })?
        .ok_or_else(|| cart_not_found(id))
}

#[derive(Debug, Deserialize)]
pub struct CouponRequest {
    pub code: String,
}

/// Attaches a coupon to the cart.
///
/// The coupon must exist, be within its redemption window and have
/// redemptions left. Re-applying the cart's current coupon is a no-op.
///
/// The redemption is taken before the cart is saved and handed back if
/// the save fails. A replaced coupon is released only once the new one
/// is stored.
async fn apply_coupon(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CouponRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let id = parse_cart_id(&id)?;
    debug!(cart_id = %id, code = %request.code, "apply coupon");

    let code = validation::validate_coupon_code(&request.code)
        .map_err(|e| ApiError::validation(e.to_string()))?
        .ok_or_else(|| ApiError::validation("coupon code is required"))?;

    let catalog = &state.config.catalog;
    let today = Utc::now().date_naive();

    let mut switch: Option<(String, Option<String>)> = None;
    let result = state.carts.with_cart_mut(id, |cart| {
        let previous = cart.coupon_code.clone();
        let coupon = cart.apply_coupon(catalog, &code)?;

        if previous.as_deref() != Some(coupon.code.as_str()) {
            state.redemptions.redeem(coupon, today)?;
            switch = Some((coupon.code.clone(), previous));
        }

        respond(&state, cart)
    });

    match (&result, switch) {
        (Ok(_), Some((applied, previous))) => {
            if let Some(previous) = previous {
                state.redemptions.release(&previous);
            }
            info!(cart_id = %id, code = %applied, "Coupon applied");
        }
        (Err(_), Some((applied, _))) => state.redemptions.release(&applied),
        _ => {}
    }

    result?.ok_or_else(|| cart_not_found(id))
}

async fn remove_coupon(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let id = parse_cart_id(&id)?;
    debug!(cart_id = %id, "remove coupon");

    let (response, released) = state
        .carts
        .with_cart_mut(id, |cart| {
            let released = cart.coupon_code.clone();
            cart.remove_coupon();
            respond(&state, cart).map(|r| (r, released))
        })?
        .ok_or_else(|| cart_not_found(id))?;

    if let Some(code) = released {
        state.redemptions.release(&code);
    }
    Ok(response)
}

/// Sets the shipping destination. Denylisted countries are rejected here
/// so the shopper finds out before checkout.
async fn set_destination(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(destination): Json<Destination>,
) -> Result<Json<CartResponse>, ApiError> {
    let id = parse_cart_id(&id)?;
    debug!(cart_id = %id, country = %destination.country, "set destination");

    let normalized = destination.normalize()?;
    state.config.catalog.shipping.ensure_shippable(&normalized)?;

    state
        .carts
        .with_cart_mut(id, |cart| {
            cart.set_destination(&normalized)?;
            respond(&state, cart)
        })?
        .ok_or_else(|| cart_not_found(id))
}

#[derive(Debug, Deserialize)]
pub struct TotalsQuery {
    pub shipping_method: Option<String>,
}

/// Prices the cart with its coupon and destination.
async fn totals(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<TotalsQuery>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let id = parse_cart_id(&id)?;
    debug!(cart_id = %id, method = ?query.shipping_method, "cart totals");

    let quote = state
        .carts
        .with_cart(id, |cart| {
            cart.quote(&state.config.catalog, query.shipping_method.as_deref())
        })
        .ok_or_else(|| cart_not_found(id))??;

    Ok(Json(QuoteResponse::new(quote, &state.config.currency)))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use axum::http::StatusCode;
    use chrono::Utc;
    use serde_json::json;
    use storefront_core::discount::Coupon;
    use storefront_core::Cart;
    use uuid::Uuid;

    use crate::config::StorefrontConfig;
    use crate::routes::router;
    use crate::routes::test_support::*;
    use crate::state::{AppState, CartStore, InMemoryCartStore, StoreError};

    #[tokio::test]
    async fn test_create_and_get_cart() {
        let app = app();
        let id = new_cart(&app).await;

        let (status, json) = send(&app, "GET", &format!("/api/carts/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["id"], id.as_str());
        assert_eq!(json["item_count"], 0);
        assert_eq!(json["subtotal"], 0);
    }

    #[tokio::test]
    async fn test_get_unknown_cart() {
        let app = app();
        let (status, json) = send(
            &app,
            "GET",
            "/api/carts/550e8400-e29b-41d4-a716-446655440000",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "NOT_FOUND");

        let (status, _) = send(&app, "GET", "/api/carts/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_add_items_merges_lines() {
        let app = app();
        let id = new_cart(&app).await;
        let uri = format!("/api/carts/{}/items", id);

        send(&app, "POST", &uri, Some(json!({ "product_id": "2" }))).await;
        let (status, json) = send(
            &app,
            "POST",
            &uri,
            Some(json!({ "product_id": "2", "quantity": 2 })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["items"].as_array().unwrap().len(), 1);
        assert_eq!(json["items"][0]["quantity"], 3);
        assert_eq!(json["items"][0]["unit_price"], 2999);
        assert_eq!(json["items"][0]["line_total"], 8997);
        assert_eq!(json["subtotal"], 8997);
        assert_eq!(json["subtotal_display"], "89,97 €");
    }

    #[tokio::test]
    async fn test_add_unknown_product() {
        let app = app();
        let id = new_cart(&app).await;
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/carts/{}/items", id),
            Some(json!({ "product_id": "404" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_add_item_quantity_limit() {
        let app = app();
        let id = new_cart(&app).await;
        let (status, json) = send(
            &app,
            "POST",
            &format!("/api/carts/{}/items", id),
            Some(json!({ "product_id": "1", "quantity": 1000 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_update_and_remove_item() {
        let app = app();
        let id = new_cart(&app).await;
        send(
            &app,
            "POST",
            &format!("/api/carts/{}/items", id),
            Some(json!({ "product_id": "1" })),
        )
        .await;

        let item_uri = format!("/api/carts/{}/items/1", id);
        let (status, json) = send(&app, "PUT", &item_uri, Some(json!({ "quantity": 4 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["item_count"], 4);

        let (status, json) = send(&app, "PUT", &item_uri, Some(json!({ "quantity": 0 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["item_count"], 0);

        let (status, _) = send(&app, "DELETE", &item_uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_coupon_apply_and_remove() {
        let app = app();
        let id = new_cart(&app).await;
        let uri = format!("/api/carts/{}/coupon", id);

        let (status, json) = send(&app, "POST", &uri, Some(json!({ "code": "descuento10" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["coupon_code"], "DESCUENTO10");

        let (status, json) = send(&app, "POST", &uri, Some(json!({ "code": "NOPE" }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["code"], "INVALID_COUPON");

        // The failed attempt left the previous coupon in place
        let (_, json) = send(&app, "GET", &format!("/api/carts/{}", id), None).await;
        assert_eq!(json["coupon_code"], "DESCUENTO10");

        let (status, json) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["coupon_code"].is_null());
    }

    #[tokio::test]
    async fn test_blank_coupon_rejected() {
        let app = app();
        let id = new_cart(&app).await;
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/carts/{}/coupon", id),
            Some(json!({ "code": "   " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_restricted_destination_rejected() {
        let app = app();
        let id = new_cart(&app).await;
        let (status, json) = send(
            &app,
            "PUT",
            &format!("/api/carts/{}/destination", id),
            Some(json!({ "country": "cu" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["code"], "SHIPPING_RESTRICTED");
    }

    #[tokio::test]
    async fn test_totals_require_destination() {
        let app = app();
        let id = new_cart(&app).await;
        let (status, json) = send(&app, "GET", &format!("/api/carts/{}/totals", id), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "INVALID_DESTINATION");
    }

    #[tokio::test]
    async fn test_full_cart_flow() {
        let app = app();
        let id = new_cart(&app).await;

        // Smartwatch 149.99 + coupon 10% to Spain
        send(
            &app,
            "POST",
            &format!("/api/carts/{}/items", id),
            Some(json!({ "product_id": "3" })),
        )
        .await;
        send(
            &app,
            "POST",
            &format!("/api/carts/{}/coupon", id),
            Some(json!({ "code": "DESCUENTO10" })),
        )
        .await;
        let (status, _) = send(
            &app,
            "PUT",
            &format!("/api/carts/{}/destination", id),
            Some(json!({ "country": "es", "postal_code": "28001" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) = send(
            &app,
            "GET",
            &format!("/api/carts/{}/totals?shipping_method=express_es", id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // discount 14.999 rounds to 15.00, taxable 134.99
        assert_eq!(json["totals"]["subtotal"], 14999);
        assert_eq!(json["totals"]["discount"], 1500);
        assert_eq!(json["totals"]["shipping"], 995);
        assert_eq!(json["totals"]["tax"], 2835);
        assert_eq!(json["totals"]["total"], 14999 - 1500 + 995 + 2835);
        assert_eq!(json["shipping"]["method_id"], "express_es");
    }

    #[tokio::test]
    async fn test_totals_unknown_method() {
        let app = app();
        let id = new_cart(&app).await;
        send(
            &app,
            "POST",
            &format!("/api/carts/{}/items", id),
            Some(json!({ "product_id": "1" })),
        )
        .await;
        send(
            &app,
            "PUT",
            &format!("/api/carts/{}/destination", id),
            Some(json!({ "country": "FR" })),
        )
        .await;

        let (status, json) = send(
            &app,
            "GET",
            &format!("/api/carts/{}/totals?shipping_method=standard_es", id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["code"], "UNKNOWN_SHIPPING_METHOD");
    }

    #[tokio::test]
    async fn test_clear_cart() {
        let app = app();
        let id = new_cart(&app).await;
        send(
            &app,
            "POST",
            &format!("/api/carts/{}/items", id),
            Some(json!({ "product_id": "1", "quantity": 2 })),
        )
        .await;

        let (status, json) = send(&app, "DELETE", &format!("/api/carts/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["item_count"], 0);
    }

    // =========================================================================
    // Coupon redemptions
    // =========================================================================

    /// In-memory store whose saves can be switched off.
    #[derive(Default)]
    struct FlakyStore {
        inner: InMemoryCartStore,
        fail_saves: AtomicBool,
    }

    impl CartStore for FlakyStore {
        fn load(&self, id: Uuid) -> Option<Cart> {
            self.inner.load(id)
        }

        fn save(&self, cart: &Cart) -> Result<(), StoreError> {
            if self.fail_saves.load(Ordering::SeqCst) {
                let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
                return Err(err.into());
            }
            self.inner.save(cart)
        }
    }

    fn limited_state(store: Arc<dyn CartStore>) -> AppState {
        let yesterday = Utc::now().date_naive().pred_opt().unwrap();
        let mut config = StorefrontConfig::default();
        config
            .catalog
            .coupons
            .push(Coupon::percentage("UNAVEZ", 2000).with_usage_limit(1));
        config
            .catalog
            .coupons
            .push(Coupon::percentage("CADUCADO", 2000).with_valid_until(yesterday));
        AppState::new(config, store)
    }

    async fn apply(app: &axum::Router, id: &str, code: &str) -> (StatusCode, serde_json::Value) {
        send(
            app,
            "POST",
            &format!("/api/carts/{}/coupon", id),
            Some(json!({ "code": code })),
        )
        .await
    }

    #[tokio::test]
    async fn test_coupon_limit_exceeded() {
        let state = limited_state(Arc::new(InMemoryCartStore::new()));
        let app = router(state.clone());
        let first = new_cart(&app).await;
        let second = new_cart(&app).await;

        let (status, _) = apply(&app, &first, "unavez").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state.redemptions.count("UNAVEZ"), 1);

        // Re-applying on the same cart does not count twice
        let (status, _) = apply(&app, &first, "UNAVEZ").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state.redemptions.count("UNAVEZ"), 1);

        let (status, json) = apply(&app, &second, "UNAVEZ").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["code"], "COUPON_LIMIT_EXCEEDED");

        // Removing it from the first cart frees the redemption
        send(&app, "DELETE", &format!("/api/carts/{}/coupon", first), None).await;
        assert_eq!(state.redemptions.count("UNAVEZ"), 0);
        let (status, json) = apply(&app, &second, "UNAVEZ").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["coupon_code"], "UNAVEZ");
    }

    #[tokio::test]
    async fn test_expired_coupon() {
        let app = router(limited_state(Arc::new(InMemoryCartStore::new())));
        let id = new_cart(&app).await;

        let (status, json) = apply(&app, &id, "CADUCADO").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["code"], "COUPON_EXPIRED");

        let (_, json) = send(&app, "GET", &format!("/api/carts/{}", id), None).await;
        assert!(json["coupon_code"].is_null());
    }

    #[tokio::test]
    async fn test_switching_coupon_releases_previous() {
        let state = limited_state(Arc::new(InMemoryCartStore::new()));
        let app = router(state.clone());
        let first = new_cart(&app).await;
        let second = new_cart(&app).await;

        apply(&app, &first, "UNAVEZ").await;
        let (status, json) = apply(&app, &first, "DESCUENTO10").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["coupon_code"], "DESCUENTO10");
        assert_eq!(state.redemptions.count("UNAVEZ"), 0);

        let (status, _) = apply(&app, &second, "UNAVEZ").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_failed_save_returns_redemption() {
        let store = Arc::new(FlakyStore::default());
        let state = limited_state(store.clone());
        let app = router(state.clone());
        let id = new_cart(&app).await;

        store.fail_saves.store(true, Ordering::SeqCst);
        let (status, json) = apply(&app, &id, "UNAVEZ").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], "INTERNAL");
        assert_eq!(state.redemptions.count("UNAVEZ"), 0);

        store.fail_saves.store(false, Ordering::SeqCst);
        let (_, json) = send(&app, "GET", &format!("/api/carts/{}", id), None).await;
        assert!(json["coupon_code"].is_null());
        let (status, _) = apply(&app, &id, "UNAVEZ").await;
        assert_eq!(status, StatusCode::OK);
    }
}
