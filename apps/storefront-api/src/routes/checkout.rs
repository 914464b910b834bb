//! # Checkout Routes
//!
//! Address validation for the shipping step and the payment method
//! listing for the payment step.

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use storefront_core::checkout::{payment_methods_for, PaymentMethod, ShippingAddress};
use storefront_core::validation;
use storefront_core::{CoreError, Destination};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/checkout/payment-methods", get(payment_methods))
        .route("/api/checkout/address/validate", post(validate_address))
}

#[derive(Debug, Deserialize)]
pub struct PaymentMethodsQuery {
    pub country: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentMethodView {
    pub id: PaymentMethod,
    pub label: &'static str,
}

/// Lists the payment methods offered in a country.
async fn payment_methods(
    Query(query): Query<PaymentMethodsQuery>,
) -> Result<Json<Vec<PaymentMethodView>>, ApiError> {
    debug!(country = %query.country, "payment methods");

    let country = validation::validate_country_code(&query.country)
        .map_err(CoreError::invalid_destination)?;

    Ok(Json(
        payment_methods_for(&country)
            .into_iter()
            .map(|id| PaymentMethodView {
                id,
                label: id.label(),
            })
            .collect(),
    ))
}

#[derive(Debug, Serialize)]
pub struct AddressResponse {
    pub valid: bool,
    pub destination: Destination,
}

/// Checks the shipping step form, including the shipping denylist.
async fn validate_address(
    State(state): State<AppState>,
    Json(address): Json<ShippingAddress>,
) -> Result<Json<AddressResponse>, ApiError> {
    debug!(country = %address.country, "validate address");

    address.validate()?;
    let destination = address.destination().normalize()?;
    state.config.catalog.shipping.ensure_shippable(&destination)?;

    Ok(Json(AddressResponse {
        valid: true,
        destination,
    }))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_payment_methods_mexico() {
        let app = app();
        let (status, json) = send(&app, "GET", "/api/checkout/payment-methods?country=mx", None).await;

        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["credit_card", "debit_card", "paypal", "oxxo", "spei"]);
        assert_eq!(json[3]["label"], "OXXO");
    }

    #[tokio::test]
    async fn test_payment_methods_invalid_country() {
        let app = app();
        let (status, _) = send(&app, "GET", "/api/checkout/payment-methods?country=1", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_validate_address() {
        let app = app();
        let body = json!({
            "full_name": "Ana García",
            "address": "Av. Diagonal 100",
            "city": "Barcelona",
            "postal_code": "08019",
            "country": "es"
        });

        let (status, json) = send(&app, "POST", "/api/checkout/address/validate", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["valid"], true);
        assert_eq!(json["destination"]["country"], "ES");
    }

    #[tokio::test]
    async fn test_validate_address_rejects_short_name() {
        let app = app();
        let body = json!({
            "full_name": "Al",
            "address": "Av. Diagonal 100",
            "city": "Barcelona",
            "postal_code": "08019",
            "country": "ES"
        });

        let (status, json) = send(&app, "POST", "/api/checkout/address/validate", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_validate_address_restricted_country() {
        let app = app();
        let body = json!({
            "full_name": "Kim Jong",
            "address": "Main Street 1",
            "city": "Pyongyang",
            "postal_code": "00000",
            "country": "KP"
        });

        let (status, json) = send(&app, "POST", "/api/checkout/address/validate", Some(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["code"], "SHIPPING_RESTRICTED");
    }
}
