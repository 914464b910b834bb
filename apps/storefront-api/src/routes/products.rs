//! # Product Routes
//!
//! Read-only listing for the product pages. Prices are the ones the cart
//! endpoints charge.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::debug;

use super::display_opt;
use crate::error::ApiError;
use crate::state::{AppState, Product, ProductFilter};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", get(get_product))
}

/// A product with display prices.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub price_display: String,
    pub compare_at_price_display: Option<String>,
}

impl ProductView {
    fn new(product: Product, state: &AppState) -> Self {
        let currency = &state.config.currency;
        ProductView {
            price_display: currency.format(product.price),
            compare_at_price_display: display_opt(product.compare_at_price, currency),
            product,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<ProductView>,
    pub total: usize,
}

/// `?category=ropa&search=algodón&sort_by=price_asc&page=1&limit=10`
async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Json<ProductListResponse> {
    debug!(category = ?filter.category, search = ?filter.search, page = filter.page, "list products");

    let (products, total) = state.products.list(&filter);
    Json(ProductListResponse {
        products: products
            .into_iter()
            .map(|p| ProductView::new(p, &state))
            .collect(),
        total,
    })
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductView>, ApiError> {
    debug!(product_id = %id, "get product");

    let product = state
        .products
        .get(&id)
        .cloned()
        .ok_or_else(|| ApiError::not_found("Product", &id))?;
    Ok(Json(ProductView::new(product, &state)))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_products() {
        let app = app();
        let (status, json) = send(&app, "GET", "/api/products?sort_by=price_asc", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total"], 3);
        assert_eq!(json["products"][0]["id"], "2");
        assert_eq!(json["products"][0]["price"], 2999);
        assert_eq!(json["products"][0]["price_display"], "29,99 €");
        assert_eq!(json["products"][0]["compare_at_price_display"], "39,99 €");
    }

    #[tokio::test]
    async fn test_list_products_by_category() {
        let app = app();
        let (_, json) = send(&app, "GET", "/api/products?category=calzado&limit=5", None).await;

        assert_eq!(json["total"], 1);
        assert_eq!(json["products"][0]["name"], "Zapatillas Deportivas");
        assert_eq!(json["products"][0]["variants"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_get_product() {
        let app = app();
        let (status, json) = send(&app, "GET", "/api/products/3", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["variants"][1]["value"], "Plata");

        let (status, json) = send(&app, "GET", "/api/products/99", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_cart_rejects_unknown_variant() {
        let app = app();
        let id = new_cart(&app).await;
        let uri = format!("/api/carts/{}/items", id);

        let (status, json) = send(
            &app,
            "POST",
            &uri,
            Some(json!({ "product_id": "1", "variant_id": "2-1" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");

        let (status, json) = send(
            &app,
            "POST",
            &uri,
            Some(json!({ "product_id": "1", "variant_id": "1-2" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["items"][0]["variant_id"], "1-2");
    }
}
