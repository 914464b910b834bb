//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront API                     │
//! │                                                                         │
//! │  Front end                   Rust Backend                               │
//! │  ─────────                   ────────────                               │
//! │                                                                         │
//! │  POST /api/carts/{id}/coupon                                            │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Handler                                                         │  │
//! │  │  Result<Json<T>, ApiError>                                       │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Cart missing? ───── ApiError::not_found ──────────┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Pricing rule? ───── CoreError::InvalidCoupon ─── ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ◄─── 422 { "code": "INVALID_COUPON",                                  │
//! │             "message": "Invalid coupon code: NOPE" }                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use storefront_core::CoreError;

use crate::state::StoreError;

/// API error returned from handlers.
///
/// ## Serialization
/// ```json
/// {
///   "code": "SHIPPING_RESTRICTED",
///   "message": "Shipping to KP is not available"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
///
/// ## Usage in Front End
/// ```typescript
/// const res = await fetch(`/api/carts/${id}/coupon`, { method: 'POST', body });
/// if (!res.ok) {
///   const e = await res.json();
///   switch (e.code) {
///     case 'INVALID_COUPON':
///     case 'COUPON_EXPIRED':
///       setCouponError(e.message);
///       break;
///     default:
///       showError('An error occurred');
///   }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Destination missing or malformed (400)
    InvalidDestination,

    /// Unknown coupon code (422)
    InvalidCoupon,

    /// Coupon past its end date (422)
    CouponExpired,

    /// Coupon used up (422)
    CouponLimitExceeded,

    /// Country on the shipping denylist (422)
    ShippingRestricted,

    /// Method not offered in the destination's zone (422)
    UnknownShippingMethod,

    /// Cart operation failed (422)
    CartError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError | ErrorCode::InvalidDestination => StatusCode::BAD_REQUEST,
            ErrorCode::InvalidCoupon
            | ErrorCode::CouponExpired
            | ErrorCode::CouponLimitExceeded
            | ErrorCode::ShippingRestricted
            | ErrorCode::UnknownShippingMethod
            | ErrorCode::CartError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        if !err.is_user_input() {
            // Log the actual error but return a generic message
            tracing::error!(error = %message, "Pricing failed");
            return ApiError::internal("Pricing failed");
        }

        match err {
            CoreError::InvalidCoupon { .. } => ApiError::new(ErrorCode::InvalidCoupon, message),
            CoreError::CouponExpired { .. } => ApiError::new(ErrorCode::CouponExpired, message),
            CoreError::CouponLimitExceeded { .. } => {
                ApiError::new(ErrorCode::CouponLimitExceeded, message)
            }
            CoreError::ShippingRestricted { .. } => {
                ApiError::new(ErrorCode::ShippingRestricted, message)
            }
            CoreError::UnknownShippingMethod { .. } => {
                ApiError::new(ErrorCode::UnknownShippingMethod, message)
            }
            CoreError::InvalidDestination { .. } => {
                ApiError::new(ErrorCode::InvalidDestination, message)
            }
            CoreError::ItemNotFound { product_id } => ApiError::not_found("Cart item", &product_id),
            CoreError::CartTooLarge { .. } => ApiError::new(ErrorCode::CartError, message),
            CoreError::QuantityTooLarge { .. } => ApiError::validation(message),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
            CoreError::AmountOverflow { .. } | CoreError::InvalidCatalog { .. } => {
                ApiError::internal("Pricing failed")
            }
        }
    }
}

/// Converts cart store errors to API errors.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        tracing::error!(error = %err, "Cart store failed");
        ApiError::internal("Cart could not be saved")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
