//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  ├── CoreError        - Pricing / cart rule failures                   │
//! │  └── ValidationError  - Field-level input failures                     │
//! │                                                                         │
//! │  storefront-api errors (app crate)                                     │
//! │  └── ApiError         - What the front end sees ({ code, message })   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → HTTP response          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Classification
//! Coupon, shipping, destination and cart errors are user-input failures:
//! the caller shows a message ("invalid coupon") and the shopper fixes the
//! input. Retrying the same computation never helps.

use chrono::NaiveDate;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Pricing and cart rule errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Coupon code is not in the catalog.
    #[error("Invalid coupon code: {code}")]
    InvalidCoupon { code: String },

    /// Coupon exists but its validity window has passed.
    #[error("Coupon {code} expired on {expired_on}")]
    CouponExpired { code: String, expired_on: NaiveDate },

    /// Coupon exists but has been redeemed the maximum number of times.
    #[error("Coupon {code} has reached its usage limit of {limit}")]
    CouponLimitExceeded { code: String, limit: u32 },

    /// Destination country is on the shipping denylist.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout: address form, country = "CU"
    ///      │
    ///      ▼
    /// price_order() → ShippingRestricted { country: "CU" }
    ///      │
    ///      ▼
    /// UI shows: "We cannot ship to CU"
    /// ```
    #[error("Shipping to {country} is not available")]
    ShippingRestricted { country: String },

    /// Selected shipping method is not offered in the destination's zone.
    #[error("Shipping method {method_id} is not available in zone {zone_id}")]
    UnknownShippingMethod { method_id: String, zone_id: String },

    /// Destination is missing or malformed.
    #[error("Invalid destination: {reason}")]
    InvalidDestination { reason: String },

    /// Cart line not found for update/remove.
    #[error("Product {product_id} not in cart")]
    ItemNotFound { product_id: String },

    /// Cart has reached the maximum number of distinct lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds the maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// A monetary sum left the representable range.
    #[error("Amount out of range while computing {context}")]
    AmountOverflow { context: &'static str },

    /// Pricing catalog is inconsistent (duplicate codes, missing fallback zone...).
    #[error("Invalid pricing catalog: {reason}")]
    InvalidCatalog { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Builds an `InvalidDestination` from a field validation failure.
    pub fn invalid_destination(err: ValidationError) -> Self {
        CoreError::InvalidDestination {
            reason: err.to_string(),
        }
    }

    /// Returns true for failures caused by shopper input.
    ///
    /// `AmountOverflow` and `InvalidCatalog` point at a bug or a bad
    /// deployment instead.
    pub fn is_user_input(&self) -> bool {
        !matches!(
            self,
            CoreError::AmountOverflow { .. } | CoreError::InvalidCatalog { .. }
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation before pricing logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (bad country code, bad UUID...).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
