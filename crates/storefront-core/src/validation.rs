//! # Validation Module
//!
//! Input validation for the storefront pricing boundary.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front end (TypeScript)                                       │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate shopper feedback                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (Rust)                                          │
//! │  ├── Type validation (serde: integers only, no NaN money)              │
//! │  └── THIS MODULE: business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Pricing functions                                            │
//! │  └── Re-check invariants (quantity ≥ 1, price ≥ 0, checked sums)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::validation::{validate_country_code, validate_quantity};
//!
//! assert_eq!(validate_country_code(" es ").unwrap(), "ES");
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::checkout::ShippingAddress;
use crate::error::ValidationError;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_UNIT_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest coupon code accepted at the boundary.
pub const MAX_COUPON_CODE_LEN: usize = 32;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product identifier.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only letters, digits, hyphens and underscores
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_product_id;
///
/// assert!(validate_product_id("1").is_ok());
/// assert!(validate_product_id("tshirt-premium_M").is_ok());
/// assert!(validate_product_id("").is_err());
/// assert!(validate_product_id("has space").is_err());
/// ```
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::Required {
            field: "product_id".to_string(),
        });
    }

    if id.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "product_id".to_string(),
            max: 50,
        });
    }

    if !id.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
        return Err(ValidationError::InvalidFormat {
            field: "product_id".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates and normalizes an ISO 3166-1 alpha-2 country code.
///
/// ## Returns
/// The trimmed, upper-cased code (`" es "` → `"ES"`).
pub fn validate_country_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "country".to_string(),
        });
    }

    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidFormat {
            field: "country".to_string(),
            reason: "must be a two-letter ISO country code".to_string(),
        });
    }

    Ok(code.to_ascii_uppercase())
}

/// Normalizes a region code to its qualified `CC-RR` form.
///
/// ## Rules
/// - Blank → `None`
/// - Bare code (`cn`) → qualified with the country (`ES-CN`)
/// - Qualified code must carry the same country prefix
/// - Subdivision part is 1-3 letters or digits
///
/// ## Example
/// ```rust
/// use storefront_core::validation::normalize_region_code;
///
/// assert_eq!(normalize_region_code("ES", "cn").unwrap().as_deref(), Some("ES-CN"));
/// assert_eq!(normalize_region_code("US", "US-CA").unwrap().as_deref(), Some("US-CA"));
/// assert!(normalize_region_code("US", "ES-CN").is_err());
/// ```
pub fn normalize_region_code(country: &str, region: &str) -> ValidationResult<Option<String>> {
    let region = region.trim().to_ascii_uppercase();

    if region.is_empty() {
        return Ok(None);
    }

    let subdivision = match region.split_once('-') {
        Some((prefix, rest)) if prefix == country => rest.to_string(),
        Some(_) => {
            return Err(ValidationError::InvalidFormat {
                field: "region".to_string(),
                reason: format!("must belong to country {}", country),
            })
        }
        None => region,
    };

    if subdivision.is_empty()
        || subdivision.len() > 3
        || !subdivision.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(ValidationError::InvalidFormat {
            field: "region".to_string(),
            reason: "must be an ISO 3166-2 subdivision code".to_string(),
        });
    }

    Ok(Some(format!("{}-{}", country, subdivision)))
}

/// Validates a shopper-entered coupon code.
///
/// ## Returns
/// - `Ok(None)` for an empty or whitespace-only code ("no coupon")
/// - `Ok(Some(trimmed))` otherwise; matching against the catalog is
///   case-insensitive and happens later
pub fn validate_coupon_code(code: &str) -> ValidationResult<Option<String>> {
    let code = code.trim();

    if code.is_empty() {
        return Ok(None);
    }

    if code.len() > MAX_COUPON_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "coupon_code".to_string(),
            max: MAX_COUPON_CODE_LEN,
        });
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(ValidationError::InvalidFormat {
            field: "coupon_code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(Some(code.to_string()))
}

/// Validates a shipping address from the checkout form.
///
/// ## Rules
/// | field       | rule              |
/// |-------------|-------------------|
/// | full_name   | ≥ 3 characters    |
/// | address     | ≥ 5 characters    |
/// | city        | ≥ 2 characters    |
/// | postal_code | ≥ 3 characters    |
/// | country     | ISO alpha-2 code  |
///
/// Returns the first failing field.
pub fn validate_shipping_address(address: &ShippingAddress) -> ValidationResult<()> {
    min_chars("full_name", &address.full_name, 3)?;
    min_chars("address", &address.address, 5)?;
    min_chars("city", &address.city, 2)?;
    min_chars("postal_code", &address.postal_code, 3)?;
    validate_country_code(&address.country)?;
    Ok(())
}

fn min_chars(field: &str, value: &str, min: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() < min {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items, free shipping methods)
/// - Must not exceed MAX_UNIT_PRICE_CENTS (1,000,000.00)
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(8999).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// assert!(validate_price_cents(i64::MAX).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_UNIT_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_UNIT_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a rate in basis points (tax rate, percentage discount).
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
pub fn validate_rate_bps(field: &str, bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates that one more distinct line fits in the cart.
///
/// ## Rules
/// - Must not exceed MAX_CART_ITEMS (100)
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates a cart identifier (UUID).
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_cart_id;
///
/// assert!(validate_cart_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_cart_id("cart_123").is_err());
/// ```
pub fn validate_cart_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "cart_id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "cart_id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
