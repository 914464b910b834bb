//! # Discount Module
//!
//! Coupon catalog entries and the discount rule evaluator.
//!
//! ## Rule Kinds
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Discount Rules                                   │
//! │                                                                         │
//! │  Percentage { percent_bps }  discount = subtotal × bps / 10000         │
//! │                              (rounded half away from zero)             │
//! │                                                                         │
//! │  Fixed { amount }            discount = min(amount, subtotal)          │
//! │                                                                         │
//! │  FreeShipping                discount = 0, free_shipping = true        │
//! │                              (the aggregator waives shipping)          │
//! │                                                                         │
//! │  Every rule: 0 ≤ discount ≤ subtotal                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The evaluator is a pure function of (catalog, code, subtotal). Expiry and
//! usage limits depend on the clock and on a redemption counter, so they are
//! checked separately with [`Coupon::check_redeemable`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::validation;

// =============================================================================
// Discount Kind
// =============================================================================

/// What a coupon does to the order.
///
/// Serialized with an internal `type` tag so catalog files read naturally:
/// `kind = { type = "percentage", percent_bps = 1000 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscountKind {
    /// Percentage off the subtotal, in basis points (1000 = 10%).
    Percentage { percent_bps: u32 },

    /// Fixed amount off the subtotal, capped at the subtotal.
    Fixed { amount: Money },

    /// No money off; shipping is waived.
    FreeShipping,
}

// =============================================================================
// Coupon
// =============================================================================

/// A coupon in the pricing catalog.
///
/// Coupons are configuration. Shoppers only ever supply the code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Coupon {
    /// Canonical code. Lookups are case-insensitive.
    pub code: String,

    pub kind: DiscountKind,

    #[serde(default)]
    pub description: Option<String>,

    /// Last day the coupon can be redeemed (inclusive).
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub valid_until: Option<NaiveDate>,

    /// Maximum number of redemptions across all carts.
    #[serde(default)]
    pub usage_limit: Option<u32>,
}

impl Coupon {
    pub fn new(code: impl Into<String>, kind: DiscountKind) -> Self {
        Coupon {
            code: code.into(),
            kind,
            description: None,
            valid_until: None,
            usage_limit: None,
        }
    }

    pub fn percentage(code: impl Into<String>, percent_bps: u32) -> Self {
        Coupon::new(code, DiscountKind::Percentage { percent_bps })
    }

    pub fn fixed(code: impl Into<String>, amount: Money) -> Self {
        Coupon::new(code, DiscountKind::Fixed { amount })
    }

    pub fn free_shipping(code: impl Into<String>) -> Self {
        Coupon::new(code, DiscountKind::FreeShipping)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_valid_until(mut self, date: NaiveDate) -> Self {
        self.valid_until = Some(date);
        self
    }

    pub fn with_usage_limit(mut self, limit: u32) -> Self {
        self.usage_limit = Some(limit);
        self
    }

    /// Case-insensitive code comparison.
    pub fn matches(&self, code: &str) -> bool {
        self.code.eq_ignore_ascii_case(code.trim())
    }

    /// Computes what this coupon takes off the given subtotal.
    ///
    /// `subtotal` must be non-negative; [`evaluate_discount`] checks it.
    pub fn apply(&self, subtotal: Money) -> AppliedDiscount {
        let (amount, free_shipping) = match &self.kind {
            DiscountKind::Percentage { percent_bps } => {
                (subtotal.apply_bps(*percent_bps).min(subtotal), false)
            }
            DiscountKind::Fixed { amount } => ((*amount).min(subtotal), false),
            DiscountKind::FreeShipping => (Money::zero(), true),
        };

        AppliedDiscount {
            code: Some(self.code.clone()),
            amount,
            free_shipping,
        }
    }

    /// Checks the redemption window and usage limit.
    ///
    /// ## Arguments
    /// * `today` - the caller's current date (the core never reads the clock)
    /// * `times_redeemed` - redemptions recorded so far
    ///
    /// ## Errors
    /// - `CouponExpired` when `today` is after `valid_until`
    /// - `CouponLimitExceeded` when `times_redeemed >= usage_limit`
    pub fn check_redeemable(&self, today: NaiveDate, times_redeemed: u32) -> CoreResult<()> {
        if let Some(expired_on) = self.valid_until {
            if today > expired_on {
                return Err(CoreError::CouponExpired {
                    code: self.code.clone(),
                    expired_on,
                });
            }
        }

        if let Some(limit) = self.usage_limit {
            if times_redeemed >= limit {
                return Err(CoreError::CouponLimitExceeded {
                    code: self.code.clone(),
                    limit,
                });
            }
        }

        Ok(())
    }

    /// Checks a catalog entry: well-formed code, rate within 0-100%,
    /// non-negative fixed amount.
    pub fn validate(&self) -> CoreResult<()> {
        if validation::validate_coupon_code(&self.code)?.is_none() {
            return Err(ValidationError::Required {
                field: "coupon_code".to_string(),
            }
            .into());
        }

        match &self.kind {
            DiscountKind::Percentage { percent_bps } => {
                validation::validate_rate_bps("percent_bps", *percent_bps)?
            }
            DiscountKind::Fixed { amount } => validation::validate_price_cents(amount.cents())?,
            DiscountKind::FreeShipping => {}
        }

        Ok(())
    }
}

// =============================================================================
// Evaluation
// =============================================================================

/// Result of evaluating a coupon against a subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AppliedDiscount {
    /// Canonical code of the applied coupon, `None` when no coupon was given.
    pub code: Option<String>,

    /// Money off the subtotal. Always within `0..=subtotal`.
    pub amount: Money,

    /// Shipping must be waived.
    pub free_shipping: bool,
}

impl AppliedDiscount {
    /// No coupon: zero discount, shipping charged.
    pub fn none() -> Self {
        AppliedDiscount::default()
    }
}

/// Finds a coupon by code, ignoring case and surrounding whitespace.
pub fn find_coupon<'a>(coupons: &'a [Coupon], code: &str) -> Option<&'a Coupon> {
    coupons.iter().find(|c| c.matches(code))
}

/// Evaluates an optional coupon code against a subtotal.
///
/// ## Rules
/// - `None`, empty or whitespace-only code → no discount (not an error)
/// - unknown code → `CoreError::InvalidCoupon`
/// - negative subtotal → validation error
///
/// ## Example
/// ```rust
/// use storefront_core::discount::{evaluate_discount, Coupon};
/// use storefront_core::money::Money;
///
/// let coupons = vec![Coupon::percentage("DESCUENTO10", 1000)];
/// let applied = evaluate_discount(&coupons, Some("descuento10"), Money::from_cents(4000)).unwrap();
/// assert_eq!(applied.amount.cents(), 400);
/// assert!(!applied.free_shipping);
/// ```
pub fn evaluate_discount(
    coupons: &[Coupon],
    code: Option<&str>,
    subtotal: Money,
) -> CoreResult<AppliedDiscount> {
    if subtotal.is_negative() {
        return Err(ValidationError::MustBePositive {
            field: "subtotal".to_string(),
        }
        .into());
    }

    let code = match code.map(str::trim) {
        Some(c) if !c.is_empty() => c,
        _ => return Ok(AppliedDiscount::none()),
    };

    let coupon = find_coupon(coupons, code).ok_or_else(|| CoreError::InvalidCoupon {
        code: code.to_string(),
    })?;

    Ok(coupon.apply(subtotal))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Coupon> {
        vec![
            Coupon::percentage("DESCUENTO10", 1000),
            Coupon::fixed("BIENVENIDO", Money::from_cents(500)),
            Coupon::free_shipping("ENVIOGRATIS"),
        ]
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_no_coupon_is_zero_discount() {
        let subtotal = Money::from_cents(4000);
        for code in [None, Some(""), Some("   ")] {
            let applied = evaluate_discount(&catalog(), code, subtotal).unwrap();
            assert_eq!(applied, AppliedDiscount::none());
        }
    }

    #[test]
    fn test_percentage_discount() {
        let applied =
            evaluate_discount(&catalog(), Some("DESCUENTO10"), Money::from_cents(4000)).unwrap();
        assert_eq!(applied.amount.cents(), 400);
        assert_eq!(applied.code.as_deref(), Some("DESCUENTO10"));
    }

    #[test]
    fn test_percentage_discount_rounds_to_cent() {
        // 10% of 39.99 = 3.999 → 4.00
        let applied =
            evaluate_discount(&catalog(), Some("DESCUENTO10"), Money::from_cents(3999)).unwrap();
        assert_eq!(applied.amount.cents(), 400);
    }

    #[test]
    fn test_code_is_case_insensitive() {
        let applied =
            evaluate_discount(&catalog(), Some("  descuento10 "), Money::from_cents(1000)).unwrap();
        assert_eq!(applied.amount.cents(), 100);
        assert_eq!(applied.code.as_deref(), Some("DESCUENTO10"));
    }

    #[test]
    fn test_fixed_discount_capped_at_subtotal() {
        let applied =
            evaluate_discount(&catalog(), Some("BIENVENIDO"), Money::from_cents(2000)).unwrap();
        assert_eq!(applied.amount.cents(), 500);

        let applied =
            evaluate_discount(&catalog(), Some("BIENVENIDO"), Money::from_cents(300)).unwrap();
        assert_eq!(applied.amount.cents(), 300);
    }

    #[test]
    fn test_free_shipping_flag() {
        let applied =
            evaluate_discount(&catalog(), Some("enviogratis"), Money::from_cents(2000)).unwrap();
        assert!(applied.amount.is_zero());
        assert!(applied.free_shipping);
    }

    #[test]
    fn test_unknown_coupon() {
        let err = evaluate_discount(&catalog(), Some("NOPE"), Money::from_cents(2000)).unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidCoupon {
                code: "NOPE".to_string()
            }
        );
    }

    #[test]
    fn test_negative_subtotal_rejected() {
        let err = evaluate_discount(&catalog(), None, Money::from_cents(-1)).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_same_coupon_twice_same_discount() {
        let subtotal = Money::from_cents(12345);
        let a = evaluate_discount(&catalog(), Some("DESCUENTO10"), subtotal).unwrap();
        let b = evaluate_discount(&catalog(), Some("DESCUENTO10"), subtotal).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_discount_never_exceeds_subtotal() {
        let coupons = vec![
            Coupon::percentage("ALL", 10_000),
            Coupon::fixed("BIG", Money::from_cents(1_000_000)),
        ];
        for cents in [0, 1, 99, 4000, 123_456] {
            let subtotal = Money::from_cents(cents);
            for code in ["ALL", "BIG"] {
                let applied = evaluate_discount(&coupons, Some(code), subtotal).unwrap();
                assert!(applied.amount <= subtotal);
                assert!(!applied.amount.is_negative());
            }
        }
    }

    #[test]
    fn test_check_redeemable_expiry() {
        let coupon = Coupon::percentage("PRIMAVERA", 1500).with_valid_until(date(2026, 6, 20));

        assert!(coupon.check_redeemable(date(2026, 6, 20), 0).is_ok());
        assert_eq!(
            coupon.check_redeemable(date(2026, 6, 21), 0),
            Err(CoreError::CouponExpired {
                code: "PRIMAVERA".to_string(),
                expired_on: date(2026, 6, 20),
            })
        );
    }

    #[test]
    fn test_check_redeemable_usage_limit() {
        let coupon = Coupon::fixed("BIENVENIDO", Money::from_cents(500)).with_usage_limit(2);
        let today = date(2026, 1, 1);

        assert!(coupon.check_redeemable(today, 1).is_ok());
        assert!(matches!(
            coupon.check_redeemable(today, 2),
            Err(CoreError::CouponLimitExceeded { limit: 2, .. })
        ));
    }

    #[test]
    fn test_validate_catalog_entry() {
        assert!(Coupon::percentage("OK", 2500).validate().is_ok());
        assert!(Coupon::percentage("TOOMUCH", 10_001).validate().is_err());
        assert!(Coupon::fixed("NEG", Money::from_cents(-1)).validate().is_err());
        assert!(Coupon::free_shipping("  ").validate().is_err());
    }

    #[test]
    fn test_kind_wire_format() {
        let json = serde_json::to_value(DiscountKind::Percentage { percent_bps: 1000 }).unwrap();
        assert_eq!(json["type"], "percentage");
        assert_eq!(json["percent_bps"], 1000);

        let kind: DiscountKind = serde_json::from_str(r#"{"type":"free_shipping"}"#).unwrap();
        assert_eq!(kind, DiscountKind::FreeShipping);
    }
}
