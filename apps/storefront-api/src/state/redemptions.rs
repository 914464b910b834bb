//! # Coupon Redemptions
//!
//! Counts how many carts currently hold each coupon, so usage limits can
//! be enforced. Counts live in memory and reset on restart.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::NaiveDate;
use storefront_core::{Coupon, CoreResult};

#[derive(Debug, Default)]
pub struct RedemptionCounter {
    counts: Mutex<HashMap<String, u32>>,
}

impl RedemptionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, code: &str) -> u32 {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(code)
            .copied()
            .unwrap_or(0)
    }

    /// Checks expiry and usage limit, then records one redemption.
    ///
    /// Check and record happen under one lock, so two carts cannot both
    /// take the last redemption.
    pub fn redeem(&self, coupon: &Coupon, today: NaiveDate) -> CoreResult<()> {
        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        let used = counts.entry(coupon.code.clone()).or_insert(0);

        coupon.check_redeemable(today, *used)?;
        *used += 1;
        Ok(())
    }

    /// Gives a redemption back when a cart drops its coupon.
    pub fn release(&self, code: &str) {
        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(used) = counts.get_mut(code) {
            *used = used.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::CoreError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_usage_limit() {
        let counter = RedemptionCounter::new();
        let coupon = Coupon::percentage("VIP", 2000).with_usage_limit(2);
        let today = date(2026, 1, 1);

        counter.redeem(&coupon, today).unwrap();
        counter.redeem(&coupon, today).unwrap();
        assert_eq!(counter.count("VIP"), 2);

        let err = counter.redeem(&coupon, today).unwrap_err();
        assert!(matches!(err, CoreError::CouponLimitExceeded { limit: 2, .. }));
        assert_eq!(counter.count("VIP"), 2);

        counter.release("VIP");
        assert!(counter.redeem(&coupon, today).is_ok());
    }

    #[test]
    fn test_expired_coupon_not_recorded() {
        let counter = RedemptionCounter::new();
        let coupon = Coupon::percentage("OLD", 1000).with_valid_until(date(2025, 12, 31));

        let err = counter.redeem(&coupon, date(2026, 1, 1)).unwrap_err();
        assert!(matches!(err, CoreError::CouponExpired { .. }));
        assert_eq!(counter.count("OLD"), 0);
    }

    #[test]
    fn test_release_unknown_code() {
        let counter = RedemptionCounter::new();
        counter.release("NEVER");
        assert_eq!(counter.count("NEVER"), 0);
    }
}
