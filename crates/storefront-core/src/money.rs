//! # Money Module
//!
//! Provides the `Money` type and the rounding and formatting rules shared by
//! every pricing component.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In the old storefront handlers:                                        │
//! │    subtotal * 0.1         = 3.9990000000000006                          │
//! │    (subtotal * 0.21).toFixed(2) sprinkled in some files, not others    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    3999 cents × 1000 bps → (3999000 + 5000) / 10000 = 400 cents        │
//! │    Every value is already "rounded to 2 places" by construction.       │
//! │    The ONLY rounding points are rate applications (tax, % discount).   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::money::Money;
//!
//! let price = Money::from_cents(4995); // 49.95
//! let line = price.checked_mul_quantity(2).unwrap();
//! assert_eq!(line.cents(), 9990);
//!
//! // 10% of 39.99 = 3.999 → 4.00 (half away from zero)
//! assert_eq!(Money::from_cents(3999).apply_bps(1000).cents(), 400);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

/// Basis points in one whole (100%).
pub const BPS_SCALE: i128 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in minor units (euro cents for the default store).
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate differences may be negative; the pricing
///   functions reject negative results instead of clamping them.
/// - **Single field tuple struct**: zero-cost wrapper, serializes as a bare
///   integer (`{"subtotal": 4000}`).
///
/// ## Where Money Flows
/// ```text
/// LineItem.unit_price ──► × quantity ──► subtotal
///                                          │
///         coupon ──► discount ◄────────────┤
///                                          │
///   zone/method ──► shipping ◄─────────────┤
///                                          │
///     tax table ──► tax (on subtotal − discount)
///                                          │
///                                          ▼
///                                        total
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// let price = Money::from_cents(8999); // 89.99
    /// assert_eq!(price.cents(), 8999);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -5.50.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(4, 95).cents(), 495);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (euros, dollars), truncated toward zero.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion, always 0-99.
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Applies a rate in basis points, rounding half away from zero at the cent.
    ///
    /// This is the single rounding rule of the pricing engine. Both the
    /// percentage discount and the tax go through it.
    ///
    /// ## Rounding
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  amount × bps / 10000, half away from zero                          │
    /// │                                                                     │
    /// │  3600 × 2100 = 7_560_000  → 756.0000 → 756   (7.56)                 │
    /// │  1000 ×  825 =   825_000  →  82.5    →  83   (0.83)                 │
    /// │  3999 × 1000 = 3_999_000  → 399.9    → 400   (4.00)                 │
    /// │  -1000 × 825              → -82.5    → -83                          │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    ///
    /// Callers keep `bps` within 0..=10000 (validated at catalog load), so the
    /// result never exceeds the input in magnitude.
    pub fn apply_bps(&self, bps: u32) -> Money {
        // i128 keeps the intermediate product exact for any i64 amount
        let product = self.0 as i128 * bps as i128;
        let half = BPS_SCALE / 2;
        let rounded = if product >= 0 {
            (product + half) / BPS_SCALE
        } else {
            (product - half) / BPS_SCALE
        };
        Money(rounded as i64)
    }

    /// Calculates tax on this amount at the given rate.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::Money;
    /// use storefront_core::types::TaxRate;
    ///
    /// // 36.00 at 21% IVA = 7.56
    /// let tax = Money::from_cents(3600).calculate_tax(TaxRate::from_bps(2100));
    /// assert_eq!(tax.cents(), 756);
    /// ```
    #[inline]
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        self.apply_bps(rate.bps())
    }

    /// Multiplies a unit price by a quantity, returning `None` on overflow.
    #[inline]
    pub fn checked_mul_quantity(&self, qty: i64) -> Option<Money> {
        self.0.checked_mul(qty).map(Money)
    }

    /// Adds two amounts, returning `None` on overflow.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Subtracts `other`, returning `None` on overflow.
    #[inline]
    pub fn checked_sub(&self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Subtracts `other`, flooring the result at zero.
    ///
    /// Used for the taxable amount (`max(0, subtotal − discount)`) and for
    /// the "add X more for free shipping" hint.
    #[inline]
    pub fn saturating_sub_to_zero(&self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0).max(0))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal rendering (`-5.50`), no currency symbol.
///
/// Use [`CurrencyFormat`] for anything shown to a shopper.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Currency Formatting
// =============================================================================

/// Where the currency symbol goes relative to the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SymbolPosition {
    /// `$1,234.56`
    Before,
    /// `1.234,56 €`
    #[default]
    After,
}

/// Display rules for money shown to shoppers.
///
/// ## Presets
/// ```text
/// ┌──────────────┬──────────────────┬──────────────────┐
/// │ preset       │ 123456 cents     │ -550 cents       │
/// ├──────────────┼──────────────────┼──────────────────┤
/// │ euro_es()    │ 1.234,56 €       │ -5,50 €          │
/// │ usd()        │ $1,234.56        │ -$5.50           │
/// └──────────────┴──────────────────┴──────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CurrencyFormat {
    /// ISO 4217 code.
    pub code: String,

    /// Symbol shown next to the amount.
    pub symbol: String,

    /// Separator between major and minor units.
    pub decimal_separator: char,

    /// Thousands separator; `None` disables grouping.
    #[serde(default)]
    pub group_separator: Option<char>,

    #[serde(default)]
    pub symbol_position: SymbolPosition,
}

impl CurrencyFormat {
    /// Euro with Spanish conventions, the storefront default.
    pub fn euro_es() -> Self {
        CurrencyFormat {
            code: "EUR".to_string(),
            symbol: "€".to_string(),
            decimal_separator: ',',
            group_separator: Some('.'),
            symbol_position: SymbolPosition::After,
        }
    }

    /// US dollar with US conventions.
    pub fn usd() -> Self {
        CurrencyFormat {
            code: "USD".to_string(),
            symbol: "$".to_string(),
            decimal_separator: '.',
            group_separator: Some(','),
            symbol_position: SymbolPosition::Before,
        }
    }

    /// Formats an amount for display.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::{CurrencyFormat, Money};
    ///
    /// let eur = CurrencyFormat::euro_es();
    /// assert_eq!(eur.format(Money::from_cents(495)), "4,95 €");
    /// ```
    pub fn format(&self, amount: Money) -> String {
        let sign = if amount.is_negative() { "-" } else { "" };
        let whole = self.group_digits(amount.major().unsigned_abs());
        let number = format!("{}{}{:02}", whole, self.decimal_separator, amount.minor());

        match self.symbol_position {
            SymbolPosition::Before => format!("{}{}{}", sign, self.symbol, number),
            SymbolPosition::After => format!("{}{} {}", sign, number, self.symbol),
        }
    }

    fn group_digits(&self, value: u64) -> String {
        let digits = value.to_string();
        let Some(sep) = self.group_separator else {
            return digits;
        };

        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(sep);
            }
            out.push(ch);
        }
        out
    }
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        CurrencyFormat::euro_es()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
