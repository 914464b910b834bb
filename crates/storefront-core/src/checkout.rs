//! # Checkout Helpers
//!
//! The non-pricing parts of checkout: step sequence, address validation,
//! order numbers and the payment method listing.
//!
//! ```text
//! ┌──────────┐  next   ┌──────────┐  next   ┌──────────┐
//! │ Shipping │ ──────► │ Payment  │ ──────► │  Review  │
//! │ address  │ ◄────── │  method  │ ◄────── │  totals  │
//! └──────────┘ previous└──────────┘ previous└──────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::types::Destination;
use crate::validation;

// =============================================================================
// Checkout Steps
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    #[default]
    Shipping,
    Payment,
    Review,
}

impl CheckoutStep {
    pub const ALL: [CheckoutStep; 3] = [
        CheckoutStep::Shipping,
        CheckoutStep::Payment,
        CheckoutStep::Review,
    ];

    /// Following step, `None` at review.
    pub fn next(self) -> Option<CheckoutStep> {
        match self {
            CheckoutStep::Shipping => Some(CheckoutStep::Payment),
            CheckoutStep::Payment => Some(CheckoutStep::Review),
            CheckoutStep::Review => None,
        }
    }

    /// Preceding step, `None` at shipping.
    pub fn previous(self) -> Option<CheckoutStep> {
        match self {
            CheckoutStep::Shipping => None,
            CheckoutStep::Payment => Some(CheckoutStep::Shipping),
            CheckoutStep::Review => Some(CheckoutStep::Payment),
        }
    }
}

// =============================================================================
// Shipping Address
// =============================================================================

/// Address entered on the checkout form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShippingAddress {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default)]
    pub region: Option<String>,
}

impl ShippingAddress {
    /// Checks every field; see [`validation::validate_shipping_address`].
    pub fn validate(&self) -> CoreResult<()> {
        validation::validate_shipping_address(self)?;
        Ok(())
    }

    /// The pricing-relevant part of the address.
    pub fn destination(&self) -> Destination {
        Destination {
            country: self.country.clone(),
            region: self.region.clone(),
            postal_code: Some(self.postal_code.clone()),
        }
    }
}

// =============================================================================
// Order Numbers
// =============================================================================

/// Formats a numeric order id for display.
///
/// ## Example
/// ```rust
/// use storefront_core::checkout::format_order_number;
///
/// assert_eq!(format_order_number(42), "ORD-000042");
/// assert_eq!(format_order_number(1234567), "ORD-1234567");
/// ```
pub fn format_order_number(id: u64) -> String {
    format!("ORD-{:06}", id)
}

// =============================================================================
// Payment Methods
// =============================================================================

/// Payment methods the checkout can offer. Listing only, no gateway calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    Paypal,
    Bizum,
    #[serde(rename = "transferencia")]
    BankTransfer,
    Oxxo,
    Spei,
    Boleto,
    Pix,
}

impl PaymentMethod {
    /// Offered in every country.
    pub const UNIVERSAL: [PaymentMethod; 3] = [
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
        PaymentMethod::Paypal,
    ];

    /// Display label for the payment step.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "Tarjeta de crédito",
            PaymentMethod::DebitCard => "Tarjeta de débito",
            PaymentMethod::Paypal => "PayPal",
            PaymentMethod::Bizum => "Bizum",
            PaymentMethod::BankTransfer => "Transferencia bancaria",
            PaymentMethod::Oxxo => "OXXO",
            PaymentMethod::Spei => "SPEI",
            PaymentMethod::Boleto => "Boleto bancário",
            PaymentMethod::Pix => "Pix",
        }
    }
}

/// Payment methods for a country: the universal set plus local methods.
pub fn payment_methods_for(country: &str) -> Vec<PaymentMethod> {
    let local: &[PaymentMethod] = match country.trim().to_ascii_uppercase().as_str() {
        "ES" => &[PaymentMethod::Bizum, PaymentMethod::BankTransfer],
        "MX" => &[PaymentMethod::Oxxo, PaymentMethod::Spei],
        "BR" => &[PaymentMethod::Boleto, PaymentMethod::Pix],
        _ => &[],
    };

    PaymentMethod::UNIVERSAL
        .iter()
        .chain(local)
        .copied()
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
