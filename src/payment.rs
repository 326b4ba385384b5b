//! Payment provider boundary.
//!
//! The pricing engine's output is translated here into checkout line items
//! (unit prices in minor units) for an opaque external payment provider.
//! Session creation and webhook handling live behind [`PaymentProvider`];
//! only the line-item translation is this crate's concern.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{config::{ConfigError, PricingConfig}, pricing::TripPricing, services::ServiceCategory};

/// Errors translating pricing output into checkout line items.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The pricing breakdown is the all-zero sentinel; the booking is not yet
    /// valid and checkout must stay blocked.
    #[error("trip is not priceable; checkout is blocked")]
    NotPriceable,

    /// The amount cannot be represented in the currency's minor units.
    #[error("amount {0} cannot be represented in minor units")]
    Unrepresentable(Decimal),

    /// The billing currency could not be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A checkout line item, unit price in the currency's minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Name shown on the checkout page.
    pub product_name: String,

    /// Description shown on the checkout page.
    pub product_description: String,

    /// Unit price in minor units (cents for USD).
    pub price_in_cents: i64,

    /// Number of units.
    pub quantity: u64,

    /// ISO alpha currency code.
    pub currency: String,
}

/// A checkout session request: line items plus redirect targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Line items to charge.
    pub items: Vec<LineItem>,

    /// Redirect target after successful payment.
    pub success_url: String,

    /// Redirect target after abandoned payment.
    pub cancel_url: String,
}

/// A created checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    /// Provider session identifier.
    pub id: String,

    /// URL the customer is redirected to.
    pub url: String,
}

/// The opaque external payment provider.
pub trait PaymentProvider {
    /// Provider-specific failure type.
    type Error;

    /// Creates a checkout session for the booking deposit.
    ///
    /// # Errors
    ///
    /// Provider-specific failures.
    fn create_deposit_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, Self::Error>;

    /// Creates a checkout session for the final service payment.
    ///
    /// # Errors
    ///
    /// Provider-specific failures.
    fn create_final_payment_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, Self::Error>;
}

/// Converts a dollar amount into the currency's minor units, rounding
/// sub-minor fractions to the nearest unit.
fn to_minor_units(amount: Decimal, currency: &'static Currency) -> Result<i64, PaymentError> {
    let scale = Decimal::from(10u32.pow(currency.exponent));
    let scaled = (amount * scale).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    scaled.to_i64().ok_or(PaymentError::Unrepresentable(amount))
}

fn line_item(
    name: String,
    description: String,
    amount: Decimal,
    currency: &'static Currency,
) -> Result<LineItem, PaymentError> {
    Ok(LineItem {
        product_name: name,
        product_description: description,
        price_in_cents: to_minor_units(amount, currency)?,
        quantity: 1,
        currency: currency.iso_alpha_code.to_owned(),
    })
}

/// Builds the line items for the booking-time deposit checkout.
///
/// # Errors
///
/// - [`PaymentError::NotPriceable`] for the all-zero sentinel breakdown.
/// - [`PaymentError::Config`] if the billing currency cannot be resolved.
/// - [`PaymentError::Unrepresentable`] if the deposit does not fit minor
///   units.
pub fn deposit_line_items(
    category: &ServiceCategory,
    pricing: &TripPricing,
    config: &PricingConfig,
) -> Result<Vec<LineItem>, PaymentError> {
    if !pricing.is_priceable() {
        return Err(PaymentError::NotPriceable);
    }

    let currency = config.currency()?;

    Ok(vec![line_item(
        format!("{} - Deposit", category.name()),
        format!("Deposit for {} (card required)", category.name()),
        pricing.deposit,
        currency,
    )?])
}

/// Builds the line items for the final service-fee checkout.
///
/// # Errors
///
/// Same failure modes as [`deposit_line_items`].
pub fn final_payment_line_items(
    category: &ServiceCategory,
    pricing: &TripPricing,
    config: &PricingConfig,
) -> Result<Vec<LineItem>, PaymentError> {
    if !pricing.is_priceable() {
        return Err(PaymentError::NotPriceable);
    }

    let currency = config.currency()?;

    Ok(vec![line_item(
        format!("{} - Service Fee", category.name()),
        format!("Final payment for {}", category.name()),
        pricing.service_fee,
        currency,
    )?])
}
