//! Trip pricing engine.
//!
//! Pure functions mapping booking parameters to a reproducible cost
//! breakdown. Two tariff policies coexist: distance-based trips (manually
//! confirmed miles, capped) and hourly/flat-rate service categories. All
//! amounts are exact decimals; stored totals keep full precision and rounding
//! happens at display time only.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{config::PricingConfig, services::ServiceCategory};

/// Errors validating pricing inputs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// A negative distance was supplied.
    #[error("miles must not be negative, got {0}")]
    NegativeMiles(Decimal),

    /// A negative duration was supplied.
    #[error("hours must not be negative, got {0}")]
    NegativeHours(Decimal),

    /// An hourly category was priced without a duration.
    #[error("service category `{0}` is hourly but no hours were provided")]
    MissingHours(String),
}

/// Cost breakdown for a trip, in dollars.
///
/// The all-zero breakdown ([`TripPricing::ZERO`]) is a deliberate
/// "not priceable" sentinel, never a real zero-cost trip: callers must treat
/// it as "booking not yet valid" and block checkout on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPricing {
    /// Non-refundable upfront charge collected before service.
    pub deposit: Decimal,

    /// Charge for the service itself, separate from the deposit.
    pub service_fee: Decimal,

    /// `deposit + service_fee`.
    pub total: Decimal,

    /// `service_fee - company_fee`, attributed to the driver.
    pub driver_earnings: Decimal,

    /// The platform's commission, deducted from the service fee.
    pub company_fee: Decimal,
}

impl TripPricing {
    /// The "not priceable" sentinel breakdown.
    pub const ZERO: Self = Self {
        deposit: Decimal::ZERO,
        service_fee: Decimal::ZERO,
        total: Decimal::ZERO,
        driver_earnings: Decimal::ZERO,
        company_fee: Decimal::ZERO,
    };

    /// Whether this breakdown represents a priceable booking.
    ///
    /// `false` means the sentinel: the booking is not yet valid.
    pub fn is_priceable(&self) -> bool {
        *self != Self::ZERO
    }
}

/// Builds a breakdown from its independent parts.
fn breakdown(deposit: Decimal, service_fee: Decimal, company_fee: Decimal) -> TripPricing {
    TripPricing {
        deposit,
        service_fee,
        total: deposit + service_fee,
        driver_earnings: service_fee - company_fee,
        company_fee,
    }
}

/// Calculates the breakdown for a distance-based trip from manually confirmed
/// miles.
///
/// `None` or a distance over the configured cap yields [`TripPricing::ZERO`],
/// the "not priceable" sentinel. Within the cap the tariff is flat regardless
/// of the exact mileage (tiered, not linear).
///
/// # Errors
///
/// Returns [`PricingError::NegativeMiles`] for a negative distance; a
/// nonsensical input is rejected rather than silently priced.
pub fn calculate_trip_pricing(
    miles: Option<Decimal>,
    config: &PricingConfig,
) -> Result<TripPricing, PricingError> {
    let Some(miles) = miles else {
        return Ok(TripPricing::ZERO);
    };

    if miles < Decimal::ZERO {
        return Err(PricingError::NegativeMiles(miles));
    }

    if miles > config.max_distance_miles() {
        return Ok(TripPricing::ZERO);
    }

    Ok(breakdown(
        config.distance_deposit(),
        config.distance_service_fee(),
        config.company_fee(),
    ))
}

/// Whether a distance is acceptable for submitting a booking.
///
/// True iff `0 < miles <= cap`. This is the submission gate, distinct from
/// the pricing sentinel: a caller must check it before trusting a non-zero
/// breakdown as final.
pub fn is_valid_miles_for_booking(miles: Option<Decimal>, config: &PricingConfig) -> bool {
    miles.is_some_and(|miles| miles > Decimal::ZERO && miles <= config.max_distance_miles())
}

/// Calculates the breakdown for an hourly or flat-rate service category.
///
/// Hourly categories bill `hours x hourly_rate`; flat-rate categories bill
/// the configured flat fee. The deposit comes from the category itself.
///
/// # Errors
///
/// - [`PricingError::MissingHours`] if the category is hourly and no duration
///   was provided.
/// - [`PricingError::NegativeHours`] for a negative duration.
pub fn calculate_service_pricing(
    category: &ServiceCategory,
    hours: Option<Decimal>,
    config: &PricingConfig,
) -> Result<TripPricing, PricingError> {
    let service_fee = if category.is_hourly() {
        let hours = hours.ok_or_else(|| PricingError::MissingHours(category.id().to_owned()))?;

        if hours < Decimal::ZERO {
            return Err(PricingError::NegativeHours(hours));
        }

        hours * config.hourly_rate()
    } else {
        config.flat_service_fee()
    };

    Ok(breakdown(category.deposit(), service_fee, config.company_fee()))
}

/// Rounds an amount to cents for display.
///
/// Display only: stored totals keep full precision.
pub fn display_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
