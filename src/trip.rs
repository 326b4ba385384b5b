//! The persisted trip record.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    pricing::TripPricing,
    status::{StatusUpdate, TripStatus},
};

/// Identifier assigned to a trip by External Storage.
pub type TripId = u64;

/// A single booked service engagement between a customer and a driver.
///
/// Owned by External Storage; this crate only reads it and derives from the
/// latest read. Mutation happens exclusively through state-machine
/// transitions, each one an atomic `(trip_status, status_update)` pair write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    /// Storage-assigned identifier; `0` until persisted.
    pub trip_id: TripId,

    /// The booking customer.
    pub client_id: String,

    /// The driver who accepted, once one has.
    pub driver_id: Option<String>,

    /// Coarse lifecycle phase.
    pub trip_status: TripStatus,

    /// Sub-step payload for the current phase.
    pub status_update: Option<StatusUpdate>,

    /// Manually confirmed one-way distance in miles. Not captured by GPS.
    pub miles: Option<Decimal>,

    /// Estimated duration in hours, for hourly service categories.
    pub duration: Option<Decimal>,

    /// Free-text requests; encodes the selected service category.
    pub special_requests: String,

    /// Pricing snapshot frozen at booking time.
    pub trip_cost_calculation: Option<TripPricing>,

    /// Whether the deposit checkout has been paid.
    pub deposit_paid: bool,

    /// Booking start time, in milliseconds since the Unix epoch.
    pub start_time: i64,
}

impl Trip {
    /// Creates a new unpersisted trip in the initial lifecycle state.
    pub fn new(
        client_id: impl Into<String>,
        start_time: i64,
        special_requests: impl Into<String>,
    ) -> Self {
        Self {
            trip_id: 0,
            client_id: client_id.into(),
            driver_id: None,
            trip_status: TripStatus::Pending,
            status_update: None,
            miles: None,
            duration: None,
            special_requests: special_requests.into(),
            trip_cost_calculation: None,
            deposit_paid: false,
            start_time,
        }
    }

    /// Sets the estimated duration in hours.
    pub fn with_duration(mut self, hours: Decimal) -> Self {
        self.duration = Some(hours);
        self
    }

    /// Freezes a pricing snapshot taken at booking time.
    pub fn with_cost_calculation(mut self, pricing: TripPricing) -> Self {
        self.trip_cost_calculation = Some(pricing);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trip_starts_pending_with_no_update() {
        let trip = Trip::new("client-1", 1_700_000_000_000, "Service: Companion to Hospital");

        assert_eq!(trip.trip_status, TripStatus::Pending);
        assert_eq!(trip.status_update, None);
        assert_eq!(trip.trip_id, 0);
        assert!(!trip.deposit_paid);
    }

    #[test]
    fn builders_attach_duration_and_pricing() {
        let trip = Trip::new("client-1", 0, "Service: Companion (general)")
            .with_duration(Decimal::from(2))
            .with_cost_calculation(TripPricing::ZERO);

        assert_eq!(trip.duration, Some(Decimal::from(2)));
        assert_eq!(trip.trip_cost_calculation, Some(TripPricing::ZERO));
    }
}
