//! Tripway prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    config::{ConfigError, PricingConfig},
    payment::{
        CheckoutRequest, CheckoutSession, LineItem, PaymentError, PaymentProvider,
        deposit_line_items, final_payment_line_items,
    },
    pricing::{
        PricingError, TripPricing, calculate_service_pricing, calculate_trip_pricing,
        display_amount, is_valid_miles_for_booking,
    },
    progress::{
        ActionKind, DriverAction, ProgressError, Transition, TripProgressInfo, TripStep,
        next_status_for_action, trip_progress,
    },
    services::{CATALOG, ServiceCategory, category_from_special_requests, find_category},
    status::{CompletionSummary, StatusUpdate, TripStatus},
    storage::{MemoryTripStore, StoreError, TripStore},
    trip::{Trip, TripId},
};
