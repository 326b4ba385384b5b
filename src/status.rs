//! Persisted trip lifecycle types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Coarse lifecycle phase of a trip, as persisted by External Storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TripStatus {
    /// Created by the customer; no driver has accepted yet.
    Pending,

    /// A driver has accepted. Sub-phase (just accepted / en route / arrived)
    /// is carried by the [`StatusUpdate`] tag, not by this enum.
    Accepted,

    /// The service is underway.
    InProgress,

    /// Terminal: the driver completed the trip and recorded a summary.
    Completed,

    /// Terminal: the trip was cancelled.
    Cancelled,
}

impl TripStatus {
    /// Whether the trip can no longer transition to another status.
    pub fn is_terminal(self) -> bool {
        matches!(self, TripStatus::Completed | TripStatus::Cancelled)
    }
}

/// Driver-entered cost summary recorded when a trip completes.
///
/// Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionSummary {
    /// Final amount charged for the trip, in dollars.
    pub total: Decimal,

    /// Free-text description of the work done.
    pub details: String,
}

impl CompletionSummary {
    /// Creates a new completion summary.
    pub fn new(total: Decimal, details: impl Into<String>) -> Self {
        Self {
            total,
            details: details.into(),
        }
    }
}

/// Fine-grained sub-step payload persisted alongside [`TripStatus`].
///
/// The tag must be consistent with the coarse status: `TripAccepted`,
/// `EnRoute` and `Arrived` only ever accompany [`TripStatus::Accepted`], the
/// remaining tags accompany their namesake status. A single coarse status can
/// therefore carry several sub-steps without widening [`TripStatus`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusUpdate {
    /// Driver accepted the trip.
    TripAccepted {
        /// Driver's note to the customer.
        message: String,
    },

    /// Driver is travelling to the pickup location.
    EnRoute {
        /// Driver's note to the customer.
        message: String,
    },

    /// Driver has arrived at the pickup location.
    Arrived {
        /// Driver's note to the customer.
        message: String,
    },

    /// The service is underway.
    InProgress {
        /// Driver's note to the customer.
        message: String,
    },

    /// The trip finished; carries the driver's cost summary.
    Completed {
        /// Final cost summary, immutable once set.
        summary: CompletionSummary,
    },

    /// The trip was cancelled.
    Cancelled {
        /// Reason for cancellation.
        reason: String,
    },
}

impl StatusUpdate {
    /// Free-text message carried by the update, if the variant has one.
    pub fn message(&self) -> Option<&str> {
        match self {
            StatusUpdate::TripAccepted { message }
            | StatusUpdate::EnRoute { message }
            | StatusUpdate::Arrived { message }
            | StatusUpdate::InProgress { message } => Some(message),
            StatusUpdate::Cancelled { reason } => Some(reason),
            StatusUpdate::Completed { .. } => None,
        }
    }

    /// The coarse status this update tag is allowed to accompany.
    pub fn expected_status(&self) -> TripStatus {
        match self {
            StatusUpdate::TripAccepted { .. }
            | StatusUpdate::EnRoute { .. }
            | StatusUpdate::Arrived { .. } => TripStatus::Accepted,
            StatusUpdate::InProgress { .. } => TripStatus::InProgress,
            StatusUpdate::Completed { .. } => TripStatus::Completed,
            StatusUpdate::Cancelled { .. } => TripStatus::Cancelled,
        }
    }

    /// Whether this update tag is consistent with the given status.
    pub fn is_consistent_with(&self, status: TripStatus) -> bool {
        self.expected_status() == status
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(TripStatus::Completed.is_terminal());
        assert!(TripStatus::Cancelled.is_terminal());
        assert!(!TripStatus::Pending.is_terminal());
        assert!(!TripStatus::Accepted.is_terminal());
        assert!(!TripStatus::InProgress.is_terminal());
    }

    #[test]
    fn accepted_sub_phase_tags_are_consistent_with_accepted() {
        let accepted = StatusUpdate::TripAccepted {
            message: "On my way!".into(),
        };
        let en_route = StatusUpdate::EnRoute {
            message: "Driving over".into(),
        };
        let arrived = StatusUpdate::Arrived {
            message: "Outside".into(),
        };

        for update in [&accepted, &en_route, &arrived] {
            assert!(update.is_consistent_with(TripStatus::Accepted));
            assert!(!update.is_consistent_with(TripStatus::InProgress));
        }
    }

    #[test]
    fn completed_tag_only_matches_completed_status() {
        let update = StatusUpdate::Completed {
            summary: CompletionSummary::new(Decimal::from(35), "Trip done"),
        };

        assert!(update.is_consistent_with(TripStatus::Completed));
        assert!(!update.is_consistent_with(TripStatus::Pending));
    }

    #[test]
    fn message_returns_variant_payload() {
        let update = StatusUpdate::Cancelled {
            reason: "Customer no longer needs the trip".into(),
        };

        assert_eq!(update.message(), Some("Customer no longer needs the trip"));
    }

    #[test]
    fn status_update_serialises_with_camel_case_tags() -> TestResult {
        let update = StatusUpdate::EnRoute {
            message: "Driving over".into(),
        };

        let yaml = serde_norway::to_string(&update)?;

        assert!(yaml.contains("enRoute"), "expected camelCase tag in {yaml}");

        Ok(())
    }
}
