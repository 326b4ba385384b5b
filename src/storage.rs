//! External Storage boundary.
//!
//! The core consumes trips through the narrow [`TripStore`] interface; the
//! record's lifetime is owned by the store. [`MemoryTripStore`] is the
//! in-process implementation used by tests and single-node deployments. It
//! enforces the contract a live integration must uphold at this boundary:
//! one writer per trip at a time (optimistic versioning), atomic
//! `(status, update)` pair writes, and no writes past a terminal state.

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    progress::{ActionKind, ProgressError, next_status_for_action, trip_progress},
    status::{CompletionSummary, StatusUpdate, TripStatus},
    trip::{Trip, TripId},
};

/// Errors surfaced at the storage boundary.
///
/// Propagated to the caller unmodified; the core does not retry.
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    /// No trip with the given identifier exists.
    #[error("trip {0} not found")]
    NotFound(TripId),

    /// The trip was modified between read and write.
    #[error("trip {trip_id} modified concurrently (expected version {expected}, found {found})")]
    VersionConflict {
        /// Trip whose write was rejected.
        trip_id: TripId,

        /// Version the writer read.
        expected: u64,

        /// Version currently stored.
        found: u64,
    },

    /// Terminal trips accept no further status writes.
    #[error("trip {0} is in a terminal state")]
    TerminalTrip(TripId),

    /// The `(status, update)` pair violates the tag invariant and was refused
    /// at the write boundary.
    #[error("status update tag is inconsistent with status `{status:?}` for trip {trip_id}")]
    InconsistentUpdate {
        /// Trip whose write was rejected.
        trip_id: TripId,

        /// Status the write carried.
        status: TripStatus,
    },

    /// The requested action is not the trip's next action.
    #[error("action `{action}` is not available for trip {trip_id}")]
    ActionNotAvailable {
        /// Trip the action targeted.
        trip_id: TripId,

        /// The rejected action.
        action: ActionKind,
    },

    /// The action's own preconditions failed.
    #[error(transparent)]
    Progress(#[from] ProgressError),
}

/// Narrow interface the core consumes from External Storage.
///
/// `update_trip_status` writes both fields together, atomically; callers must
/// never update one without the other.
pub trait TripStore {
    /// Persists a new trip, normalised to the initial lifecycle state.
    ///
    /// # Errors
    ///
    /// Implementation-specific persistence failures.
    fn create_trip(&mut self, trip: Trip) -> Result<TripId, StoreError>;

    /// Reads the latest trip record.
    ///
    /// # Errors
    ///
    /// Implementation-specific persistence failures.
    fn get_trip(&self, trip_id: TripId) -> Result<Option<Trip>, StoreError>;

    /// Atomically overwrites the `(status, update)` pair.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown trip,
    /// [`StoreError::TerminalTrip`] if the trip already completed or was
    /// cancelled, and [`StoreError::InconsistentUpdate`] if the pair violates
    /// the tag invariant.
    fn update_trip_status(
        &mut self,
        trip_id: TripId,
        new_status: TripStatus,
        status_update: Option<StatusUpdate>,
    ) -> Result<(), StoreError>;

    /// Updates the manually confirmed distance, independent of status.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown trip.
    fn update_trip_miles(&mut self, trip_id: TripId, miles: Decimal) -> Result<(), StoreError>;
}

#[derive(Debug)]
struct VersionedTrip {
    trip: Trip,
    version: u64,
}

/// In-memory key-value trip store.
#[derive(Debug, Default)]
pub struct MemoryTripStore {
    trips: FxHashMap<TripId, VersionedTrip>,
    next_id: TripId,
}

impl MemoryTripStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current write version of a trip, for optimistic concurrency control.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown trip.
    pub fn version_of(&self, trip_id: TripId) -> Result<u64, StoreError> {
        self.trips
            .get(&trip_id)
            .map(|stored| stored.version)
            .ok_or(StoreError::NotFound(trip_id))
    }

    fn stored_mut(&mut self, trip_id: TripId) -> Result<&mut VersionedTrip, StoreError> {
        self.trips
            .get_mut(&trip_id)
            .ok_or(StoreError::NotFound(trip_id))
    }

    fn checked_status_write(
        stored: &mut VersionedTrip,
        trip_id: TripId,
        new_status: TripStatus,
        status_update: Option<StatusUpdate>,
    ) -> Result<(), StoreError> {
        if stored.trip.trip_status.is_terminal() {
            return Err(StoreError::TerminalTrip(trip_id));
        }

        if status_update
            .as_ref()
            .is_some_and(|update| !update.is_consistent_with(new_status))
        {
            return Err(StoreError::InconsistentUpdate {
                trip_id,
                status: new_status,
            });
        }

        stored.trip.trip_status = new_status;
        stored.trip.status_update = status_update;
        stored.version += 1;

        info!(
            trip_id,
            ?new_status,
            version = stored.version,
            note = stored.trip.status_update.as_ref().and_then(StatusUpdate::message),
            "trip status updated"
        );

        Ok(())
    }

    /// Atomically overwrites the `(status, update)` pair, but only if the
    /// trip is still at the version the writer read.
    ///
    /// # Errors
    ///
    /// [`StoreError::VersionConflict`] if another writer got there first,
    /// plus the failures of [`TripStore::update_trip_status`].
    pub fn compare_and_update_status(
        &mut self,
        trip_id: TripId,
        expected_version: u64,
        new_status: TripStatus,
        status_update: Option<StatusUpdate>,
    ) -> Result<(), StoreError> {
        let stored = self.stored_mut(trip_id)?;

        if stored.version != expected_version {
            return Err(StoreError::VersionConflict {
                trip_id,
                expected: expected_version,
                found: stored.version,
            });
        }

        Self::checked_status_write(stored, trip_id, new_status, status_update)
    }

    /// Performs one read-derive-write cycle for a driver action.
    ///
    /// Reads the trip, verifies `action` is the trip's next action, derives
    /// the transition, and writes it back under the version read, so a
    /// concurrent writer on the same trip fails instead of clobbering.
    ///
    /// # Errors
    ///
    /// [`StoreError::ActionNotAvailable`] if the trip's state does not offer
    /// `action`, [`StoreError::Progress`] for failed action preconditions
    /// (missing completion summary), plus the write failures above.
    pub fn apply_action(
        &mut self,
        trip_id: TripId,
        action: ActionKind,
        message: &str,
        summary: Option<CompletionSummary>,
    ) -> Result<Trip, StoreError> {
        let trip = self
            .get_trip(trip_id)?
            .ok_or(StoreError::NotFound(trip_id))?;
        let version = self.version_of(trip_id)?;

        let progress = trip_progress(trip.trip_status, trip.status_update.as_ref());
        let available = progress.next_action.map(|next| next.action);

        if available != Some(action) {
            return Err(StoreError::ActionNotAvailable { trip_id, action });
        }

        let transition = next_status_for_action(action, message, summary)?;

        self.compare_and_update_status(
            trip_id,
            version,
            transition.new_status,
            Some(transition.status_update),
        )?;

        self.get_trip(trip_id)?.ok_or(StoreError::NotFound(trip_id))
    }

    /// Cancels a trip with the customer's reason.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] for an unknown trip,
    /// [`StoreError::TerminalTrip`] if it already completed or was cancelled.
    pub fn cancel_trip(
        &mut self,
        trip_id: TripId,
        reason: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.update_trip_status(
            trip_id,
            TripStatus::Cancelled,
            Some(StatusUpdate::Cancelled {
                reason: reason.into(),
            }),
        )
    }
}

impl TripStore for MemoryTripStore {
    fn create_trip(&mut self, mut trip: Trip) -> Result<TripId, StoreError> {
        self.next_id += 1;
        let trip_id = self.next_id;

        // New trips always start pending with no update, whatever the caller
        // put in the record.
        trip.trip_id = trip_id;
        trip.trip_status = TripStatus::Pending;
        trip.status_update = None;

        self.trips.insert(trip_id, VersionedTrip { trip, version: 0 });

        info!(trip_id, "trip created");

        Ok(trip_id)
    }

    fn get_trip(&self, trip_id: TripId) -> Result<Option<Trip>, StoreError> {
        Ok(self.trips.get(&trip_id).map(|stored| stored.trip.clone()))
    }

    fn update_trip_status(
        &mut self,
        trip_id: TripId,
        new_status: TripStatus,
        status_update: Option<StatusUpdate>,
    ) -> Result<(), StoreError> {
        let stored = self.stored_mut(trip_id)?;

        Self::checked_status_write(stored, trip_id, new_status, status_update)
    }

    fn update_trip_miles(&mut self, trip_id: TripId, miles: Decimal) -> Result<(), StoreError> {
        let stored = self.stored_mut(trip_id)?;

        stored.trip.miles = Some(miles);
        stored.version += 1;

        debug!(trip_id, %miles, "trip miles updated");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn seed_trip(store: &mut MemoryTripStore) -> Result<TripId, StoreError> {
        store.create_trip(Trip::new("client-1", 0, "Service: Companion to Hospital"))
    }

    #[test]
    fn create_normalises_to_pending() -> TestResult {
        let mut store = MemoryTripStore::new();
        let mut trip = Trip::new("client-1", 0, "Service: Companion to Hospital");
        trip.trip_status = TripStatus::Completed;

        let trip_id = store.create_trip(trip)?;
        let stored = store.get_trip(trip_id)?.ok_or("trip missing")?;

        assert_eq!(stored.trip_status, TripStatus::Pending);
        assert_eq!(stored.status_update, None);
        assert_eq!(stored.trip_id, trip_id);

        Ok(())
    }

    #[test]
    fn get_unknown_trip_is_none() -> TestResult {
        let store = MemoryTripStore::new();

        assert_eq!(store.get_trip(42)?, None);

        Ok(())
    }

    #[test]
    fn status_write_is_an_atomic_pair() -> TestResult {
        let mut store = MemoryTripStore::new();
        let trip_id = seed_trip(&mut store)?;

        store.update_trip_status(
            trip_id,
            TripStatus::Accepted,
            Some(StatusUpdate::TripAccepted {
                message: "On my way!".into(),
            }),
        )?;

        let trip = store.get_trip(trip_id)?.ok_or("trip missing")?;
        assert_eq!(trip.trip_status, TripStatus::Accepted);
        assert_eq!(
            trip.status_update,
            Some(StatusUpdate::TripAccepted {
                message: "On my way!".into()
            })
        );

        Ok(())
    }

    #[test]
    fn inconsistent_pair_is_refused_at_write() -> TestResult {
        let mut store = MemoryTripStore::new();
        let trip_id = seed_trip(&mut store)?;

        let result = store.update_trip_status(
            trip_id,
            TripStatus::Accepted,
            Some(StatusUpdate::InProgress {
                message: "wrong tag".into(),
            }),
        );

        assert_eq!(
            result,
            Err(StoreError::InconsistentUpdate {
                trip_id,
                status: TripStatus::Accepted
            })
        );

        Ok(())
    }

    #[test]
    fn terminal_trip_rejects_further_writes() -> TestResult {
        let mut store = MemoryTripStore::new();
        let trip_id = seed_trip(&mut store)?;

        store.cancel_trip(trip_id, "Customer changed plans")?;

        let result = store.update_trip_status(
            trip_id,
            TripStatus::Accepted,
            Some(StatusUpdate::TripAccepted {
                message: "too late".into(),
            }),
        );

        assert_eq!(result, Err(StoreError::TerminalTrip(trip_id)));

        Ok(())
    }

    #[test]
    fn stale_version_write_conflicts() -> TestResult {
        let mut store = MemoryTripStore::new();
        let trip_id = seed_trip(&mut store)?;
        let version = store.version_of(trip_id)?;

        // Another writer wins the race.
        store.update_trip_status(
            trip_id,
            TripStatus::Accepted,
            Some(StatusUpdate::TripAccepted {
                message: "first".into(),
            }),
        )?;

        let result = store.compare_and_update_status(
            trip_id,
            version,
            TripStatus::Accepted,
            Some(StatusUpdate::TripAccepted {
                message: "second".into(),
            }),
        );

        assert!(
            matches!(result, Err(StoreError::VersionConflict { .. })),
            "expected version conflict, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn apply_action_rejects_out_of_order_actions() -> TestResult {
        let mut store = MemoryTripStore::new();
        let trip_id = seed_trip(&mut store)?;

        let result = store.apply_action(trip_id, ActionKind::Complete, "", None);

        assert_eq!(
            result,
            Err(StoreError::ActionNotAvailable {
                trip_id,
                action: ActionKind::Complete
            })
        );

        Ok(())
    }

    #[test]
    fn miles_update_is_independent_of_status() -> TestResult {
        let mut store = MemoryTripStore::new();
        let trip_id = seed_trip(&mut store)?;

        store.update_trip_miles(trip_id, Decimal::new(85, 1))?;

        let trip = store.get_trip(trip_id)?.ok_or("trip missing")?;
        assert_eq!(trip.miles, Some(Decimal::new(85, 1)));
        assert_eq!(trip.trip_status, TripStatus::Pending);

        Ok(())
    }
}
