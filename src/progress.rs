//! Trip progress state machine.
//!
//! Deterministically derives, from the persisted `(TripStatus, StatusUpdate)`
//! pair, the current display step, the single next driver action (if any),
//! and the exact pair that performing that action produces. Pure functions of
//! the latest read; no hidden state beyond the persisted pair.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::status::{CompletionSummary, StatusUpdate, TripStatus};

/// Errors deriving a transition from a driver action.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgressError {
    /// Completing a trip without its cost summary would lose financial data,
    /// so the transition fails loudly instead of defaulting.
    #[error("completion summary is required to complete a trip")]
    MissingSummary,
}

/// Display step of a trip, one per row of the progress table.
///
/// Finer-grained than [`TripStatus`]: the three `Accepted` sub-phases each
/// get their own step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TripStep {
    /// Waiting for a driver to accept.
    Pending,

    /// Accepted, driver not yet travelling.
    Accepted,

    /// Driver travelling to the pickup location.
    EnRoute,

    /// Driver at the pickup location.
    Arrived,

    /// Service underway.
    InProgress,

    /// Finished with a recorded summary.
    Completed,

    /// Cancelled.
    Cancelled,
}

impl TripStep {
    /// Customer-facing label for the step.
    pub fn label(self) -> &'static str {
        match self {
            TripStep::Pending => "Pending",
            TripStep::Accepted => "Accepted",
            TripStep::EnRoute => "En Route to Pickup",
            TripStep::Arrived => "Arrived at Pickup",
            TripStep::InProgress => "In Progress",
            TripStep::Completed => "Completed",
            TripStep::Cancelled => "Cancelled",
        }
    }
}

/// Driver-performable operations, one per non-terminal step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    /// Accept a pending trip.
    Accept,

    /// Start travelling to the pickup location.
    EnRoute,

    /// Mark arrival at the pickup location.
    Arrived,

    /// Start the service.
    InProgress,

    /// Finish the trip, recording a cost summary.
    Complete,
}

impl ActionKind {
    /// Button label shown for the action.
    pub fn label(self) -> &'static str {
        match self {
            ActionKind::Accept => "Accept Trip",
            ActionKind::EnRoute => "En Route to Pickup",
            ActionKind::Arrived => "Mark as Arrived",
            ActionKind::InProgress => "Start Trip",
            ActionKind::Complete => "Complete Trip",
        }
    }

    /// Placeholder used when the caller passes an empty message.
    fn default_message(self) -> &'static str {
        match self {
            ActionKind::Accept => "Trip accepted",
            ActionKind::EnRoute => "Driver is en route to pickup",
            ActionKind::Arrived => "Driver has arrived at pickup",
            ActionKind::InProgress => "Trip is in progress",
            ActionKind::Complete => "Trip completed",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::Accept => "accept",
            ActionKind::EnRoute => "enRoute",
            ActionKind::Arrived => "arrived",
            ActionKind::InProgress => "inProgress",
            ActionKind::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// The single next driver-performable operation for a trip, along with the
/// extra input the caller must collect before invoking it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverAction {
    /// Which operation to perform.
    pub action: ActionKind,

    /// Button label shown for the action.
    pub label: &'static str,

    /// Whether a free-text message must be collected (defaults acceptable).
    pub requires_message: bool,

    /// Whether a [`CompletionSummary`] must be collected.
    pub requires_summary: bool,
}

impl DriverAction {
    fn message_action(action: ActionKind) -> Self {
        Self {
            action,
            label: action.label(),
            requires_message: true,
            requires_summary: false,
        }
    }

    fn summary_action(action: ActionKind) -> Self {
        Self {
            action,
            label: action.label(),
            requires_message: false,
            requires_summary: true,
        }
    }
}

/// Derived view of a trip's progress.
#[derive(Debug, Clone, PartialEq)]
pub struct TripProgressInfo {
    /// The step the trip is currently at.
    pub current_step: TripStep,

    /// Customer-facing label for the step.
    pub step_label: &'static str,

    /// The next driver action, absent on terminal steps.
    pub next_action: Option<DriverAction>,

    /// Message or cancellation reason from the latest status update, if its
    /// tag matches the current status.
    pub latest_message: Option<String>,

    /// Cost summary, populated only on completed trips with a matching tag.
    pub completion_summary: Option<CompletionSummary>,
}

impl TripProgressInfo {
    fn at_step(step: TripStep) -> Self {
        Self {
            current_step: step,
            step_label: step.label(),
            next_action: None,
            latest_message: None,
            completion_summary: None,
        }
    }

    fn with_next(mut self, action: DriverAction) -> Self {
        self.next_action = Some(action);
        self
    }

    fn with_message(mut self, message: Option<String>) -> Self {
        self.latest_message = message;
        self
    }
}

/// Derives a trip's progress from its persisted `(status, update)` pair.
///
/// Pure and idempotent: two callers reading the same stored pair always get
/// the same result. Terminal statuses never report a next action.
///
/// Inconsistent pairs (a tag that does not belong with the status) are
/// tolerated: the foreign tag is ignored and the derivation falls back to the
/// status alone, logging a warning. Refusing them is the write boundary's
/// job, not the reader's.
pub fn trip_progress(status: TripStatus, update: Option<&StatusUpdate>) -> TripProgressInfo {
    if update.is_some_and(|update| !update.is_consistent_with(status)) {
        warn!(?status, ?update, "status update tag is inconsistent with trip status");
    }

    match status {
        TripStatus::Cancelled => {
            let reason = match update {
                Some(StatusUpdate::Cancelled { reason }) => Some(reason.clone()),
                _ => None,
            };

            TripProgressInfo::at_step(TripStep::Cancelled).with_message(reason)
        }
        TripStatus::Completed => {
            let summary = match update {
                Some(StatusUpdate::Completed { summary }) => Some(summary.clone()),
                _ => None,
            };

            let mut info = TripProgressInfo::at_step(TripStep::Completed);
            info.completion_summary = summary;
            info
        }
        TripStatus::InProgress => {
            let message = match update {
                Some(StatusUpdate::InProgress { message }) => Some(message.clone()),
                _ => None,
            };

            TripProgressInfo::at_step(TripStep::InProgress)
                .with_message(message)
                .with_next(DriverAction::summary_action(ActionKind::Complete))
        }
        // The accepted status carries three sub-phases, distinguished only by
        // the update tag.
        TripStatus::Accepted => match update {
            Some(StatusUpdate::Arrived { message }) => TripProgressInfo::at_step(TripStep::Arrived)
                .with_message(Some(message.clone()))
                .with_next(DriverAction::message_action(ActionKind::InProgress)),
            Some(StatusUpdate::EnRoute { message }) => TripProgressInfo::at_step(TripStep::EnRoute)
                .with_message(Some(message.clone()))
                .with_next(DriverAction::message_action(ActionKind::Arrived)),
            other => {
                let message = match other {
                    Some(StatusUpdate::TripAccepted { message }) => Some(message.clone()),
                    _ => None,
                };

                TripProgressInfo::at_step(TripStep::Accepted)
                    .with_message(message)
                    .with_next(DriverAction::message_action(ActionKind::EnRoute))
            }
        },
        TripStatus::Pending => TripProgressInfo::at_step(TripStep::Pending)
            .with_next(DriverAction::message_action(ActionKind::Accept)),
    }
}

/// The `(status, update)` pair produced by performing a driver action.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Status to persist.
    pub new_status: TripStatus,

    /// Update payload to persist atomically with the status.
    pub status_update: StatusUpdate,
}

/// Derives the `(status, update)` pair a driver action produces.
///
/// An empty or whitespace-only message is replaced with an action-specific
/// placeholder here, so callers get a uniform contract. Actions other than
/// [`ActionKind::Complete`] ignore a passed summary.
///
/// # Errors
///
/// Returns [`ProgressError::MissingSummary`] if `action` is
/// [`ActionKind::Complete`] and no summary was provided.
pub fn next_status_for_action(
    action: ActionKind,
    message: &str,
    summary: Option<CompletionSummary>,
) -> Result<Transition, ProgressError> {
    let message = match message.trim() {
        "" => action.default_message().to_owned(),
        trimmed => trimmed.to_owned(),
    };

    let transition = match action {
        ActionKind::Accept => Transition {
            new_status: TripStatus::Accepted,
            status_update: StatusUpdate::TripAccepted { message },
        },
        ActionKind::EnRoute => Transition {
            new_status: TripStatus::Accepted,
            status_update: StatusUpdate::EnRoute { message },
        },
        ActionKind::Arrived => Transition {
            new_status: TripStatus::Accepted,
            status_update: StatusUpdate::Arrived { message },
        },
        ActionKind::InProgress => Transition {
            new_status: TripStatus::InProgress,
            status_update: StatusUpdate::InProgress { message },
        },
        ActionKind::Complete => {
            let summary = summary.ok_or(ProgressError::MissingSummary)?;

            Transition {
                new_status: TripStatus::Completed,
                status_update: StatusUpdate::Completed { summary },
            }
        }
    };

    Ok(transition)
}
