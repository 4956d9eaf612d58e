//! # Booking State Machine
//!
//! The single place where booking status transitions are decided.
//!
//! ```text
//!                 ┌──────────────┐
//!                 │   Pending    │
//!                 └──────┬───────┘
//!            confirm     │      cancel
//!          ┌─────────────┴─────────────┐
//!          ▼                           ▼
//!   ┌──────────────┐  cancel   ┌──────────────┐
//!   │  Confirmed   │──────────►│  Cancelled   │ (terminal)
//!   └──────┬───────┘           └──────────────┘
//!          │ time elapsed
//!          ▼
//!   ┌──────────────┐
//!   │  Completed   │ (terminal)
//!   └──────────────┘
//! ```
//!
//! Requesting the current status again is accepted as a no-op so retried
//! calls are harmless.

use crate::error::{CoreError, CoreResult};
use crate::types::BookingStatus;

/// Outcome of an accepted transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The status changes.
    Applied,
    /// The booking is already in the requested status.
    Unchanged,
}

/// Checks the transition table (excluding same-status no-ops).
pub const fn can_transition(from: BookingStatus, to: BookingStatus) -> bool {
    use crate::types::BookingStatus::*;
    matches!(
        (from, to),
        (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Cancelled) | (Confirmed, Completed)
    )
}

/// Decides a transition request.
///
/// ## Errors
/// `CoreError::InvalidTransition` for every pair not in the table.
pub fn transition(from: BookingStatus, to: BookingStatus) -> CoreResult<Transition> {
    if from == to {
        return Ok(Transition::Unchanged);
    }
    if can_transition(from, to) {
        Ok(Transition::Applied)
    } else {
        Err(CoreError::InvalidTransition { from, to })
    }
}

/// Status a new booking starts in.
pub const fn initial_status(auto_confirm: bool) -> BookingStatus {
    if auto_confirm {
        BookingStatus::Confirmed
    } else {
        BookingStatus::Pending
    }
}
