//! # Error Types
//!
//! Domain-specific error types for turf-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  turf-core errors (this file)                                          │
//! │  ├── CoreError        - Reservation rule violations                    │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  turf-store errors (separate crate)                                    │
//! │  └── StoreError       - Conflicts, lookups, lock contention, auth      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → caller / UI          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (turf id, slot, status)
//! 3. Errors are enum variants, never String

use thiserror::Error;

use crate::slots::SlotId;
use crate::types::{BookingStatus, Sport};

// =============================================================================
// Core Error
// =============================================================================

/// Reservation rule violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// An argument was outside the domain of the operation.
    ///
    /// ## When This Occurs
    /// - Asking for a price quote for zero or negative slots
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The requested status change is not in the transition table.
    ///
    /// ## User Workflow
    /// ```text
    /// Admin clicks "Confirm" on a cancelled booking
    ///      │
    ///      ▼
    /// transition(Cancelled, Confirmed)
    ///      │
    ///      ▼
    /// InvalidTransition { from: Cancelled, to: Confirmed }
    /// ```
    #[error("Cannot move booking from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    /// The turf does not offer the requested sport.
    #[error("Turf {turf_id} does not support {sport}")]
    UnsupportedSport { turf_id: String, sport: Sport },

    /// A slot lies outside the turf's operating window or is already past.
    #[error("Slot {slot} is not bookable on turf {turf_id}: {reason}")]
    SlotNotBookable {
        turf_id: String,
        slot: SlotId,
        reason: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before reservation logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., bad time of day, bad slot id).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., the same slot twice in one request).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Shorthand for [`ValidationError::InvalidFormat`].
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
