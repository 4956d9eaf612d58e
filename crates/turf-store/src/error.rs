//! # Store Error Types
//!
//! Every rejected store operation returns one of these and leaves the
//! store unchanged.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Store Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │     Input       │  │  Reservation    │  │     Concurrency         │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Validation     │  │  SlotConflict   │  │  Busy (retryable)       │ │
//! │  │  InvalidInput   │  │  InvalidSlot    │  │  Reentrant              │ │
//! │  │  NotFound       │  │  Unsupported    │  │                         │ │
//! │  │                 │  │  InvalidTrans.  │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │    Identity     │  │  Configuration  │                              │
//! │  │  Auth           │  │  Config         │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Outer layers (HTTP, desktop shell) turn errors into [`ErrorPayload`]:
//! ```json
//! { "code": "SLOT_CONFLICT", "message": "...", "retryable": false }
//! ```

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use turf_core::{BookingStatus, CoreError, SlotId, Sport, ValidationError};

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

fn slot_list(slots: &[SlotId]) -> String {
    slots
        .iter()
        .map(SlotId::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Store error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    // =========================================================================
    // Input Errors
    // =========================================================================
    /// Malformed or missing fields.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// An argument outside the operation's domain.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unknown turf, booking or user id.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    // =========================================================================
    // Reservation Errors
    // =========================================================================
    /// Requested slots overlap an active booking. Nothing was booked.
    #[error("Slots already booked on turf {turf_id} for {date}: {}", slot_list(.slots))]
    SlotConflict {
        turf_id: String,
        date: NaiveDate,
        slots: Vec<SlotId>,
    },

    /// A slot is outside the operating window or already past.
    #[error("Slot {slot} is not bookable on turf {turf_id}: {reason}")]
    InvalidSlot {
        turf_id: String,
        slot: SlotId,
        reason: String,
    },

    /// The turf does not offer the requested sport.
    #[error("Turf {turf_id} does not support {sport}")]
    UnsupportedSport { turf_id: String, sport: Sport },

    /// Illegal status change.
    #[error("Cannot move booking from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    // =========================================================================
    // Identity Errors
    // =========================================================================
    /// Bad credentials or duplicate registration.
    #[error("Authentication failed: {0}")]
    Auth(String),

    // =========================================================================
    // Concurrency Errors
    // =========================================================================
    /// The store lock was not acquired in time. Safe to retry.
    #[error("Store busy: lock not acquired within {waited_ms}ms")]
    Busy { waited_ms: u64 },

    /// A change observer tried to mutate the store it is observing.
    #[error("Store mutation attempted from inside a change notification")]
    Reentrant,

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Creates a not found error.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Returns true if retrying the same call may succeed.
    ///
    /// Only lock contention is transient; conflicts and illegal transitions
    /// fail the same way on every retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Busy { .. })
    }

    /// Machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            StoreError::Validation(_) | StoreError::InvalidInput(_) => ErrorCode::ValidationError,
            StoreError::NotFound { .. } => ErrorCode::NotFound,
            StoreError::SlotConflict { .. } => ErrorCode::SlotConflict,
            StoreError::InvalidSlot { .. } => ErrorCode::InvalidSlot,
            StoreError::UnsupportedSport { .. } => ErrorCode::UnsupportedSport,
            StoreError::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            StoreError::Auth(_) => ErrorCode::AuthError,
            StoreError::Busy { .. } => ErrorCode::Busy,
            StoreError::Reentrant => ErrorCode::Reentrant,
            StoreError::Config(_) => ErrorCode::ConfigError,
        }
    }

    /// Serializable form for outer layers.
    pub fn to_payload(&self) -> ErrorPayload {
        ErrorPayload {
            code: self.code(),
            message: self.to_string(),
            retryable: self.is_retryable(),
        }
    }
}

/// Converts reservation rule violations to store errors.
impl From<CoreError> for StoreError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidInput { reason } => StoreError::InvalidInput(reason),
            CoreError::InvalidTransition { from, to } => StoreError::InvalidTransition { from, to },
            CoreError::UnsupportedSport { turf_id, sport } => {
                StoreError::UnsupportedSport { turf_id, sport }
            }
            CoreError::SlotNotBookable {
                turf_id,
                slot,
                reason,
            } => StoreError::InvalidSlot {
                turf_id,
                slot,
                reason,
            },
            CoreError::Validation(e) => StoreError::Validation(e),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Config(format!("IO error: {}", err))
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(err: toml::de::Error) -> Self {
        StoreError::Config(format!("TOML parse error: {}", err))
    }
}

// =============================================================================
// Error Payload
// =============================================================================

/// Error codes for outer layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationError,
    SlotConflict,
    InvalidSlot,
    UnsupportedSport,
    InvalidTransition,
    AuthError,
    Busy,
    Reentrant,
    ConfigError,
}

/// What a UI receives when an operation fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub code: ErrorCode,
    pub message: String,
    pub retryable: bool,
}
