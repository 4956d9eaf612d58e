//! # Validation Module
//!
//! Input validation for turfs, bookings and registrations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI / HTTP layer                                              │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Reservation Store entry points                               │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Store invariants (under the write lock)                      │
//! │  ├── Slot exclusivity per (turf, date)                                 │
//! │  └── Status transition table                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use turf_core::validation::{parse_clock_time, validate_email};
//!
//! assert_eq!(parse_clock_time("open_time", "06:00").unwrap(), (6, 0));
//! assert!(validate_email("player@example.com").is_ok());
//! ```

use std::collections::BTreeSet;

use crate::error::ValidationError;
use crate::slots::SlotId;
use crate::types::{BookingContact, Sport, TurfDraft};
use crate::{MAX_PRICE_PER_HOUR, MIN_PASSWORD_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn required_trimmed<'a>(field: &str, value: &'a str, max: usize) -> ValidationResult<&'a str> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value)
}

/// Validates a turf name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_turf_name(name: &str) -> ValidationResult<()> {
    required_trimmed("name", name, 200).map(|_| ())
}

/// Validates a person's display name (registration, booking contact).
pub fn validate_person_name(name: &str) -> ValidationResult<()> {
    required_trimmed("name", name, 100).map(|_| ())
}

/// Validates an email address.
///
/// ## Rules
/// - Must not be empty
/// - Must contain `@` with text on both sides
///
/// ## Example
/// ```rust
/// use turf_core::validation::validate_email;
///
/// assert!(validate_email("a@b.in").is_ok());
/// assert!(validate_email("not-an-email").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = required_trimmed("email", email, 254)?;

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ValidationError::invalid_format(
            "email",
            "must be a valid email address",
        )),
    }
}

/// Validates a phone number.
///
/// ## Rules
/// - 7 to 20 characters
/// - Digits, `+`, spaces and dashes only
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::required("phone"));
    }

    let len = phone.chars().count();
    if len < 7 {
        return Err(ValidationError::TooShort {
            field: "phone".to_string(),
            min: 7,
        });
    }
    if len > 20 {
        return Err(ValidationError::TooLong {
            field: "phone".to_string(),
            max: 20,
        });
    }

    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || c == '+' || c == ' ' || c == '-')
    {
        return Err(ValidationError::invalid_format(
            "phone",
            "must contain only digits, '+', spaces and dashes",
        ));
    }

    Ok(())
}

/// Validates a registration password.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (matches everything)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Time Validators
// =============================================================================

/// Parses a 24-hour "HH:MM" time of day into `(hour, minute)`.
///
/// ## Example
/// ```rust
/// use turf_core::validation::parse_clock_time;
///
/// assert_eq!(parse_clock_time("close_time", "00:00").unwrap(), (0, 0));
/// assert!(parse_clock_time("close_time", "24:00").is_err());
/// assert!(parse_clock_time("close_time", "7pm").is_err());
/// ```
pub fn parse_clock_time(field: &str, time: &str) -> ValidationResult<(u8, u8)> {
    let bad = || ValidationError::invalid_format(field, format!("'{}' is not HH:MM", time));

    let (hour, minute) = time.trim().split_once(':').ok_or_else(bad)?;
    if hour.len() != 2 || minute.len() != 2 {
        return Err(bad());
    }

    let hour: u8 = hour.parse().map_err(|_| bad())?;
    let minute: u8 = minute.parse().map_err(|_| bad())?;
    if hour > 23 || minute > 59 {
        return Err(bad());
    }

    Ok((hour, minute))
}

/// Validates turf opening and closing times: "HH:MM" on the hour.
pub fn validate_turf_hours(open_time: &str, close_time: &str) -> ValidationResult<()> {
    for (field, time) in [("open_time", open_time), ("close_time", close_time)] {
        let (_, minute) = parse_clock_time(field, time)?;
        if minute != 0 {
            return Err(ValidationError::invalid_format(field, "must be on the hour"));
        }
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an hourly price in currency units.
///
/// ## Rules
/// - Must be positive (> 0)
/// - At most [`MAX_PRICE_PER_HOUR`], so a full day of slots cannot overflow
pub fn validate_price_per_hour(price: i64) -> ValidationResult<()> {
    if price <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "price_per_hour".to_string(),
        });
    }

    if price > MAX_PRICE_PER_HOUR {
        return Err(ValidationError::OutOfRange {
            field: "price_per_hour".to_string(),
            min: 1,
            max: MAX_PRICE_PER_HOUR,
        });
    }

    Ok(())
}

/// Validates an aggregate rating (0.0 to 5.0).
pub fn validate_rating(rating: f64) -> ValidationResult<()> {
    if !(0.0..=5.0).contains(&rating) {
        return Err(ValidationError::OutOfRange {
            field: "rating".to_string(),
            min: 0,
            max: 5,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the sports list of a turf.
///
/// ## Rules
/// - At least one sport
/// - No duplicates
pub fn validate_sports(sports: &[Sport]) -> ValidationResult<()> {
    if sports.is_empty() {
        return Err(ValidationError::required("sports"));
    }

    let mut seen = BTreeSet::new();
    for sport in sports {
        if !seen.insert(*sport) {
            return Err(ValidationError::Duplicate {
                field: "sport".to_string(),
                value: sport.to_string(),
            });
        }
    }

    Ok(())
}

/// Validates the slots of one booking request.
///
/// ## Rules
/// - At least one slot
/// - No slot twice
/// - At most `max` slots
///
/// ## Returns
/// The slots in ascending order.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Checkout: Book Selected Slots                                          │
/// │                                                                         │
/// │  Customer picked: [slot-19, slot-18]                                   │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_slot_selection ← THIS FUNCTION                               │
/// │       │                                                                 │
/// │       ├── empty? → Error: "slots is required"                          │
/// │       ├── repeated? → Error: "slot 'slot-18' already exists"           │
/// │       ├── too many? → Error: out of range                              │
/// │       │                                                                 │
/// │       └── OK → [slot-18, slot-19] → window and conflict checks         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_slot_selection(slots: &[SlotId], max: usize) -> ValidationResult<Vec<SlotId>> {
    if slots.is_empty() {
        return Err(ValidationError::required("slots"));
    }

    if slots.len() > max {
        return Err(ValidationError::OutOfRange {
            field: "slots".to_string(),
            min: 1,
            max: max as i64,
        });
    }

    let mut ordered = BTreeSet::new();
    for slot in slots {
        if !ordered.insert(*slot) {
            return Err(ValidationError::Duplicate {
                field: "slot".to_string(),
                value: slot.to_string(),
            });
        }
    }

    Ok(ordered.into_iter().collect())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates every field of a turf draft.
pub fn validate_turf_draft(draft: &TurfDraft) -> ValidationResult<()> {
    validate_turf_name(&draft.name)?;
    validate_price_per_hour(draft.price_per_hour)?;
    validate_sports(&draft.sports)?;
    validate_turf_hours(&draft.open_time, &draft.close_time)?;
    validate_rating(draft.rating)?;
    Ok(())
}

/// Validates booking contact details.
pub fn validate_contact(contact: &BookingContact) -> ValidationResult<()> {
    validate_person_name(&contact.name)?;
    validate_email(&contact.email)?;
    validate_phone(&contact.phone)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
