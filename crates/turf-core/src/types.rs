//! # Domain Types
//!
//! Core domain types used throughout Turfbook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Turf       │   │     Booking     │   │      User       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  turf_id (FK)   │   │  id             │       │
//! │  │  sports         │   │  user_id (FK) ──│──►│  role           │       │
//! │  │  price_per_hour │   │  date, slots    │   │  email          │       │
//! │  │  open/close     │   │  status         │   └─────────────────┘       │
//! │  └─────────────────┘   │  total_amount   │                              │
//! │                        └─────────────────┘                              │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TimeSlot     │   │  BookingStatus  │   │      City       │       │
//! │  │  (derived view) │   │  Pending        │   │  (reference)    │       │
//! │  │  id, time       │   │  Confirmed      │   │  id, name       │       │
//! │  │  available      │   │  Cancelled      │   │  turf_count     │       │
//! │  │  price          │   │  Completed      │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Entity ids are opaque strings assigned by the store's id generator and
//! never change after creation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::slots::{OperatingWindow, SlotId};

// =============================================================================
// Sport
// =============================================================================

/// The fixed set of sports a turf can host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Sport {
    Cricket,
    Football,
}

impl Sport {
    /// Every supported sport, in display order.
    pub const ALL: [Sport; 2] = [Sport::Cricket, Sport::Football];

    /// Lowercase wire name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Sport::Cricket => "cricket",
            Sport::Football => "football",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sport {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cricket" => Ok(Sport::Cricket),
            "football" => Ok(Sport::Football),
            _ => Err(ValidationError::NotAllowed {
                field: "sport".to_string(),
                allowed: Sport::ALL.iter().map(|s| s.to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Turf
// =============================================================================

/// A bookable sports venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Turf {
    /// Unique identifier, immutable once assigned.
    pub id: String,

    /// Display name.
    pub name: String,

    /// City display name (matches `City::name`).
    pub city: String,

    /// Street address / locality.
    pub address: String,

    /// Sports this turf supports (non-empty).
    pub sports: Vec<Sport>,

    /// Price per hour in whole currency units.
    pub price_per_hour: i64,

    /// Aggregate rating, 0.0 - 5.0.
    pub rating: f64,

    /// Number of reviews behind `rating`.
    pub review_count: u32,

    /// Amenity labels ("Floodlights", "Parking", ...).
    pub amenities: Vec<String>,

    /// Opening time of day, 24-hour "HH:MM".
    pub open_time: String,

    /// Closing time of day, 24-hour "HH:MM". "00:00" means midnight.
    pub close_time: String,

    /// Highlighted on the landing page.
    #[serde(default)]
    pub featured: bool,
}

impl Turf {
    /// Builds a turf from a draft once the store has assigned an id.
    pub fn from_draft(id: impl Into<String>, draft: TurfDraft) -> Self {
        Turf {
            id: id.into(),
            name: draft.name,
            city: draft.city,
            address: draft.address,
            sports: draft.sports,
            price_per_hour: draft.price_per_hour,
            rating: draft.rating,
            review_count: draft.review_count,
            amenities: draft.amenities,
            open_time: draft.open_time,
            close_time: draft.close_time,
            featured: draft.featured,
        }
    }

    /// Returns the hourly price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::new(self.price_per_hour)
    }

    /// Checks whether the turf offers `sport`.
    pub fn supports(&self, sport: Sport) -> bool {
        self.sports.contains(&sport)
    }

    /// Parses the opening/closing times into the bookable hour window.
    pub fn window(&self) -> CoreResult<OperatingWindow> {
        OperatingWindow::from_times(&self.open_time, &self.close_time)
    }

    /// Applies a partial update, leaving `id` untouched.
    pub fn apply(&mut self, patch: TurfPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(city) = patch.city {
            self.city = city;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(sports) = patch.sports {
            self.sports = sports;
        }
        if let Some(price) = patch.price_per_hour {
            self.price_per_hour = price;
        }
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
        if let Some(count) = patch.review_count {
            self.review_count = count;
        }
        if let Some(amenities) = patch.amenities {
            self.amenities = amenities;
        }
        if let Some(open) = patch.open_time {
            self.open_time = open;
        }
        if let Some(close) = patch.close_time {
            self.close_time = close;
        }
        if let Some(featured) = patch.featured {
            self.featured = featured;
        }
    }

    /// Returns the fields of this turf as a draft (for re-validation).
    pub fn to_draft(&self) -> TurfDraft {
        TurfDraft {
            name: self.name.clone(),
            city: self.city.clone(),
            address: self.address.clone(),
            sports: self.sports.clone(),
            price_per_hour: self.price_per_hour,
            rating: self.rating,
            review_count: self.review_count,
            amenities: self.amenities.clone(),
            open_time: self.open_time.clone(),
            close_time: self.close_time.clone(),
            featured: self.featured,
        }
    }
}

/// Operator input for a new turf (everything except the id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TurfDraft {
    pub name: String,
    pub city: String,
    pub address: String,
    pub sports: Vec<Sport>,
    pub price_per_hour: i64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub open_time: String,
    pub close_time: String,
    #[serde(default)]
    pub featured: bool,
}

/// Partial turf update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TurfPatch {
    pub name: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub sports: Option<Vec<Sport>>,
    pub price_per_hour: Option<i64>,
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    pub amenities: Option<Vec<String>>,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub featured: Option<bool>,
}

// =============================================================================
// Time Slot
// =============================================================================

/// One bookable hour of a turf on a date.
///
/// Derived on every catalog query and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TimeSlot {
    /// `slot-<hour>`, hour counted from the start of the booking date.
    #[ts(as = "String")]
    pub id: SlotId,

    /// Start time for display, "HH:00".
    pub time: String,

    /// False when past the cutoff or claimed by an active booking.
    pub available: bool,

    /// Price for this hour.
    pub price: i64,
}

// =============================================================================
// Booking Status
// =============================================================================

/// The lifecycle status of a booking.
///
/// Transition rules live in [`crate::lifecycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Awaiting operator approval.
    Pending,
    /// Approved; the slots are held.
    Confirmed,
    /// Cancelled by customer or operator. Terminal.
    Cancelled,
    /// Played; the booking's time has elapsed. Terminal.
    Completed,
}

impl BookingStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [BookingStatus; 4] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Cancelled,
        BookingStatus::Completed,
    ];

    /// Lowercase wire name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    /// Active bookings hold their slots against other requests.
    pub const fn holds_slots(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    /// No transition leaves a terminal status.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }
}

impl Default for BookingStatus {
    fn default() -> Self {
        BookingStatus::Pending
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: BookingStatus::ALL.iter().map(|s| s.to_string()).collect(),
            })
    }
}

// =============================================================================
// Booking
// =============================================================================

/// Contact details captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BookingContact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// A reservation of one or more hourly slots on one date for one turf.
///
/// Uses the snapshot pattern for `turf_name`: the name is frozen at
/// creation so the booking still displays after the turf is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Booking {
    pub id: String,
    pub turf_id: String,
    /// Registered user id or a transient guest id.
    pub user_id: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    /// Ascending, no duplicates.
    #[ts(as = "Vec<String>")]
    pub slots: Vec<SlotId>,
    pub sport: Sport,
    /// Price before discount.
    pub subtotal_amount: i64,
    /// Discount applied for the slot count.
    pub discount_amount: i64,
    /// Amount payable. Immutable once set.
    pub total_amount: i64,
    pub status: BookingStatus,
    /// Turf name at time of booking (frozen).
    pub turf_name: String,
    pub contact: Option<BookingContact>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Returns the payable total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::new(self.total_amount)
    }

    /// Moment the last booked hour ends (naive local time).
    ///
    /// A booking with no slots ends at the start of its date.
    pub fn ends_at(&self) -> NaiveDateTime {
        let start_of_day = self.date.and_time(chrono::NaiveTime::MIN);
        let end_hour = self
            .slots
            .iter()
            .map(|slot| i64::from(slot.hour()) + 1)
            .max()
            .unwrap_or(0);
        start_of_day + Duration::hours(end_hour)
    }

    /// Checks whether every booked hour is over at `now`.
    pub fn has_elapsed(&self, now: NaiveDateTime) -> bool {
        self.ends_at() <= now
    }
}

// =============================================================================
// User
// =============================================================================

/// Access role. Enforcement is the surrounding application's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Operator,
}

impl Default for Role {
    fn default() -> Self {
        Role::Customer
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Customer => f.write_str("customer"),
            Role::Operator => f.write_str("operator"),
        }
    }
}

/// A registered person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_operator(&self) -> bool {
        self.role == Role::Operator
    }
}

// =============================================================================
// City
// =============================================================================

/// Read-only reference data for city pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct City {
    pub id: String,
    pub name: String,
    /// Denormalized listing count, not recomputed by the store.
    pub turf_count: u32,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_turf() -> Turf {
        Turf {
            id: "turf-1".to_string(),
            name: "Green Arena".to_string(),
            city: "Mumbai".to_string(),
            address: "Andheri West".to_string(),
            sports: vec![Sport::Football],
            price_per_hour: 1500,
            rating: 4.8,
            review_count: 234,
            amenities: vec!["Parking".to_string()],
            open_time: "06:00".to_string(),
            close_time: "23:00".to_string(),
            featured: true,
        }
    }

    #[test]
    fn test_sport_parsing() {
        assert_eq!("Cricket".parse::<Sport>().unwrap(), Sport::Cricket);
        assert_eq!(" football ".parse::<Sport>().unwrap(), Sport::Football);
        assert!("tennis".parse::<Sport>().is_err());
    }

    #[test]
    fn test_status_flags() {
        assert!(BookingStatus::Pending.holds_slots());
        assert!(BookingStatus::Confirmed.holds_slots());
        assert!(!BookingStatus::Cancelled.holds_slots());
        assert!(BookingStatus::Completed.is_terminal());
        assert!(!BookingStatus::Confirmed.is_terminal());
        assert_eq!(BookingStatus::default(), BookingStatus::Pending);
        assert_eq!("confirmed".parse::<BookingStatus>().unwrap(), BookingStatus::Confirmed);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&BookingStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
    }

    #[test]
    fn test_turf_patch_keeps_id() {
        let mut turf = sample_turf();
        turf.apply(TurfPatch {
            name: Some("Green Arena 2".to_string()),
            price_per_hour: Some(1700),
            ..Default::default()
        });

        assert_eq!(turf.id, "turf-1");
        assert_eq!(turf.name, "Green Arena 2");
        assert_eq!(turf.price().amount(), 1700);
        assert_eq!(turf.city, "Mumbai");
    }

    #[test]
    fn test_booking_end_time() {
        let date = NaiveDate::from_ymd_opt(2030, 5, 1).unwrap();
        let now = Utc::now();
        let booking = Booking {
            id: "b-1".to_string(),
            turf_id: "turf-1".to_string(),
            user_id: "u-1".to_string(),
            date,
            slots: vec![SlotId::new(18), SlotId::new(19)],
            sport: Sport::Football,
            subtotal_amount: 3000,
            discount_amount: 300,
            total_amount: 2700,
            status: BookingStatus::Confirmed,
            turf_name: "Green Arena".to_string(),
            contact: None,
            created_at: now,
            updated_at: now,
        };

        let end = date.and_hms_opt(20, 0, 0).unwrap();
        assert_eq!(booking.ends_at(), end);
        assert!(booking.has_elapsed(end));
        assert!(!booking.has_elapsed(end - Duration::minutes(1)));
    }

    #[test]
    fn test_turf_window() {
        let window = sample_turf().window().unwrap();
        assert_eq!(window.open_hour(), 6);
        assert_eq!(window.close_hour(), 23);
        assert!(sample_turf().supports(Sport::Football));
        assert!(!sample_turf().supports(Sport::Cricket));
    }
}
