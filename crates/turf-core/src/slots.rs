//! # Slot Catalog
//!
//! Derives the bookable hourly slots of a turf on a date.
//!
//! ## Slot Numbering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  A slot is identified by its start hour counted from 00:00 of the      │
//! │  booking date. Windows that close at or past midnight keep counting:   │
//! │                                                                         │
//! │  open 06:00, close 22:00   →  slot-6 … slot-22        (17 slots)       │
//! │  open 05:00, close 00:00   →  slot-5 … slot-24        (20 slots)       │
//! │  open 18:00, close 02:00   →  slot-18 … slot-26       ( 9 slots)       │
//! │                                                                         │
//! │  Count is always (close - open) mod 24 + 1 and ids strictly ascend.    │
//! │  slot-24 displays as "00:00" (the first hour after midnight).          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Availability
//! A slot is unavailable when it has started at or before the current hour
//! (past cutoff) or when an active booking already claims it.
//!
//! ## Usage
//! ```rust
//! use chrono::NaiveDate;
//! use turf_core::slots::{OperatingWindow, SlotCatalog, SlotId};
//! use turf_core::money::Money;
//!
//! let window = OperatingWindow::from_hours(6, 22);
//! let date = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
//! let now = NaiveDate::from_ymd_opt(2029, 12, 31).unwrap().and_hms_opt(9, 0, 0).unwrap();
//!
//! let catalog = SlotCatalog::new(window, Money::new(1000), date, now)
//!     .with_claimed([SlotId::new(18)]);
//!
//! assert_eq!(catalog.iter().count(), 17);
//! assert_eq!(catalog.iter().filter(|s| !s.available).count(), 1);
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{TimeSlot, Turf};
use crate::validation::parse_clock_time;

/// Hours in a day.
const DAY_HOURS: u8 = 24;

// =============================================================================
// Slot Id
// =============================================================================

/// Identifies one hourly slot within a booking date.
///
/// Serialized as `"slot-<hour>"`; deserializes from that form or from the
/// bare hour number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct SlotId(u8);

impl SlotId {
    /// Creates a slot id for the given start hour.
    #[inline]
    pub const fn new(hour: u8) -> Self {
        SlotId(hour)
    }

    /// Start hour counted from 00:00 of the booking date (may exceed 23).
    #[inline]
    pub const fn hour(&self) -> u8 {
        self.0
    }

    /// Wall-clock start time, e.g. "18:00" or "00:00" for slot-24.
    pub fn display_time(&self) -> String {
        format!("{:02}:00", self.0 % DAY_HOURS)
    }

    /// Start of this slot on `date`.
    pub fn starts_at(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(NaiveTime::MIN) + Duration::hours(i64::from(self.0))
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot-{}", self.0)
    }
}

/// Accepts both `"slot-18"` and the bare hour `"18"`.
impl FromStr for SlotId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let hour = raw.strip_prefix("slot-").unwrap_or(raw);

        hour.parse::<u8>()
            .ok()
            .and_then(|h| SlotId::try_from(h).ok())
            .ok_or_else(|| {
                ValidationError::invalid_format("slot", format!("'{}' is not a slot id", s))
            })
    }
}

impl From<SlotId> for String {
    fn from(slot: SlotId) -> Self {
        slot.to_string()
    }
}

impl TryFrom<u8> for SlotId {
    type Error = ValidationError;

    fn try_from(hour: u8) -> Result<Self, Self::Error> {
        if hour < DAY_HOURS * 2 {
            Ok(SlotId(hour))
        } else {
            Err(ValidationError::OutOfRange {
                field: "slot".to_string(),
                min: 0,
                max: i64::from(DAY_HOURS * 2 - 1),
            })
        }
    }
}

impl<'de> Deserialize<'de> for SlotId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Hour(u8),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Hour(hour) => SlotId::try_from(hour).map_err(de::Error::custom),
            Raw::Text(text) => text.parse().map_err(de::Error::custom),
        }
    }
}

// =============================================================================
// Operating Window
// =============================================================================

/// The inclusive range of bookable start hours for a turf.
///
/// `close_hour` is normalized so that it is never below `open_hour`:
/// a closing time numerically before the opening time belongs to the
/// next day and is shifted by 24.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatingWindow {
    open: u8,
    close: u8,
}

impl OperatingWindow {
    /// Builds a window from 24-hour clock hours (0-23).
    pub fn from_hours(open: u8, close: u8) -> Self {
        let open = open % DAY_HOURS;
        let close = close % DAY_HOURS;
        let close = if close < open { close + DAY_HOURS } else { close };
        OperatingWindow { open, close }
    }

    /// Parses "HH:MM" opening and closing times. Times must be on the hour.
    pub fn from_times(open: &str, close: &str) -> CoreResult<Self> {
        let open = whole_hour("open_time", open)?;
        let close = whole_hour("close_time", close)?;
        Ok(Self::from_hours(open, close))
    }

    /// First bookable start hour.
    #[inline]
    pub const fn open_hour(&self) -> u8 {
        self.open
    }

    /// Last bookable start hour (may exceed 23).
    #[inline]
    pub const fn close_hour(&self) -> u8 {
        self.close
    }

    /// Number of slots in the window.
    #[inline]
    pub const fn len(&self) -> usize {
        (self.close - self.open) as usize + 1
    }

    /// A window always has at least one slot.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Checks whether `slot` starts inside the window.
    pub fn contains(&self, slot: SlotId) -> bool {
        (self.open..=self.close).contains(&slot.hour())
    }

    /// Every slot id in the window, ascending.
    pub fn slot_ids(&self) -> impl Iterator<Item = SlotId> + Clone {
        (self.open..=self.close).map(SlotId)
    }
}

fn whole_hour(field: &str, time: &str) -> CoreResult<u8> {
    let (hour, minute) = parse_clock_time(field, time)?;
    if minute != 0 {
        return Err(ValidationError::invalid_format(field, "must be on the hour").into());
    }
    Ok(hour)
}

// =============================================================================
// Slot Catalog
// =============================================================================

/// The slot view of one turf on one date, as of `now`.
///
/// Holds only what availability depends on, so it can be iterated any
/// number of times without touching the store again.
#[derive(Debug, Clone)]
pub struct SlotCatalog {
    window: OperatingWindow,
    price: Money,
    date: NaiveDate,
    cutoff: NaiveDateTime,
    claimed: BTreeSet<SlotId>,
}

impl SlotCatalog {
    /// Creates a catalog with no claimed slots.
    ///
    /// `now` is the caller's local wall-clock time; only its date and hour
    /// matter.
    pub fn new(window: OperatingWindow, price: Money, date: NaiveDate, now: NaiveDateTime) -> Self {
        SlotCatalog {
            window,
            price,
            date,
            cutoff: next_hour_boundary(now),
            claimed: BTreeSet::new(),
        }
    }

    /// Creates a catalog from a turf's hours and price.
    pub fn for_turf(turf: &Turf, date: NaiveDate, now: NaiveDateTime) -> CoreResult<Self> {
        Ok(Self::new(turf.window()?, turf.price(), date, now))
    }

    /// Marks slots held by active bookings.
    pub fn with_claimed(mut self, claimed: impl IntoIterator<Item = SlotId>) -> Self {
        self.claimed.extend(claimed);
        self
    }

    pub fn window(&self) -> OperatingWindow {
        self.window
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// True when the slot has already started by the current hour.
    pub fn is_past(&self, slot: SlotId) -> bool {
        slot.starts_at(self.date) < self.cutoff
    }

    pub fn is_claimed(&self, slot: SlotId) -> bool {
        self.claimed.contains(&slot)
    }

    /// Checks that a requested slot exists in the window and has not passed.
    ///
    /// Claims are not checked here; conflict detection belongs to the store.
    pub fn check_bookable(&self, turf_id: &str, slot: SlotId) -> CoreResult<()> {
        let reason = if !self.window.contains(slot) {
            "outside operating hours"
        } else if self.is_past(slot) {
            "start time has passed"
        } else {
            return Ok(());
        };

        Err(CoreError::SlotNotBookable {
            turf_id: turf_id.to_string(),
            slot,
            reason: reason.to_string(),
        })
    }

    /// Iterates the slots in ascending order. Restartable: call again.
    pub fn iter(&self) -> Slots<'_> {
        Slots {
            catalog: self,
            next: self.window.open,
            end: self.window.close + 1,
        }
    }

    /// Collects the slots into a vector.
    pub fn to_vec(&self) -> Vec<TimeSlot> {
        self.iter().collect()
    }

    fn slot(&self, slot: SlotId) -> TimeSlot {
        TimeSlot {
            id: slot,
            time: slot.display_time(),
            available: !self.is_past(slot) && !self.is_claimed(slot),
            price: self.price.amount(),
        }
    }
}

impl<'a> IntoIterator for &'a SlotCatalog {
    type Item = TimeSlot;
    type IntoIter = Slots<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy iterator over a catalog's slots.
#[derive(Debug, Clone)]
pub struct Slots<'a> {
    catalog: &'a SlotCatalog,
    next: u8,
    end: u8,
}

impl Iterator for Slots<'_> {
    type Item = TimeSlot;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let slot = SlotId(self.next);
        self.next += 1;
        Some(self.catalog.slot(slot))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end.saturating_sub(self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Slots<'_> {}

/// Start of the hour after `now`. Slots starting before it are past.
fn next_hour_boundary(now: NaiveDateTime) -> NaiveDateTime {
    let hour_start = now.date().and_time(NaiveTime::MIN) + Duration::hours(i64::from(now.hour()));
    hour_start + Duration::hours(1)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 6, d).unwrap()
    }

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        day(d).and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_slot_id_parsing() {
        assert_eq!("slot-18".parse::<SlotId>().unwrap(), SlotId::new(18));
        assert_eq!("7".parse::<SlotId>().unwrap(), SlotId::new(7));
        assert!("slot-x".parse::<SlotId>().is_err());
        assert!("slot-48".parse::<SlotId>().is_err());
        assert_eq!(SlotId::new(24).display_time(), "00:00");
        assert_eq!(SlotId::new(9).to_string(), "slot-9");
    }

    #[test]
    fn test_slot_id_serializes_as_string() {
        let json = serde_json::to_string(&SlotId::new(18)).unwrap();
        assert_eq!(json, "\"slot-18\"");
        let back: SlotId = serde_json::from_str("\"slot-19\"").unwrap();
        assert_eq!(back, SlotId::new(19));

        let bare: Vec<SlotId> = serde_json::from_str("[18, \"19\"]").unwrap();
        assert_eq!(bare, vec![SlotId::new(18), SlotId::new(19)]);
        assert!(serde_json::from_str::<SlotId>("99").is_err());
    }

    #[test]
    fn test_window_regular_hours() {
        let window = OperatingWindow::from_times("06:00", "22:00").unwrap();
        assert_eq!(window.len(), 17);
        assert!(window.contains(SlotId::new(6)));
        assert!(window.contains(SlotId::new(22)));
        assert!(!window.contains(SlotId::new(23)));
    }

    #[test]
    fn test_window_closing_at_midnight() {
        let window = OperatingWindow::from_times("05:00", "00:00").unwrap();
        assert_eq!(window.open_hour(), 5);
        assert_eq!(window.close_hour(), 24);
        assert_eq!(window.len(), 20);
    }

    #[test]
    fn test_window_rejects_half_hours() {
        assert!(OperatingWindow::from_times("06:30", "22:00").is_err());
        assert!(OperatingWindow::from_times("6am", "22:00").is_err());
    }

    #[test]
    fn test_today_past_cutoff() {
        let window = OperatingWindow::from_hours(6, 22);
        let catalog = SlotCatalog::new(window, Money::new(1000), day(10), at(10, 14, 30));

        let slots = catalog.to_vec();
        // 06..=14 are past, 15..=22 open
        assert!(slots.iter().filter(|s| s.id.hour() <= 14).all(|s| !s.available));
        assert!(slots.iter().filter(|s| s.id.hour() > 14).all(|s| s.available));
    }

    #[test]
    fn test_past_date_is_fully_unavailable() {
        let window = OperatingWindow::from_hours(6, 22);
        let catalog = SlotCatalog::new(window, Money::new(1000), day(9), at(10, 8, 0));
        assert!(catalog.iter().all(|s| !s.available));
    }

    #[test]
    fn test_claimed_slots_unavailable() {
        let window = OperatingWindow::from_hours(6, 22);
        let catalog = SlotCatalog::new(window, Money::new(1200), day(12), at(10, 8, 0))
            .with_claimed([SlotId::new(18), SlotId::new(19)]);

        let taken: Vec<_> = catalog.iter().filter(|s| !s.available).map(|s| s.id).collect();
        assert_eq!(taken, vec![SlotId::new(18), SlotId::new(19)]);
        assert!(catalog.iter().all(|s| s.price == 1200));
    }

    #[test]
    fn test_iteration_is_restartable() {
        let catalog = SlotCatalog::new(
            OperatingWindow::from_hours(6, 8),
            Money::new(500),
            day(12),
            at(10, 8, 0),
        );
        let first: Vec<_> = catalog.iter().collect();
        let second: Vec<_> = (&catalog).into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(catalog.iter().len(), 3);
    }

    #[test]
    fn test_check_bookable() {
        let catalog = SlotCatalog::new(
            OperatingWindow::from_hours(6, 22),
            Money::new(1000),
            day(10),
            at(10, 12, 0),
        );

        assert!(catalog.check_bookable("t", SlotId::new(13)).is_ok());
        assert!(matches!(
            catalog.check_bookable("t", SlotId::new(12)),
            Err(CoreError::SlotNotBookable { .. })
        ));
        assert!(matches!(
            catalog.check_bookable("t", SlotId::new(23)),
            Err(CoreError::SlotNotBookable { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_slot_count_and_order(open in 0u8..24, close in 0u8..24) {
            let window = OperatingWindow::from_hours(open, close);
            let catalog = SlotCatalog::new(window, Money::new(1000), day(20), at(10, 9, 0));
            let slots = catalog.to_vec();

            let expected = ((close as i32 - open as i32).rem_euclid(24) + 1) as usize;
            prop_assert_eq!(slots.len(), expected);
            prop_assert!(slots.windows(2).all(|w| w[0].id < w[1].id));
        }

        #[test]
        fn prop_future_dates_have_no_past_slots(
            open in 0u8..24,
            close in 0u8..24,
            now_hour in 0u32..24,
            days_ahead in 1u32..10,
        ) {
            let window = OperatingWindow::from_hours(open, close);
            let catalog = SlotCatalog::new(
                window,
                Money::new(800),
                day(10 + days_ahead),
                at(10, now_hour, 59),
            );
            prop_assert!(catalog.iter().all(|s| s.available));
        }
    }
}
