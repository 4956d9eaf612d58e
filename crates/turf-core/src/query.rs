//! # Admin Queries
//!
//! Filters and aggregates over turf and booking collections. Pure
//! functions: the store hands in a consistent snapshot and gets owned
//! results back.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Booking, BookingStatus, Turf};
use crate::validation::{validate_search_query, ValidationResult};

/// Case-insensitive substring match. An empty needle matches everything.
fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    needle_lower.is_empty() || haystack.to_lowercase().contains(needle_lower)
}

// =============================================================================
// Booking Search
// =============================================================================

/// Booking list filter for the admin bookings view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BookingFilter {
    /// Matched against booking id, turf name and contact name.
    #[serde(default)]
    pub query: String,
    pub status: Option<BookingStatus>,
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        if let Some(status) = self.status {
            if booking.status != status {
                return false;
            }
        }

        let needle = self.query.trim().to_lowercase();
        contains_ci(&booking.id, &needle)
            || contains_ci(&booking.turf_name, &needle)
            || booking
                .contact
                .as_ref()
                .is_some_and(|c| contains_ci(&c.name, &needle))
    }
}

/// Matching bookings, newest first.
///
/// Fails when the query text is too long.
pub fn search_bookings<'a>(
    bookings: impl IntoIterator<Item = &'a Booking>,
    filter: &BookingFilter,
) -> ValidationResult<Vec<Booking>> {
    let filter = BookingFilter {
        query: validate_search_query(&filter.query)?,
        status: filter.status,
    };

    let mut found: Vec<Booking> = bookings
        .into_iter()
        .filter(|b| filter.matches(b))
        .cloned()
        .collect();
    found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    Ok(found)
}

/// Booking counts per status, plus the overall total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatusCounts {
    pub all: usize,
    pub pending: usize,
    pub confirmed: usize,
    pub completed: usize,
    pub cancelled: usize,
}

impl StatusCounts {
    pub fn tally<'a>(bookings: impl IntoIterator<Item = &'a Booking>) -> Self {
        bookings
            .into_iter()
            .fold(StatusCounts::default(), |mut counts, booking| {
                counts.all += 1;
                match booking.status {
                    BookingStatus::Pending => counts.pending += 1,
                    BookingStatus::Confirmed => counts.confirmed += 1,
                    BookingStatus::Completed => counts.completed += 1,
                    BookingStatus::Cancelled => counts.cancelled += 1,
                }
                counts
            })
    }
}

// =============================================================================
// Turf Search
// =============================================================================

/// Turf list filter for the admin turfs view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TurfFilter {
    /// Matched against turf name and address.
    #[serde(default)]
    pub query: String,
    /// Exact city name.
    pub city: Option<String>,
}

impl TurfFilter {
    pub fn matches(&self, turf: &Turf) -> bool {
        if let Some(city) = &self.city {
            if &turf.city != city {
                return false;
            }
        }

        let needle = self.query.trim().to_lowercase();
        contains_ci(&turf.name, &needle) || contains_ci(&turf.address, &needle)
    }
}

/// Matching turfs in their stored order. Fails when the query text is too
/// long.
pub fn search_turfs<'a>(
    turfs: impl IntoIterator<Item = &'a Turf>,
    filter: &TurfFilter,
) -> ValidationResult<Vec<Turf>> {
    let filter = TurfFilter {
        query: validate_search_query(&filter.query)?,
        city: filter.city.clone(),
    };

    Ok(turfs
        .into_iter()
        .filter(|t| filter.matches(t))
        .cloned()
        .collect())
}

/// Distinct city names across `turfs`, sorted.
pub fn turf_cities<'a>(turfs: impl IntoIterator<Item = &'a Turf>) -> Vec<String> {
    turfs
        .into_iter()
        .map(|t| t.city.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// =============================================================================
// Dashboard
// =============================================================================

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardStats {
    pub total_turfs: usize,
    pub total_bookings: usize,
    pub pending_bookings: usize,
    /// Sum of totals over confirmed and completed bookings.
    pub revenue: Money,
}

impl DashboardStats {
    pub fn compute(turfs: &[Turf], bookings: &[Booking]) -> Self {
        let revenue = bookings
            .iter()
            .filter(|b| matches!(b.status, BookingStatus::Confirmed | BookingStatus::Completed))
            .map(Booking::total)
            .sum();

        DashboardStats {
            total_turfs: turfs.len(),
            total_bookings: bookings.len(),
            pending_bookings: bookings
                .iter()
                .filter(|b| b.status == BookingStatus::Pending)
                .count(),
            revenue,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
