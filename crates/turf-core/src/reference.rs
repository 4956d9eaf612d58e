//! # Reference Data
//!
//! The launch cities, turfs and sample bookings a fresh store is seeded
//! with.
//!
//! City turf counts are marketing figures and are not derived from the
//! turf list. Sample bookings are priced with the live pricing rules, so
//! their amounts always agree with [`crate::pricing::compute_price`].

use chrono::{DateTime, NaiveDate, Utc};

use crate::pricing::compute_price;
use crate::slots::SlotId;
use crate::types::{Booking, BookingContact, BookingStatus, City, Sport, Turf};

fn city(id: &str, name: &str, turf_count: u32) -> City {
    City {
        id: id.to_string(),
        name: name.to_string(),
        turf_count,
    }
}

/// Cities shown in the city picker.
pub fn cities() -> Vec<City> {
    vec![
        city("mumbai", "Mumbai", 24),
        city("delhi", "Delhi", 18),
        city("bangalore", "Bangalore", 31),
        city("chennai", "Chennai", 15),
        city("hyderabad", "Hyderabad", 22),
        city("pune", "Pune", 19),
    ]
}

#[allow(clippy::too_many_arguments)]
fn turf(
    id: &str,
    name: &str,
    city: &str,
    locality: &str,
    sports: &[Sport],
    price_per_hour: i64,
    (rating, review_count): (f64, u32),
    amenities: &[&str],
    (open_time, close_time): (&str, &str),
    featured: bool,
) -> Turf {
    Turf {
        id: id.to_string(),
        name: name.to_string(),
        city: city.to_string(),
        address: format!("{}, {}", locality, city),
        sports: sports.to_vec(),
        price_per_hour,
        rating,
        review_count,
        amenities: amenities.iter().map(|a| a.to_string()).collect(),
        open_time: open_time.to_string(),
        close_time: close_time.to_string(),
        featured,
    }
}

/// Launch turfs with their fixed ids (`turf-1` … `turf-6`).
pub fn turfs() -> Vec<Turf> {
    use Sport::{Cricket, Football};

    vec![
        turf(
            "turf-1",
            "Green Arena Sports Complex",
            "Mumbai",
            "Andheri West",
            &[Football, Cricket],
            1500,
            (4.8, 234),
            &["Floodlights", "Parking", "Changing Rooms", "Cafeteria"],
            ("06:00", "23:00"),
            true,
        ),
        turf(
            "turf-2",
            "Premier Turf Club",
            "Mumbai",
            "Powai",
            &[Football],
            1800,
            (4.9, 156),
            &["Floodlights", "Parking", "Changing Rooms", "Equipment Rental"],
            ("05:00", "22:00"),
            true,
        ),
        turf(
            "turf-3",
            "Cricket Pitch Pro",
            "Delhi",
            "Dwarka",
            &[Cricket],
            2000,
            (4.7, 189),
            &["Floodlights", "Parking", "Practice Nets", "Coaching"],
            ("06:00", "21:00"),
            true,
        ),
        turf(
            "turf-4",
            "Sports Hub Bangalore",
            "Bangalore",
            "Koramangala",
            &[Football, Cricket],
            1600,
            (4.6, 312),
            &["Floodlights", "Parking", "Changing Rooms", "Refreshments"],
            ("06:00", "23:00"),
            false,
        ),
        turf(
            "turf-5",
            "Elite Football Arena",
            "Bangalore",
            "Indiranagar",
            &[Football],
            2200,
            (4.9, 445),
            &["Floodlights", "Parking", "VIP Lounge", "Pro Equipment"],
            ("05:00", "00:00"),
            true,
        ),
        turf(
            "turf-6",
            "Chennai Cricket Ground",
            "Chennai",
            "Adyar",
            &[Cricket],
            1400,
            (4.5, 178),
            &["Floodlights", "Parking", "Practice Nets"],
            ("06:00", "22:00"),
            false,
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn booking(
    id: &str,
    turf: &Turf,
    user_id: &str,
    date: &str,
    hours: &[u8],
    sport: Sport,
    status: BookingStatus,
    created_at: &str,
    (name, email, phone): (&str, &str, &str),
) -> Option<Booking> {
    let quote = compute_price(turf.price(), hours.len() as i64).ok()?;
    let created_at: DateTime<Utc> = created_at.parse().ok()?;

    Some(Booking {
        id: id.to_string(),
        turf_id: turf.id.clone(),
        user_id: user_id.to_string(),
        date: date.parse::<NaiveDate>().ok()?,
        slots: hours.iter().map(|h| SlotId::new(*h)).collect(),
        sport,
        subtotal_amount: quote.subtotal.amount(),
        discount_amount: quote.discount_amount.amount(),
        total_amount: quote.total.amount(),
        status,
        turf_name: turf.name.clone(),
        contact: Some(BookingContact {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        }),
        created_at,
        updated_at: created_at,
    })
}

/// Sample bookings (`booking-1` … `booking-5`), one or more per status, so
/// admin views have data on a fresh store. All dates are in the past.
pub fn bookings() -> Vec<Booking> {
    use BookingStatus::{Cancelled, Completed, Confirmed, Pending};
    use Sport::{Cricket, Football};

    let turfs = turfs();
    let by_id = |id: &str| turfs.iter().find(|t| t.id == id);

    [
        by_id("turf-1").and_then(|t| {
            booking(
                "booking-1",
                t,
                "user-1",
                "2024-12-10",
                &[18, 19],
                Football,
                Confirmed,
                "2024-12-08T10:30:00Z",
                ("Rahul Sharma", "rahul@example.com", "+91 98765 43210"),
            )
        }),
        by_id("turf-2").and_then(|t| {
            booking(
                "booking-2",
                t,
                "user-2",
                "2024-12-11",
                &[9, 10, 11],
                Football,
                Pending,
                "2024-12-08T14:15:00Z",
                ("Priya Patel", "priya@example.com", "+91 87654 32109"),
            )
        }),
        by_id("turf-3").and_then(|t| {
            booking(
                "booking-3",
                t,
                "user-3",
                "2024-12-12",
                &[10, 11],
                Cricket,
                Confirmed,
                "2024-12-07T09:00:00Z",
                ("Amit Kumar", "amit@example.com", "+91 76543 21098"),
            )
        }),
        by_id("turf-4").and_then(|t| {
            booking(
                "booking-4",
                t,
                "user-4",
                "2024-12-09",
                &[17, 18, 19, 20],
                Football,
                Completed,
                "2024-12-05T16:45:00Z",
                ("Sneha Reddy", "sneha@example.com", "+91 65432 10987"),
            )
        }),
        by_id("turf-1").and_then(|t| {
            booking(
                "booking-5",
                t,
                "user-5",
                "2024-12-08",
                &[6, 7],
                Cricket,
                Cancelled,
                "2024-12-04T11:20:00Z",
                ("Vikram Singh", "vikram@example.com", "+91 54321 09876"),
            )
        }),
    ]
    .into_iter()
    .flatten()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_turf_draft;

    #[test]
    fn test_reference_turfs_are_valid() {
        for turf in turfs() {
            assert!(validate_turf_draft(&turf.to_draft()).is_ok(), "{}", turf.id);
            assert!(turf.window().is_ok(), "{}", turf.id);
        }
    }

    #[test]
    fn test_midnight_close_turf() {
        let elite = turfs().into_iter().find(|t| t.id == "turf-5").unwrap();
        assert_eq!(elite.window().unwrap().len(), 20);
    }

    #[test]
    fn test_sample_bookings() {
        let bookings = bookings();
        assert_eq!(bookings.len(), 5);

        let totals: Vec<i64> = bookings.iter().map(|b| b.total_amount).collect();
        assert_eq!(totals, vec![2700, 4590, 3600, 5120, 2700]);

        let counts = crate::query::StatusCounts::tally(&bookings);
        assert_eq!(
            (counts.pending, counts.confirmed, counts.completed, counts.cancelled),
            (1, 2, 1, 1)
        );

        for booking in &bookings {
            let turf = turfs().into_iter().find(|t| t.id == booking.turf_id).unwrap();
            assert!(turf.supports(booking.sport), "{}", booking.id);
            assert!(booking.slots.iter().all(|s| turf.window().unwrap().contains(*s)));
            assert!(crate::validation::validate_contact(booking.contact.as_ref().unwrap()).is_ok());
        }
    }

    #[test]
    fn test_cities() {
        let cities = cities();
        assert_eq!(cities.len(), 6);
        assert!(cities.iter().any(|c| c.id == "bangalore" && c.turf_count == 31));
    }
}
