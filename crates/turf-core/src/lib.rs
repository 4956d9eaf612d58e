//! # turf-core: Pure Reservation Logic for Turfbook
//!
//! This crate is the **heart** of Turfbook. It contains the reservation
//! rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Turfbook Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 UI / HTTP layer (external)                      │   │
//! │  │    Turf list ──► Slot picker ──► Price quote ──► Checkout       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 turf-store (Reservation Store)                  │   │
//! │  │    locking, conflict checks, notifications, identity            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ turf-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   slots   │  │  pricing  │  │ lifecycle │  │ validation│  │   │
//! │  │   │  catalog  │  │   tiers   │  │  status   │  │   rules   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK • NO LOCKS • PURE FUNCTIONS                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Turf, Booking, User, City, ...)
//! - [`money`] - Integer money and basis-point discount rates
//! - [`slots`] - Slot Catalog: bookable hours for a turf on a date
//! - [`pricing`] - Pricing Engine: discount tiers and totals
//! - [`lifecycle`] - Booking State Machine
//! - [`query`] - Search filters and aggregate counts for admin views
//! - [`validation`] - Business rule validation
//! - [`reference`] - Reference cities and turfs used for seeding
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use turf_core::money::Money;
//! use turf_core::pricing::compute_price;
//!
//! let quote = compute_price(Money::new(1000), 2).unwrap();
//! assert_eq!(quote.subtotal.amount(), 2000);
//! assert_eq!(quote.discount_rate.percent(), 10);
//! assert_eq!(quote.total.amount(), 1800);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod lifecycle;
pub mod money;
pub mod pricing;
pub mod query;
pub mod reference;
pub mod slots;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use lifecycle::Transition;
pub use money::{DiscountRate, Money};
pub use pricing::{compute_price, PriceQuote};
pub use query::{BookingFilter, DashboardStats, StatusCounts, TurfFilter};
pub use slots::{OperatingWindow, SlotCatalog, SlotId};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Upper bound on slots in a single booking when no policy overrides it.
///
/// A turf can never expose more than 24 start hours in one operating day.
pub const MAX_SLOTS_PER_BOOKING: usize = 24;

/// Highest hourly rate a turf may charge, in whole rupees.
pub const MAX_PRICE_PER_HOUR: i64 = 1_000_000;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;
