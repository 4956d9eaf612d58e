//! # Money Module
//!
//! Provides the `Money` type for monetary values and `DiscountRate` for
//! percentage reductions.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    1500 × 3 × 0.85 = 3824.9999999999995  ❌ WRONG!                      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer units + basis points                             │
//! │    4500 × 1500 bps = 675 (exact, integer division with rounding)       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Turf prices are whole currency units (₹1000/hr), so one unit is the
//! smallest currency unit and every rounding step lands on it.
//!
//! ## Usage
//! ```rust
//! use turf_core::money::{DiscountRate, Money};
//!
//! let hourly = Money::new(1000);
//! let subtotal = hourly.multiply_quantity(2);
//! let discount = subtotal.portion(DiscountRate::from_bps(1000));
//! assert_eq!((subtotal - discount).amount(), 1800);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

/// Basis points in 100%.
const BPS_SCALE: i128 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole currency units.
///
/// ## Design Decisions
/// - **i64 (signed)**: Differences (subtotal - discount) stay in-type
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money is Used
/// ```text
/// Turf.price_per_hour ──► TimeSlot.price
///        │
///        └──► PriceQuote.subtotal ──► discount ──► PriceQuote.total
///                                                      │
///                                                      ▼
///                                           Booking.total_amount
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole currency units.
    ///
    /// ## Example
    /// ```rust
    /// use turf_core::money::Money;
    ///
    /// let price = Money::new(1500);
    /// assert_eq!(price.amount(), 1500);
    /// ```
    #[inline]
    pub const fn new(amount: i64) -> Self {
        Money(amount)
    }

    /// Returns the value in currency units.
    #[inline]
    pub const fn amount(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Multiplies money by a quantity (hours, slots).
    ///
    /// ## Example
    /// ```rust
    /// use turf_core::money::Money;
    ///
    /// let hourly = Money::new(1800);
    /// assert_eq!(hourly.multiply_quantity(3).amount(), 5400);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Like [`Self::multiply_quantity`], but `None` on overflow.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(amount) => Some(Money(amount)),
            None => None,
        }
    }

    /// Returns `rate` of this amount, rounded half up to the nearest unit.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`.
    /// The +5000 is half of the scale, so .5 rounds up.
    ///
    /// ## Example
    /// ```rust
    /// use turf_core::money::{DiscountRate, Money};
    ///
    /// // 15% of 4590 = 688.5 → 689
    /// let cut = Money::new(4590).portion(DiscountRate::from_bps(1500));
    /// assert_eq!(cut.amount(), 689);
    /// ```
    pub fn portion(&self, rate: DiscountRate) -> Money {
        // i128 so large subtotals cannot overflow before the division
        let scaled = self.0 as i128 * rate.bps() as i128;
        let rounded = (scaled + BPS_SCALE / 2).div_euclid(BPS_SCALE);
        Money(rounded as i64)
    }
}

/// Shows the amount with a rupee sign, e.g. `₹1800`.
///
/// ## Note
/// For logs and debugging. Grouping separators are a UI concern.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            write!(f, "-₹{}", self.0.unsigned_abs())
        } else {
            write!(f, "₹{}", self.0)
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Discount Rate
// =============================================================================

/// Discount rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1500 bps = 15%, exact in integer math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Creates a discount rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    /// Creates a discount rate from a whole percentage.
    #[inline]
    pub const fn from_percent(pct: u32) -> Self {
        DiscountRate(pct * 100)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a whole percentage (tiers are whole percents).
    #[inline]
    pub const fn percent(&self) -> u32 {
        self.0 / 100
    }

    /// No discount.
    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for DiscountRate {
    fn default() -> Self {
        DiscountRate::zero()
    }
}

impl fmt::Display for DiscountRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}%", self.0 / 100)
        } else {
            write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
