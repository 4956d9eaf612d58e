//! # Pricing Engine
//!
//! Computes subtotal, discount tier and total for a booking.
//!
//! ## Discount Tiers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Flat rate on the whole subtotal, chosen by slot count:                │
//! │                                                                         │
//! │    slots   rate                                                         │
//! │    ─────   ────                                                         │
//! │      1      0%                                                          │
//! │      2     10%                                                          │
//! │      3     15%                                                          │
//! │     4+     20%                                                          │
//! │                                                                         │
//! │  subtotal = price_per_hour × slots                                      │
//! │  discount = round_half_up(subtotal × rate)                              │
//! │  total    = subtotal - discount                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{DiscountRate, Money};

/// The price breakdown shown before checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceQuote {
    pub price_per_hour: Money,
    pub slot_count: u32,
    pub subtotal: Money,
    pub discount_rate: DiscountRate,
    pub discount_amount: Money,
    pub total: Money,
}

/// Discount tier for a number of booked slots.
pub const fn discount_for_slots(slot_count: u32) -> DiscountRate {
    match slot_count {
        0 | 1 => DiscountRate::zero(),
        2 => DiscountRate::from_percent(10),
        3 => DiscountRate::from_percent(15),
        _ => DiscountRate::from_percent(20),
    }
}

/// Prices `slot_count` hours at `price_per_hour`.
///
/// ## Errors
/// `CoreError::InvalidInput` when `slot_count < 1` or the hourly price is
/// negative.
///
/// ## Example
/// ```rust
/// use turf_core::money::Money;
/// use turf_core::pricing::compute_price;
///
/// let quote = compute_price(Money::new(1000), 3).unwrap();
/// assert_eq!(quote.discount_amount.amount(), 450);
/// assert_eq!(quote.total.amount(), 2550);
/// ```
pub fn compute_price(price_per_hour: Money, slot_count: i64) -> CoreResult<PriceQuote> {
    if slot_count < 1 {
        return Err(CoreError::InvalidInput {
            reason: format!("slot count must be at least 1, got {}", slot_count),
        });
    }
    if price_per_hour.amount() < 0 {
        return Err(CoreError::InvalidInput {
            reason: format!("price per hour cannot be negative, got {}", price_per_hour),
        });
    }
    let count = u32::try_from(slot_count).map_err(|_| CoreError::InvalidInput {
        reason: format!("slot count {} is too large", slot_count),
    })?;

    let subtotal = price_per_hour
        .checked_multiply_quantity(slot_count)
        .ok_or_else(|| CoreError::InvalidInput {
            reason: format!("{} x {} slots overflows the subtotal", price_per_hour, slot_count),
        })?;
    let discount_rate = discount_for_slots(count);
    let discount_amount = subtotal.portion(discount_rate);

    Ok(PriceQuote {
        price_per_hour,
        slot_count: count,
        subtotal,
        discount_rate,
        discount_amount,
        total: subtotal - discount_amount,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn total(price: i64, count: i64) -> i64 {
        compute_price(Money::new(price), count).unwrap().total.amount()
    }

    #[test]
    fn test_tier_totals() {
        assert_eq!(total(1000, 1), 1000);
        assert_eq!(total(1000, 2), 1800);
        assert_eq!(total(1000, 3), 2550);
        assert_eq!(total(1000, 4), 3200);
        assert_eq!(total(1000, 5), 4000);
    }

    #[test]
    fn test_single_slot_has_no_discount() {
        let quote = compute_price(Money::new(1500), 1).unwrap();
        assert_eq!(quote.subtotal.amount(), 1500);
        assert!(quote.discount_amount.is_zero());
        assert!(quote.discount_rate.is_zero());
    }

    #[test]
    fn test_rejects_non_positive_counts() {
        assert!(matches!(
            compute_price(Money::new(1000), 0),
            Err(CoreError::InvalidInput { .. })
        ));
        assert!(compute_price(Money::new(1000), -3).is_err());
    }

    #[test]
    fn test_subtotal_overflow_is_rejected() {
        let err = compute_price(Money::new(i64::MAX / 2), 3).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput { .. }));

        // Largest accepted rate for a full day still prices cleanly
        let quote = compute_price(Money::new(crate::MAX_PRICE_PER_HOUR), 24).unwrap();
        assert_eq!(quote.subtotal.amount(), crate::MAX_PRICE_PER_HOUR * 24);
    }

    #[test]
    fn test_rounds_half_up() {
        // 3 × 1153 = 3459, 15% = 518.85 → 519
        let quote = compute_price(Money::new(1153), 3).unwrap();
        assert_eq!(quote.discount_amount.amount(), 519);
        assert_eq!(quote.total.amount(), 2940);
    }

    proptest! {
        #[test]
        fn prop_single_slot_is_identity(price in 0i64..1_000_000) {
            let quote = compute_price(Money::new(price), 1).unwrap();
            prop_assert_eq!(quote.subtotal.amount(), price);
            prop_assert_eq!(quote.total.amount(), price);
        }

        #[test]
        fn prop_breakdown_is_consistent(price in 0i64..1_000_000, count in 1i64..48) {
            let a = compute_price(Money::new(price), count).unwrap();
            let b = compute_price(Money::new(price), count).unwrap();
            prop_assert_eq!(a, b);
            prop_assert_eq!(a.subtotal - a.discount_amount, a.total);
            prop_assert!(a.total <= a.subtotal);
        }
    }
}
