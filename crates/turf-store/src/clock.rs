//! # Clock and Id Ports
//!
//! The store never reads the wall clock or invents ids itself; both are
//! injected so tests can pin time and predict ids.
//!
//! ```text
//! ┌──────────────────────┐        ┌──────────────────────────────┐
//! │  ReservationStore    │──now──►│ Clock: SystemClock | Fixed   │
//! │                      │──id───►│ IdGenerator: Uuid | Sequence │
//! └──────────────────────┘        └──────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Local, NaiveDateTime, Utc};
use uuid::Uuid;

// =============================================================================
// Clock
// =============================================================================

/// Wall-clock time source.
pub trait Clock: Send + Sync {
    /// Current instant, used for timestamps.
    fn now(&self) -> DateTime<Utc>;

    /// Current local wall-clock time, used for the past-cutoff rule and
    /// the completion sweep (booking dates and hours are local).
    fn local_now(&self) -> NaiveDateTime {
        self.now().with_timezone(&Local).naive_local()
    }
}

/// Reads the operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A settable clock for deterministic tests.
///
/// Local time is treated as UTC, so `local_now()` is the naive form of
/// `now()`.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        FixedClock {
            now: Mutex::new(now),
        }
    }

    /// Starts at the given local wall-clock time.
    pub fn at(local: NaiveDateTime) -> Self {
        Self::new(local.and_utc())
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn local_now(&self) -> NaiveDateTime {
        self.now().naive_utc()
    }
}

// =============================================================================
// Id Generator
// =============================================================================

/// Produces ids unique within the store's lifetime.
pub trait IdGenerator: Send + Sync {
    /// Returns a fresh id, e.g. `booking-…`.
    fn next_id(&self, prefix: &str) -> String;
}

/// Random UUID v4 ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, Uuid::new_v4())
    }
}

/// Counter-based ids (`booking-1`, `booking-2`, …) for tests and demos.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self, prefix: &str) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}", prefix, n)
    }
}
