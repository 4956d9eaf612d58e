//! # turf-store: Reservation Store for Turfbook
//!
//! Holds every turf, booking and user in memory and is the only place
//! where they change.
//!
//! ## Module Organization
//! ```text
//! turf_store/
//! ├── lib.rs          ◄─── You are here (exports, tracing setup)
//! ├── store.rs        ◄─── ReservationStore: locking, conflicts, identity
//! ├── bus.rs          ◄─── Change notifications (observers + broadcast)
//! ├── sweep.rs        ◄─── Background completion sweep
//! ├── identity.rs     ◄─── Accounts, sessions, password hashing
//! ├── clock.rs        ◄─── Injected clock and id generator
//! ├── config.rs       ◄─── turf.toml + TURF_* environment overrides
//! └── error.rs        ◄─── StoreError and its wire payload
//! ```
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   caller ──► ReservationStore ──► turf-core rules ──► state mutation    │
//! │                     │                                      │            │
//! │                     │                                      ▼            │
//! │                     │                           NotificationBus         │
//! │                     │                           ├── sync observers      │
//! │                     │                           └── events() channel    │
//! │                     ▼                                                   │
//! │            Result<T, StoreError>                                        │
//! │                                                                         │
//! │   sweeper (tokio task) ──► complete_elapsed() every interval            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod bus;
pub mod clock;
pub mod config;
pub mod error;
pub mod identity;
pub mod store;
pub mod sweep;

use tracing::Level;
use tracing_subscriber::EnvFilter;

pub use bus::{ChangeNotice, NotificationBus, StoreEvent, Subscription};
pub use clock::{Clock, FixedClock, IdGenerator, SequentialIds, SystemClock, UuidIds};
pub use config::{BookingPolicy, LockSettings, SeedSettings, StoreConfig, SweepSettings};
pub use error::{ErrorCode, ErrorPayload, StoreError, StoreResult};
pub use identity::{Registration, Session};
pub use store::{BookingRequest, ReservationStore, ReservationStoreBuilder, StoreSnapshot};
pub use sweep::{spawn_configured, spawn_sweeper, SweeperHandle};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise INFO everywhere and DEBUG for the
/// turf crates.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,turf_core=debug,turf_store=debug"));

    // A second call (tests, embedding apps) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .try_init();
}
