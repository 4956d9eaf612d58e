//! # Notification Bus
//!
//! Tells subscribers that store state changed.
//!
//! ## Delivery
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Mutation → Notification                           │
//! │                                                                         │
//! │  store.create_booking(...)                                              │
//! │       │                                                                 │
//! │       ├── acquire write lock                                            │
//! │       ├── validate + mutate + bump revision                             │
//! │       ├── bus.publish(notice)                                           │
//! │       │      ├── observer 1 (sync, exactly once)                        │
//! │       │      ├── observer 2 (sync, exactly once)                        │
//! │       │      └── broadcast channel (async consumers)                    │
//! │       ├── release write lock                                            │
//! │       ▼                                                                 │
//! │  return to caller                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Observers run while the write lock is held, so notices arrive in
//! revision order. An observer that calls back into a mutating store
//! operation gets `StoreError::Reentrant` instead of deadlocking.

use std::cell::Cell;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::broadcast;
use turf_core::BookingStatus;

/// Default capacity of the async event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

// =============================================================================
// Events
// =============================================================================

/// What changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    TurfAdded {
        turf_id: String,
    },
    TurfUpdated {
        turf_id: String,
    },
    TurfDeleted {
        turf_id: String,
    },
    BookingCreated {
        booking_id: String,
        turf_id: String,
    },
    BookingStatusChanged {
        booking_id: String,
        from: BookingStatus,
        to: BookingStatus,
    },
    /// One completion sweep pass.
    BookingsCompleted {
        booking_ids: Vec<String>,
    },
    /// An account created without signing in (operators).
    UserRegistered {
        user_id: String,
    },
    SessionStarted {
        user_id: String,
    },
    SessionEnded {
        user_id: String,
    },
}

/// A change plus the store revision it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeNotice {
    pub revision: u64,
    pub event: StoreEvent,
}

// =============================================================================
// Re-entrancy Tracking
// =============================================================================

thread_local! {
    static DISPATCHING: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as delivering notifications until dropped.
struct DispatchGuard {
    was_dispatching: bool,
}

impl DispatchGuard {
    fn enter() -> Self {
        let was_dispatching = DISPATCHING.with(|flag| flag.replace(true));
        DispatchGuard { was_dispatching }
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        DISPATCHING.with(|flag| flag.set(self.was_dispatching));
    }
}

/// True while an observer is running on this thread.
pub fn is_dispatching() -> bool {
    DISPATCHING.with(Cell::get)
}

// =============================================================================
// Bus
// =============================================================================

type Observer = Arc<dyn Fn(&ChangeNotice) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    observers: Vec<(u64, Observer)>,
}

impl Registry {
    fn remove(&mut self, id: u64) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(key, _)| *key != id);
        self.observers.len() != before
    }
}

/// Observer registry plus an async broadcast channel.
pub struct NotificationBus {
    registry: Arc<Mutex<Registry>>,
    events: broadcast::Sender<ChangeNotice>,
}

impl NotificationBus {
    pub fn new(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        NotificationBus {
            registry: Arc::new(Mutex::new(Registry::default())),
            events,
        }
    }

    /// Registers a synchronous observer.
    ///
    /// The observer stays registered until the returned handle is
    /// unsubscribed or dropped.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&ChangeNotice) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        registry.next_id += 1;
        let id = registry.next_id;
        registry.observers.push((id, Arc::new(observer)));

        Subscription {
            id,
            registry: Arc::clone(&self.registry),
            active: true,
        }
    }

    /// Receiver for async consumers. Lagging receivers skip old notices.
    pub fn events(&self) -> broadcast::Receiver<ChangeNotice> {
        self.events.subscribe()
    }

    pub fn observer_count(&self) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .observers
            .len()
    }

    /// Delivers `notice` to every current observer, then to the channel.
    ///
    /// The observer list is copied first so observers may subscribe or
    /// unsubscribe while being notified.
    pub(crate) fn publish(&self, notice: ChangeNotice) {
        let observers: Vec<Observer> = self
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .observers
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();

        {
            let _guard = DispatchGuard::enter();
            for observer in &observers {
                observer(&notice);
            }
        }

        // No async receivers is fine
        let _ = self.events.send(notice);
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl std::fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationBus")
            .field("observers", &self.observer_count())
            .field("receivers", &self.events.receiver_count())
            .finish()
    }
}

// =============================================================================
// Subscription Handle
// =============================================================================

/// Unsubscribe handle returned by [`NotificationBus::subscribe`].
#[must_use = "dropping a Subscription unsubscribes the observer"]
pub struct Subscription {
    id: u64,
    registry: Arc<Mutex<Registry>>,
    active: bool,
}

impl Subscription {
    /// Removes the observer. Returns false if it was already removed.
    pub fn unsubscribe(mut self) -> bool {
        self.detach()
    }

    fn detach(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(self.id)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.active)
            .finish()
    }
}
