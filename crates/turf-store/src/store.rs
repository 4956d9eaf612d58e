//! # Reservation Store
//!
//! The single source of truth for turfs, bookings and users.
//!
//! ## Locking Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    ReservationStore                                     │
//! │                                                                         │
//! │   readers ──► read lock  (concurrent, consistent snapshot)              │
//! │   writers ──► write lock (one at a time, whole store)                   │
//! │                                                                         │
//! │   every acquisition is bounded by `acquire_timeout`:                    │
//! │       acquired  ──► run operation                                       │
//! │       timed out ──► StoreError::Busy (retryable)                        │
//! │                                                                         │
//! │   WRITE PATH:                                                          │
//! │   validate input ─► lock ─► check invariants ─► mutate ─► notify ─► ok  │
//! │        (no lock)           (no await points after the lock is held)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing awaits between taking the write lock and releasing it, so a
//! caller that drops a mutation future either never got the lock (no
//! effect) or the mutation already finished. Rejected operations return
//! before touching state.
//!
//! ## Usage
//! ```rust,no_run
//! use turf_store::{ReservationStore, StoreConfig};
//!
//! # async fn demo() -> turf_store::StoreResult<()> {
//! let store = ReservationStore::new(&StoreConfig::default());
//! let _sub = store.subscribe(|notice| println!("revision {}", notice.revision));
//!
//! let turfs = store.list_turfs().await?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};
use ts_rs::TS;
use turf_core::lifecycle::{initial_status, transition};
use turf_core::query::{search_bookings, search_turfs, turf_cities};
use turf_core::validation::{validate_contact, validate_slot_selection, validate_turf_draft};
use turf_core::{
    compute_price, reference, Booking, BookingContact, BookingFilter, BookingStatus, City,
    DashboardStats, PriceQuote, Role, SlotCatalog, SlotId, Sport, StatusCounts, TimeSlot,
    Transition, Turf, TurfDraft, TurfFilter, TurfPatch, User, ValidationError,
};

use crate::bus::{self, ChangeNotice, NotificationBus, StoreEvent, Subscription, DEFAULT_EVENT_CAPACITY};
use crate::clock::{Clock, IdGenerator, SystemClock, UuidIds};
use crate::config::{BookingPolicy, StoreConfig};
use crate::error::{StoreError, StoreResult};
use crate::identity::{hash_password, verify_password, Accounts, Registration, Session};

// =============================================================================
// Requests and Snapshots
// =============================================================================

/// Everything needed to create a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BookingRequest {
    pub turf_id: String,
    /// Registered user id or a transient guest id.
    pub user_id: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    /// `"slot-18"` or `18`; any order.
    #[ts(as = "Vec<String>")]
    pub slot_ids: Vec<SlotId>,
    pub sport: Sport,
    #[serde(default)]
    pub contact: Option<BookingContact>,
}

/// Point-in-time copy of the whole store.
#[derive(Debug, Clone, Serialize)]
pub struct StoreSnapshot {
    pub revision: u64,
    pub turfs: Vec<Turf>,
    pub bookings: Vec<Booking>,
    pub cities: Vec<City>,
    pub users: Vec<User>,
    pub session: Option<Session>,
}

// =============================================================================
// State
// =============================================================================

#[derive(Debug, Default)]
struct StoreState {
    revision: u64,
    turfs: Vec<Turf>,
    bookings: Vec<Booking>,
    cities: Vec<City>,
    accounts: Accounts,
}

impl StoreState {
    fn turf(&self, id: &str) -> StoreResult<&Turf> {
        self.turfs
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::not_found("Turf", id))
    }

    fn turf_index(&self, id: &str) -> StoreResult<usize> {
        self.turfs
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::not_found("Turf", id))
    }

    fn booking_index(&self, id: &str) -> StoreResult<usize> {
        self.bookings
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| StoreError::not_found("Booking", id))
    }

    /// Slots held by active bookings in one conflict domain.
    fn claimed_slots(&self, turf_id: &str, date: NaiveDate) -> BTreeSet<SlotId> {
        self.bookings
            .iter()
            .filter(|b| b.turf_id == turf_id && b.date == date && b.status.holds_slots())
            .flat_map(|b| b.slots.iter().copied())
            .collect()
    }

    fn has_id(&self, id: &str) -> bool {
        self.turfs.iter().any(|t| t.id == id)
            || self.bookings.iter().any(|b| b.id == id)
            || self.accounts.get(id).is_some()
    }
}

// =============================================================================
// Store
// =============================================================================

/// In-memory reservation store.
///
/// Share it between tasks with `Arc<ReservationStore>`; every method takes
/// `&self`.
pub struct ReservationStore {
    state: RwLock<StoreState>,
    bus: NotificationBus,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    policy: BookingPolicy,
    lock_timeout: Duration,
}

impl ReservationStore {
    /// Creates a store with the system clock and UUID ids.
    pub fn new(config: &StoreConfig) -> Self {
        Self::builder().config(config.clone()).build()
    }

    pub fn builder() -> ReservationStoreBuilder {
        ReservationStoreBuilder::new()
    }

    pub fn policy(&self) -> BookingPolicy {
        self.policy
    }

    // =========================================================================
    // Locking
    // =========================================================================

    fn ensure_not_dispatching(&self) -> StoreResult<()> {
        if bus::is_dispatching() {
            warn!("Store call from inside a change observer rejected");
            return Err(StoreError::Reentrant);
        }
        Ok(())
    }

    fn busy(&self) -> StoreError {
        let waited_ms = self.lock_timeout.as_millis() as u64;
        warn!(waited_ms, "Store lock not acquired in time");
        StoreError::Busy { waited_ms }
    }

    async fn read_state(&self) -> StoreResult<RwLockReadGuard<'_, StoreState>> {
        self.ensure_not_dispatching()?;
        tokio::time::timeout(self.lock_timeout, self.state.read())
            .await
            .map_err(|_| self.busy())
    }

    async fn write_state(&self) -> StoreResult<RwLockWriteGuard<'_, StoreState>> {
        self.ensure_not_dispatching()?;
        tokio::time::timeout(self.lock_timeout, self.state.write())
            .await
            .map_err(|_| self.busy())
    }

    /// Bumps the revision and notifies. Call with the write lock held.
    fn commit(&self, state: &mut StoreState, event: StoreEvent) -> u64 {
        state.revision += 1;
        let revision = state.revision;
        debug!(revision, ?event, "Store change committed");
        self.bus.publish(ChangeNotice { revision, event });
        revision
    }

    /// An id from the generator that no entity is using yet.
    fn fresh_id(&self, state: &StoreState, prefix: &str) -> String {
        loop {
            let id = self.ids.next_id(prefix);
            if !state.has_id(&id) {
                return id;
            }
            debug!(id = %id, "Generated id already in use, drawing another");
        }
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Registers a synchronous change observer.
    ///
    /// Observers run inside the mutating call, after the change is applied
    /// and before the call returns. Any store call made from an observer
    /// fails with `StoreError::Reentrant`; use [`Self::events`] to react
    /// asynchronously instead.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&ChangeNotice) + Send + Sync + 'static,
    {
        self.bus.subscribe(observer)
    }

    /// Async change feed.
    pub fn events(&self) -> broadcast::Receiver<ChangeNotice> {
        self.bus.events()
    }

    pub async fn revision(&self) -> StoreResult<u64> {
        Ok(self.read_state().await?.revision)
    }

    pub async fn snapshot(&self) -> StoreResult<StoreSnapshot> {
        let state = self.read_state().await?;
        Ok(StoreSnapshot {
            revision: state.revision,
            turfs: state.turfs.clone(),
            bookings: state.bookings.clone(),
            cities: state.cities.clone(),
            users: state.accounts.users(),
            session: state.accounts.session().cloned(),
        })
    }

    // =========================================================================
    // Turfs
    // =========================================================================

    pub async fn add_turf(&self, draft: TurfDraft) -> StoreResult<Turf> {
        self.ensure_not_dispatching()?;
        validate_turf_draft(&draft)?;

        let mut state = self.write_state().await?;
        let id = self.fresh_id(&state, "turf");
        let turf = Turf::from_draft(id, draft);
        state.turfs.push(turf.clone());

        info!(turf_id = %turf.id, name = %turf.name, city = %turf.city, "Turf added");
        self.commit(
            &mut state,
            StoreEvent::TurfAdded {
                turf_id: turf.id.clone(),
            },
        );
        Ok(turf)
    }

    /// Applies a partial update. The merged turf must pass validation.
    pub async fn update_turf(&self, id: &str, patch: TurfPatch) -> StoreResult<Turf> {
        let mut state = self.write_state().await?;
        let index = state.turf_index(id)?;

        let mut updated = state.turfs[index].clone();
        updated.apply(patch);
        validate_turf_draft(&updated.to_draft())?;
        state.turfs[index] = updated.clone();

        info!(turf_id = %id, "Turf updated");
        self.commit(
            &mut state,
            StoreEvent::TurfUpdated {
                turf_id: id.to_string(),
            },
        );
        Ok(updated)
    }

    /// Removes a turf. Its bookings stay and keep their `turf_name`.
    pub async fn delete_turf(&self, id: &str) -> StoreResult<Turf> {
        let mut state = self.write_state().await?;
        let index = state.turf_index(id)?;
        let removed = state.turfs.remove(index);

        let orphaned = state.bookings.iter().filter(|b| b.turf_id == id).count();
        info!(turf_id = %id, orphaned_bookings = orphaned, "Turf deleted");
        self.commit(
            &mut state,
            StoreEvent::TurfDeleted {
                turf_id: id.to_string(),
            },
        );
        Ok(removed)
    }

    pub async fn list_turfs(&self) -> StoreResult<Vec<Turf>> {
        Ok(self.read_state().await?.turfs.clone())
    }

    pub async fn get_turf(&self, id: &str) -> StoreResult<Turf> {
        self.read_state().await?.turf(id).cloned()
    }

    pub async fn search_turfs(&self, filter: &TurfFilter) -> StoreResult<Vec<Turf>> {
        Ok(search_turfs(&self.read_state().await?.turfs, filter)?)
    }

    /// Distinct cities of the current turfs, sorted.
    pub async fn turf_cities(&self) -> StoreResult<Vec<String>> {
        Ok(turf_cities(&self.read_state().await?.turfs))
    }

    /// Reference cities for pickers.
    pub async fn list_cities(&self) -> StoreResult<Vec<City>> {
        Ok(self.read_state().await?.cities.clone())
    }

    // =========================================================================
    // Slots and Pricing
    // =========================================================================

    /// Slot view of a turf on a date, or `None` for an unknown turf.
    pub async fn slot_catalog(&self, turf_id: &str, date: NaiveDate) -> StoreResult<Option<SlotCatalog>> {
        let state = self.read_state().await?;
        let Some(turf) = state.turfs.iter().find(|t| t.id == turf_id) else {
            debug!(turf_id = %turf_id, "Slot query for unknown turf");
            return Ok(None);
        };

        match SlotCatalog::for_turf(turf, date, self.clock.local_now()) {
            Ok(catalog) => Ok(Some(catalog.with_claimed(state.claimed_slots(turf_id, date)))),
            Err(e) => {
                warn!(turf_id = %turf_id, error = %e, "Turf has unusable operating hours");
                Ok(None)
            }
        }
    }

    /// Ordered slots of a turf on a date. Empty for an unknown turf.
    pub async fn generate_slots(&self, turf_id: &str, date: NaiveDate) -> StoreResult<Vec<TimeSlot>> {
        Ok(self
            .slot_catalog(turf_id, date)
            .await?
            .map(|catalog| catalog.to_vec())
            .unwrap_or_default())
    }

    /// Price of `slot_count` hours at a turf's current rate.
    pub async fn quote(&self, turf_id: &str, slot_count: i64) -> StoreResult<PriceQuote> {
        let price = self.read_state().await?.turf(turf_id)?.price();
        Ok(compute_price(price, slot_count)?)
    }

    // =========================================================================
    // Bookings
    // =========================================================================

    /// Books every requested slot or none of them.
    ///
    /// ## Checks (in order)
    /// 1. slot list non-empty, no duplicates, within the policy limit
    /// 2. contact details, when given
    /// 3. turf exists and offers the sport
    /// 4. every slot is inside the operating window and not yet started
    /// 5. no slot is held by a pending or confirmed booking
    pub async fn create_booking(&self, request: BookingRequest) -> StoreResult<Booking> {
        self.ensure_not_dispatching()?;

        if request.user_id.trim().is_empty() {
            return Err(ValidationError::required("user_id").into());
        }
        let slots = validate_slot_selection(&request.slot_ids, self.policy.max_slots_per_booking)?;
        if let Some(contact) = &request.contact {
            validate_contact(contact)?;
        }

        let mut state = self.write_state().await?;
        let now = self.clock.now();

        let turf = state.turf(&request.turf_id)?;
        if !turf.supports(request.sport) {
            return Err(StoreError::UnsupportedSport {
                turf_id: turf.id.clone(),
                sport: request.sport,
            });
        }

        let catalog = SlotCatalog::for_turf(turf, request.date, self.clock.local_now())?;
        for slot in &slots {
            catalog.check_bookable(&turf.id, *slot)?;
        }

        let claimed = state.claimed_slots(&turf.id, request.date);
        let conflicts: Vec<SlotId> = slots.iter().copied().filter(|s| claimed.contains(s)).collect();
        if !conflicts.is_empty() {
            warn!(
                turf_id = %turf.id,
                date = %request.date,
                conflicts = conflicts.len(),
                "Booking rejected: slots already held"
            );
            return Err(StoreError::SlotConflict {
                turf_id: turf.id.clone(),
                date: request.date,
                slots: conflicts,
            });
        }

        let quote = compute_price(turf.price(), slots.len() as i64)?;
        let turf_name = turf.name.clone();
        let id = self.fresh_id(&state, "booking");

        let booking = Booking {
            id,
            turf_id: request.turf_id,
            user_id: request.user_id,
            date: request.date,
            slots,
            sport: request.sport,
            subtotal_amount: quote.subtotal.amount(),
            discount_amount: quote.discount_amount.amount(),
            total_amount: quote.total.amount(),
            status: initial_status(self.policy.auto_confirm),
            turf_name,
            contact: request.contact,
            created_at: now,
            updated_at: now,
        };
        state.bookings.push(booking.clone());

        info!(
            booking_id = %booking.id,
            turf_id = %booking.turf_id,
            date = %booking.date,
            slots = booking.slots.len(),
            total = %booking.total(),
            status = %booking.status,
            "Booking created"
        );
        self.commit(
            &mut state,
            StoreEvent::BookingCreated {
                booking_id: booking.id.clone(),
                turf_id: booking.turf_id.clone(),
            },
        );
        Ok(booking)
    }

    /// Moves a booking to `status`.
    ///
    /// Requesting the current status returns the booking unchanged and
    /// notifies nobody.
    pub async fn update_booking_status(&self, id: &str, status: BookingStatus) -> StoreResult<Booking> {
        let mut state = self.write_state().await?;
        let index = state.booking_index(id)?;
        let from = state.bookings[index].status;

        match transition(from, status) {
            Ok(Transition::Unchanged) => {
                debug!(booking_id = %id, status = %status, "Status unchanged");
                return Ok(state.bookings[index].clone());
            }
            Ok(Transition::Applied) => {}
            Err(e) => {
                warn!(booking_id = %id, from = %from, to = %status, "Illegal status change");
                return Err(e.into());
            }
        }

        let booking = &mut state.bookings[index];
        booking.status = status;
        booking.updated_at = self.clock.now();
        let booking = booking.clone();

        info!(booking_id = %id, from = %from, to = %status, "Booking status changed");
        self.commit(
            &mut state,
            StoreEvent::BookingStatusChanged {
                booking_id: id.to_string(),
                from,
                to: status,
            },
        );
        Ok(booking)
    }

    /// Completes every confirmed booking whose last hour has ended.
    ///
    /// Returns the completed ids. Notifies once per call, and only when
    /// something changed.
    pub async fn complete_elapsed(&self) -> StoreResult<Vec<String>> {
        let mut state = self.write_state().await?;
        let local_now = self.clock.local_now();
        let now = self.clock.now();

        let mut completed = Vec::new();
        for booking in state.bookings.iter_mut() {
            if booking.status == BookingStatus::Confirmed && booking.has_elapsed(local_now) {
                booking.status = BookingStatus::Completed;
                booking.updated_at = now;
                completed.push(booking.id.clone());
            }
        }

        if completed.is_empty() {
            debug!("Sweep found nothing to complete");
        } else {
            info!(count = completed.len(), "Elapsed bookings completed");
            self.commit(
                &mut state,
                StoreEvent::BookingsCompleted {
                    booking_ids: completed.clone(),
                },
            );
        }
        Ok(completed)
    }

    pub async fn get_booking(&self, id: &str) -> StoreResult<Booking> {
        let state = self.read_state().await?;
        let index = state.booking_index(id)?;
        Ok(state.bookings[index].clone())
    }

    /// All bookings in creation order.
    pub async fn list_bookings(&self) -> StoreResult<Vec<Booking>> {
        Ok(self.read_state().await?.bookings.clone())
    }

    pub async fn list_bookings_by_user(&self, user_id: &str) -> StoreResult<Vec<Booking>> {
        Ok(self
            .read_state()
            .await?
            .bookings
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    /// Matching bookings, newest first.
    pub async fn search_bookings(&self, filter: &BookingFilter) -> StoreResult<Vec<Booking>> {
        Ok(search_bookings(&self.read_state().await?.bookings, filter)?)
    }

    pub async fn booking_status_counts(&self) -> StoreResult<StatusCounts> {
        Ok(StatusCounts::tally(&self.read_state().await?.bookings))
    }

    pub async fn dashboard_stats(&self) -> StoreResult<DashboardStats> {
        let state = self.read_state().await?;
        Ok(DashboardStats::compute(&state.turfs, &state.bookings))
    }

    // =========================================================================
    // Identity
    // =========================================================================

    async fn new_account(&self, registration: &Registration) -> StoreResult<String> {
        self.ensure_not_dispatching()?;
        registration.validate()?;

        let password = registration.password.clone();
        tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| StoreError::Auth(format!("Password hashing task failed: {}", e)))?
    }

    /// Creates a customer account and signs it in.
    pub async fn register(&self, registration: Registration) -> StoreResult<Session> {
        let password_hash = self.new_account(&registration).await?;

        let mut state = self.write_state().await?;
        let id = self.fresh_id(&state, "user");
        let now = self.clock.now();
        let user = state
            .accounts
            .insert(id, &registration, password_hash, Role::Customer, now)?;
        let session = state.accounts.start_session(user, now);

        info!(user_id = %session.user.id, "Customer registered");
        self.commit(
            &mut state,
            StoreEvent::SessionStarted {
                user_id: session.user.id.clone(),
            },
        );
        Ok(session)
    }

    /// Creates an operator account without signing it in.
    pub async fn register_operator(&self, registration: Registration) -> StoreResult<User> {
        let password_hash = self.new_account(&registration).await?;

        let mut state = self.write_state().await?;
        let id = self.fresh_id(&state, "user");
        let now = self.clock.now();
        let user = state
            .accounts
            .insert(id, &registration, password_hash, Role::Operator, now)?;

        info!(user_id = %user.id, "Operator registered");
        self.commit(
            &mut state,
            StoreEvent::UserRegistered {
                user_id: user.id.clone(),
            },
        );
        Ok(user)
    }

    /// Signs in with email and password.
    pub async fn authenticate(&self, email: &str, password: &str) -> StoreResult<Session> {
        self.ensure_not_dispatching()?;
        let rejected = || StoreError::Auth("Invalid email or password".to_string());

        let (user, password_hash) = self
            .read_state()
            .await?
            .accounts
            .credentials(email)
            .ok_or_else(rejected)?;

        let password = password.to_string();
        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
            .await
            .map_err(|e| StoreError::Auth(format!("Password check task failed: {}", e)))?;
        if !verified {
            warn!(user_id = %user.id, "Sign-in rejected");
            return Err(rejected());
        }

        let mut state = self.write_state().await?;
        let session = state.accounts.start_session(user, self.clock.now());

        info!(user_id = %session.user.id, "Signed in");
        self.commit(
            &mut state,
            StoreEvent::SessionStarted {
                user_id: session.user.id.clone(),
            },
        );
        Ok(session)
    }

    /// Ends the current session. Returns `None` (and notifies nobody) when
    /// no one is signed in.
    pub async fn logout(&self) -> StoreResult<Option<Session>> {
        let mut state = self.write_state().await?;
        let Some(session) = state.accounts.end_session() else {
            return Ok(None);
        };

        info!(user_id = %session.user.id, "Signed out");
        self.commit(
            &mut state,
            StoreEvent::SessionEnded {
                user_id: session.user.id.clone(),
            },
        );
        Ok(Some(session))
    }

    pub async fn current_session(&self) -> StoreResult<Option<Session>> {
        Ok(self.read_state().await?.accounts.session().cloned())
    }

    pub async fn get_user(&self, id: &str) -> StoreResult<User> {
        self.read_state()
            .await?
            .accounts
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("User", id))
    }

    pub async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.read_state().await?.accounts.users())
    }
}

impl std::fmt::Debug for ReservationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReservationStore")
            .field("policy", &self.policy)
            .field("lock_timeout", &self.lock_timeout)
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Builder Pattern
// =============================================================================

/// Builder for a store with injected clock and id generator.
pub struct ReservationStoreBuilder {
    config: StoreConfig,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
    event_capacity: usize,
}

impl ReservationStoreBuilder {
    pub fn new() -> Self {
        ReservationStoreBuilder {
            config: StoreConfig::default(),
            clock: None,
            ids: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Buffer size of the async event channel.
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn build(self) -> ReservationStore {
        let mut state = StoreState::default();
        if self.config.seed.reference_data {
            state.turfs = reference::turfs();
            state.cities = reference::cities();
            state.bookings = reference::bookings();
            debug!(
                turfs = state.turfs.len(),
                cities = state.cities.len(),
                bookings = state.bookings.len(),
                "Seeded reference data"
            );
        }

        ReservationStore {
            state: RwLock::new(state),
            bus: NotificationBus::new(self.event_capacity),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            ids: self.ids.unwrap_or_else(|| Arc::new(UuidIds)),
            policy: self.config.booking,
            lock_timeout: self.config.locking.acquire_timeout(),
        }
    }
}

impl Default for ReservationStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{FixedClock, SequentialIds};
    use chrono::Duration as ChronoDuration;
    use futures_util::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 6, 10).unwrap()
    }

    fn tomorrow() -> NaiveDate {
        today() + ChronoDuration::days(1)
    }

    fn store_with(auto_confirm: bool, reference_data: bool) -> (ReservationStore, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::at(today().and_hms_opt(9, 0, 0).unwrap()));
        let mut config = StoreConfig::default();
        config.booking.auto_confirm = auto_confirm;
        config.seed.reference_data = reference_data;

        let store = ReservationStore::builder()
            .config(config)
            .clock(clock.clone())
            .ids(Arc::new(SequentialIds::new()))
            .build();
        (store, clock)
    }

    fn draft(name: &str) -> TurfDraft {
        TurfDraft {
            name: name.to_string(),
            city: "Pune".to_string(),
            address: "Baner, Pune".to_string(),
            sports: vec![Sport::Football],
            price_per_hour: 1000,
            rating: 0.0,
            review_count: 0,
            amenities: vec!["Floodlights".to_string()],
            open_time: "06:00".to_string(),
            close_time: "22:00".to_string(),
            featured: false,
        }
    }

    fn request(turf_id: &str, user: &str, date: NaiveDate, hours: &[u8]) -> BookingRequest {
        BookingRequest {
            turf_id: turf_id.to_string(),
            user_id: user.to_string(),
            date,
            slot_ids: hours.iter().map(|h| SlotId::new(*h)).collect(),
            sport: Sport::Football,
            contact: None,
        }
    }

    fn counter(store: &ReservationStore) -> (Arc<AtomicUsize>, Subscription) {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let sub = store.subscribe(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        (hits, sub)
    }

    fn registration(email: &str) -> Registration {
        Registration {
            name: "Asha Rao".to_string(),
            email: email.to_string(),
            phone: "9876543210".to_string(),
            password: "secret1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_book_two_slots_then_conflict() {
        let (store, _) = store_with(false, false);
        let turf = store.add_turf(draft("City Arena")).await.unwrap();

        let booking = store
            .create_booking(request(&turf.id, "user-a", tomorrow(), &[18, 19]))
            .await
            .unwrap();
        assert_eq!(booking.subtotal_amount, 2000);
        assert_eq!(booking.discount_amount, 200);
        assert_eq!(booking.total_amount, 1800);
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.turf_name, "City Arena");

        let err = store
            .create_booking(request(&turf.id, "user-b", tomorrow(), &[18]))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::SlotConflict {
                turf_id: turf.id.clone(),
                date: tomorrow(),
                slots: vec![SlotId::new(18)],
            }
        );

        // Neighbouring hour and another day are still free
        assert!(store
            .create_booking(request(&turf.id, "user-b", tomorrow(), &[20]))
            .await
            .is_ok());
        assert!(store
            .create_booking(request(&turf.id, "user-b", tomorrow() + ChronoDuration::days(1), &[18]))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_conflict_rejects_whole_request() {
        let (store, _) = store_with(false, false);
        let turf = store.add_turf(draft("City Arena")).await.unwrap();
        store
            .create_booking(request(&turf.id, "user-a", tomorrow(), &[18]))
            .await
            .unwrap();

        let err = store
            .create_booking(request(&turf.id, "user-b", tomorrow(), &[17, 18]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::SlotConflict { .. }));
        assert_eq!(store.list_bookings().await.unwrap().len(), 1);

        let slots = store.generate_slots(&turf.id, tomorrow()).await.unwrap();
        let free: Vec<_> = slots.iter().filter(|s| s.available).map(|s| s.id.hour()).collect();
        assert!(free.contains(&17));
        assert!(!free.contains(&18));
    }

    #[tokio::test]
    async fn test_cancelled_booking_releases_slots() {
        let (store, _) = store_with(false, false);
        let turf = store.add_turf(draft("City Arena")).await.unwrap();
        let booking = store
            .create_booking(request(&turf.id, "user-a", tomorrow(), &[18, 19]))
            .await
            .unwrap();

        store
            .update_booking_status(&booking.id, BookingStatus::Cancelled)
            .await
            .unwrap();

        assert!(store
            .create_booking(request(&turf.id, "user-b", tomorrow(), &[19]))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_unbookable_slots() {
        let (store, _) = store_with(false, false);
        let turf = store.add_turf(draft("City Arena")).await.unwrap();

        // After closing
        let err = store
            .create_booking(request(&turf.id, "u", tomorrow(), &[23]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidSlot { .. }));

        // Today, at or before the current hour (clock is 09:00)
        let err = store
            .create_booking(request(&turf.id, "u", today(), &[9, 10]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidSlot { slot, .. } if slot == SlotId::new(9)));
        assert!(store.create_booking(request(&turf.id, "u", today(), &[10])).await.is_ok());

        // Past date
        let err = store
            .create_booking(request(&turf.id, "u", today() - ChronoDuration::days(1), &[18]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidSlot { .. }));
    }

    #[tokio::test]
    async fn test_booking_request_validation() {
        let (store, _) = store_with(false, false);
        let turf = store.add_turf(draft("City Arena")).await.unwrap();

        let err = store
            .create_booking(request(&turf.id, "u", tomorrow(), &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let err = store
            .create_booking(request(&turf.id, "u", tomorrow(), &[18, 18]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(ValidationError::Duplicate { .. })));

        let mut with_contact = request(&turf.id, "u", tomorrow(), &[18]);
        with_contact.contact = Some(BookingContact {
            name: "Asha".to_string(),
            email: "no-at-sign".to_string(),
            phone: "9876543210".to_string(),
        });
        assert!(matches!(
            store.create_booking(with_contact).await,
            Err(StoreError::Validation(_))
        ));

        let mut cricket = request(&turf.id, "u", tomorrow(), &[18]);
        cricket.sport = Sport::Cricket;
        assert!(matches!(
            store.create_booking(cricket).await,
            Err(StoreError::UnsupportedSport { .. })
        ));

        assert!(matches!(
            store.create_booking(request("turf-404", "u", tomorrow(), &[18])).await,
            Err(StoreError::NotFound { entity: "Turf", .. })
        ));

        assert!(store.list_bookings().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_status_transitions_notify_once() {
        let (store, _) = store_with(false, false);
        let turf = store.add_turf(draft("City Arena")).await.unwrap();
        let booking = store
            .create_booking(request(&turf.id, "u", tomorrow(), &[18]))
            .await
            .unwrap();

        let (hits, _sub) = counter(&store);

        let confirmed = store
            .update_booking_status(&booking.id, BookingStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(confirmed.status, BookingStatus::Confirmed);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        // Retried call: same state, no second notification
        let again = store
            .update_booking_status(&booking.id, BookingStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(again, confirmed);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let err = store
            .update_booking_status(&booking.id, BookingStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition { .. }));

        store
            .update_booking_status(&booking.id, BookingStatus::Cancelled)
            .await
            .unwrap();
        let err = store
            .update_booking_status(&booking.id, BookingStatus::Confirmed)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::InvalidTransition {
                from: BookingStatus::Cancelled,
                to: BookingStatus::Confirmed,
            }
        );
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        assert!(matches!(
            store.update_booking_status("booking-404", BookingStatus::Confirmed).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_auto_confirm_policy() {
        let (store, _) = store_with(true, false);
        let turf = store.add_turf(draft("City Arena")).await.unwrap();
        let booking = store
            .create_booking(request(&turf.id, "u", tomorrow(), &[6, 7, 8, 9, 10]))
            .await
            .unwrap();

        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.total_amount, 4000);
    }

    #[tokio::test]
    async fn test_turf_crud() {
        let (store, _) = store_with(false, false);
        let (hits, _sub) = counter(&store);

        let turf = store.add_turf(draft("City Arena")).await.unwrap();
        assert_eq!(turf.id, "turf-1");

        let updated = store
            .update_turf(
                &turf.id,
                TurfPatch {
                    price_per_hour: Some(1200),
                    close_time: Some("00:00".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.price_per_hour, 1200);
        assert_eq!(store.generate_slots(&turf.id, tomorrow()).await.unwrap().len(), 19);

        let err = store
            .update_turf(
                &turf.id,
                TurfPatch {
                    price_per_hour: Some(0),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store.get_turf(&turf.id).await.unwrap().price_per_hour, 1200);

        let booking = store
            .create_booking(request(&turf.id, "u", tomorrow(), &[20]))
            .await
            .unwrap();
        store.delete_turf(&turf.id).await.unwrap();

        assert!(matches!(
            store.get_turf(&turf.id).await,
            Err(StoreError::NotFound { .. })
        ));
        let kept = store.get_booking(&booking.id).await.unwrap();
        assert_eq!(kept.turf_name, "City Arena");
        assert!(store.generate_slots(&turf.id, tomorrow()).await.unwrap().is_empty());

        // add, update, book, delete
        assert_eq!(hits.load(Ordering::SeqCst), 4);
        assert_eq!(store.revision().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_invalid_turf_rejected() {
        let (store, _) = store_with(false, false);
        let mut bad = draft("City Arena");
        bad.sports.clear();
        assert!(store.add_turf(bad).await.is_err());

        let mut bad = draft("City Arena");
        bad.open_time = "6am".to_string();
        assert!(store.add_turf(bad).await.is_err());
        assert!(store.list_turfs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_price_cannot_reach_booking() {
        let (store, _) = store_with(false, false);

        let mut pricey = draft("Gold Arena");
        pricey.price_per_hour = i64::MAX / 2;
        assert!(matches!(
            store.add_turf(pricey).await,
            Err(StoreError::Validation(ValidationError::OutOfRange { .. }))
        ));

        let turf = store.add_turf(draft("City Arena")).await.unwrap();
        let err = store
            .update_turf(
                &turf.id,
                TurfPatch {
                    price_per_hour: Some(i64::MAX / 2),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(
            store.get_turf(&turf.id).await.unwrap().price_per_hour,
            turf.price_per_hour
        );

        // The top accepted rate books a long block without overflowing
        let top = store
            .update_turf(
                &turf.id,
                TurfPatch {
                    price_per_hour: Some(turf_core::MAX_PRICE_PER_HOUR),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let booking = store
            .create_booking(request(&top.id, "u", tomorrow(), &[18, 19, 20]))
            .await
            .unwrap();
        assert_eq!(booking.subtotal_amount, turf_core::MAX_PRICE_PER_HOUR * 3);
        assert_eq!(booking.total_amount, booking.subtotal_amount - booking.discount_amount);
    }

    #[tokio::test]
    async fn test_reference_data_and_quotes() {
        let (store, _) = store_with(false, true);

        assert_eq!(store.list_turfs().await.unwrap().len(), 6);
        assert_eq!(store.list_cities().await.unwrap().len(), 6);
        assert_eq!(
            store.turf_cities().await.unwrap(),
            vec!["Bangalore", "Chennai", "Delhi", "Mumbai"]
        );

        let quote = store.quote("turf-2", 3).await.unwrap();
        assert_eq!(quote.total.amount(), 4590);
        assert!(store.quote("turf-2", 0).await.is_err());

        // Generated ids skip the seeded ones
        let turf = store.add_turf(draft("City Arena")).await.unwrap();
        assert_eq!(turf.id, "turf-7");

        let filter = TurfFilter {
            query: String::new(),
            city: Some("Bangalore".to_string()),
        };
        assert_eq!(store.search_turfs(&filter).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_admin_queries() {
        let (store, _) = store_with(false, true);

        // Sample bookings give the dashboard data from the start
        let seeded = store.booking_status_counts().await.unwrap();
        assert_eq!(
            (seeded.all, seeded.pending, seeded.confirmed, seeded.completed, seeded.cancelled),
            (5, 1, 2, 1, 1)
        );
        assert_eq!(store.dashboard_stats().await.unwrap().revenue.amount(), 11420);

        let mut first = request("turf-1", "user-a", tomorrow(), &[18, 19]);
        first.contact = Some(BookingContact {
            name: "Meera Iyer".to_string(),
            email: "meera@example.com".to_string(),
            phone: "+91 91234 56789".to_string(),
        });
        let first = store.create_booking(first).await.unwrap();
        let second = store
            .create_booking(request("turf-2", "user-b", tomorrow(), &[7]))
            .await
            .unwrap();
        store
            .update_booking_status(&second.id, BookingStatus::Confirmed)
            .await
            .unwrap();

        let by_name = BookingFilter {
            query: "meera".to_string(),
            status: None,
        };
        let found = store.search_bookings(&by_name).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, first.id);

        let seeded_customer = BookingFilter {
            query: "rahul".to_string(),
            status: Some(BookingStatus::Confirmed),
        };
        let found = store.search_bookings(&seeded_customer).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "booking-1");

        let too_long = BookingFilter {
            query: "q".repeat(101),
            status: None,
        };
        assert!(matches!(
            store.search_bookings(&too_long).await,
            Err(StoreError::Validation(ValidationError::TooLong { .. }))
        ));

        let counts = store.booking_status_counts().await.unwrap();
        assert_eq!((counts.all, counts.pending, counts.confirmed), (7, 2, 3));

        let stats = store.dashboard_stats().await.unwrap();
        assert_eq!(stats.total_turfs, 6);
        assert_eq!(stats.total_bookings, 7);
        assert_eq!(stats.pending_bookings, 2);
        assert_eq!(stats.revenue.amount(), 11420 + 1800);

        assert_eq!(store.list_bookings_by_user("user-a").await.unwrap().len(), 1);
        assert!(store.list_bookings_by_user("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_identity_flow() {
        let (store, _) = store_with(false, false);
        let (hits, _sub) = counter(&store);

        let session = store.register(registration("asha@example.com")).await.unwrap();
        assert_eq!(session.user.role, Role::Customer);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let err = store.register(registration("ASHA@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Auth(_)));

        assert!(store.logout().await.unwrap().is_some());
        assert!(store.logout().await.unwrap().is_none());
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        assert!(matches!(
            store.authenticate("asha@example.com", "wrong-pass").await,
            Err(StoreError::Auth(_))
        ));
        assert!(matches!(
            store.authenticate("nobody@example.com", "secret1").await,
            Err(StoreError::Auth(_))
        ));

        let session = store.authenticate("Asha@Example.com", "secret1").await.unwrap();
        assert_eq!(
            store.current_session().await.unwrap().map(|s| s.user.id),
            Some(session.user.id.clone())
        );
        assert_eq!(hits.load(Ordering::SeqCst), 3);

        let operator = store
            .register_operator(registration("ops@example.com"))
            .await
            .unwrap();
        assert!(operator.is_operator());
        assert_eq!(store.list_users().await.unwrap().len(), 2);
        assert_eq!(store.get_user(&operator.id).await.unwrap(), operator);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_bookings_one_wins() {
        let (store, _) = store_with(false, false);
        let store = Arc::new(store);
        let turf = store.add_turf(draft("City Arena")).await.unwrap();

        let mut tasks = Vec::new();
        for n in 0..8 {
            let store = Arc::clone(&store);
            let req = request(&turf.id, &format!("user-{}", n), tomorrow(), &[18, 19]);
            tasks.push(tokio::spawn(async move { store.create_booking(req).await }));
        }

        let mut won = 0;
        let mut conflicts = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => won += 1,
                Err(StoreError::SlotConflict { .. }) => conflicts += 1,
                Err(other) => panic!("unexpected error: {}", other),
            }
        }

        assert_eq!(won, 1);
        assert_eq!(conflicts, 7);
        assert_eq!(store.list_bookings().await.unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_when_lock_held() {
        let clock = Arc::new(FixedClock::at(today().and_hms_opt(9, 0, 0).unwrap()));
        let mut config = StoreConfig::default();
        config.locking.acquire_timeout_ms = 50;
        config.seed.reference_data = false;
        let store = ReservationStore::builder().config(config).clock(clock).build();

        let guard = store.state.write().await;
        let err = store.add_turf(draft("City Arena")).await.unwrap_err();
        assert_eq!(err, StoreError::Busy { waited_ms: 50 });
        assert!(err.is_retryable());
        assert!(matches!(store.list_turfs().await, Err(StoreError::Busy { .. })));
        drop(guard);

        assert!(store.add_turf(draft("City Arena")).await.is_ok());
    }

    #[tokio::test]
    async fn test_observer_cannot_reenter() {
        let (store, _) = store_with(false, false);
        let store = Arc::new(store);
        let seen: Arc<Mutex<Vec<StoreResult<Turf>>>> = Arc::new(Mutex::new(Vec::new()));

        let weak = Arc::downgrade(&store);
        let s = Arc::clone(&seen);
        let _sub = store.subscribe(move |_| {
            if let Some(store) = weak.upgrade() {
                if let Some(result) = store.add_turf(draft("Nested")).now_or_never() {
                    s.lock().unwrap().push(result);
                }
            }
        });

        store.add_turf(draft("Outer")).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], Err(StoreError::Reentrant));
        drop(seen);
        assert_eq!(store.list_turfs().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_complete_elapsed() {
        let (store, clock) = store_with(true, false);
        let turf = store.add_turf(draft("City Arena")).await.unwrap();

        let played = store
            .create_booking(request(&turf.id, "u", today(), &[12, 13]))
            .await
            .unwrap();
        let later = store
            .create_booking(request(&turf.id, "u", today(), &[20]))
            .await
            .unwrap();

        // Nothing has ended yet
        assert!(store.complete_elapsed().await.unwrap().is_empty());

        let (hits, _sub) = counter(&store);
        clock.advance(ChronoDuration::hours(5)); // 14:00, slot 13 just ended
        assert_eq!(store.complete_elapsed().await.unwrap(), vec![played.id.clone()]);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        assert_eq!(
            store.get_booking(&played.id).await.unwrap().status,
            BookingStatus::Completed
        );
        assert_eq!(
            store.get_booking(&later.id).await.unwrap().status,
            BookingStatus::Confirmed
        );

        // Second pass is a no-op
        assert!(store.complete_elapsed().await.unwrap().is_empty());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_event_channel() {
        let (store, _) = store_with(false, false);
        let mut rx = store.events();

        let turf = store.add_turf(draft("City Arena")).await.unwrap();
        let booking = store
            .create_booking(request(&turf.id, "u", tomorrow(), &[18]))
            .await
            .unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.revision, 1);
        assert_eq!(first.event, StoreEvent::TurfAdded { turf_id: turf.id.clone() });

        let second = rx.recv().await.unwrap();
        assert_eq!(second.revision, 2);
        assert_eq!(
            second.event,
            StoreEvent::BookingCreated {
                booking_id: booking.id,
                turf_id: turf.id,
            }
        );
    }

    #[tokio::test]
    async fn test_booking_request_accepts_bare_hours() {
        let json = r#"{
            "turf_id": "turf-1",
            "user_id": "guest-1",
            "date": "2030-06-11",
            "slot_ids": [19, "slot-18"],
            "sport": "cricket"
        }"#;
        let req: BookingRequest = serde_json::from_str(json).unwrap();

        let (store, _) = store_with(false, true);
        let booking = store.create_booking(req).await.unwrap();
        assert_eq!(booking.slots, vec![SlotId::new(18), SlotId::new(19)]);
        assert_eq!(booking.total_amount, 2700);
    }
}
