//! # Completion Sweep
//!
//! Background task that moves confirmed bookings to `completed` once their
//! last booked hour has ended.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Sweeper Loop                                    │
//! │                                                                         │
//! │   loop {                                                                │
//! │       select! {                                                         │
//! │           interval.tick()   ──► store.complete_elapsed()                │
//! │                                   ├── Ok(ids)   → debug/info            │
//! │                                   ├── Busy      → warn, try next tick   │
//! │                                   └── other     → error, keep running   │
//! │           shutdown_rx.recv() ─► break                                   │
//! │       }                                                                 │
//! │   }                                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::config::SweepSettings;
use crate::error::StoreError;
use crate::store::ReservationStore;

/// Handle for stopping a running sweeper.
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown_tx: mpsc::Sender<()>,
    join: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signals the sweeper to stop and waits for it to finish its current
    /// pass.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.join.await {
            error!(error = %e, "Sweeper task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

/// Starts the completion sweep on the current tokio runtime.
///
/// The first pass runs immediately, then once per `interval`.
pub fn spawn_sweeper(store: Arc<ReservationStore>, interval: Duration) -> SweeperHandle {
    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
    let join = tokio::spawn(run_sweeper(store, interval, shutdown_rx));

    info!(interval_secs = interval.as_secs(), "Completion sweeper started");
    SweeperHandle { shutdown_tx, join }
}

/// Starts the sweeper only when `settings.enabled` is set.
///
/// A zero interval is refused here as well as in config validation, since
/// `tokio::time::interval` panics on it.
pub fn spawn_configured(store: Arc<ReservationStore>, settings: &SweepSettings) -> Option<SweeperHandle> {
    if !settings.enabled {
        info!("Completion sweeper disabled by configuration");
        return None;
    }
    if settings.interval_secs == 0 {
        warn!("Completion sweeper not started, interval_secs is 0");
        return None;
    }
    Some(spawn_sweeper(store, settings.interval()))
}

async fn run_sweeper(
    store: Arc<ReservationStore>,
    interval: Duration,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match store.complete_elapsed().await {
                    Ok(ids) if ids.is_empty() => {}
                    Ok(ids) => debug!(count = ids.len(), "Sweep pass completed bookings"),
                    Err(StoreError::Busy { waited_ms }) => {
                        warn!(waited_ms, "Sweep skipped, store busy");
                    }
                    Err(e) => error!(error = %e, "Sweep pass failed"),
                }
            }
            _ = shutdown_rx.recv() => {
                info!("Completion sweeper received shutdown");
                break;
            }
        }
    }
}
