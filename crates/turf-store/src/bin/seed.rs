//! Boots a store from `turf.toml`, keeps the completion sweeper running
//! when enabled, optionally books a demo slot, and prints a JSON snapshot.
//!
//! ```text
//! cargo run -p turf-store --bin seed            # reference data only
//! cargo run -p turf-store --bin seed -- --demo  # plus one demo booking
//! RUST_LOG=turf_store=trace cargo run -p turf-store --bin seed
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Duration;
use tracing::info;
use turf_core::{SlotId, Sport};
use turf_store::{
    init_tracing, spawn_configured, BookingRequest, Registration, ReservationStore, StoreConfig,
    StoreResult,
};

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        eprintln!("{}", serde_json::to_string_pretty(&e.to_payload()).unwrap_or_else(|_| e.to_string()));
        std::process::exit(1);
    }
}

async fn run() -> StoreResult<()> {
    let mut demo = false;
    let mut config_path: Option<PathBuf> = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--demo" => demo = true,
            "--config" => config_path = args.next().map(PathBuf::from),
            other => info!(arg = %other, "Ignoring unknown argument"),
        }
    }

    let config = StoreConfig::load_or_default(config_path);
    let store = Arc::new(ReservationStore::new(&config));
    info!(policy = ?store.policy(), "Store ready");
    let sweeper = spawn_configured(Arc::clone(&store), &config.sweep);

    if demo {
        let operator = store
            .register_operator(Registration {
                name: "Turf Operator".to_string(),
                email: "operator@turfbook.in".to_string(),
                phone: "+91 90000 00000".to_string(),
                password: "operator".to_string(),
            })
            .await?;
        info!(user_id = %operator.id, "Demo operator registered");

        if let Some(turf) = store.list_turfs().await?.into_iter().next() {
            let tomorrow = chrono::Local::now().date_naive() + Duration::days(1);
            let sport = turf.sports.first().copied().unwrap_or(Sport::Football);
            let booking = store
                .create_booking(BookingRequest {
                    turf_id: turf.id.clone(),
                    user_id: "guest-demo".to_string(),
                    date: tomorrow,
                    slot_ids: vec![SlotId::new(18), SlotId::new(19)],
                    sport,
                    contact: None,
                })
                .await?;
            info!(booking_id = %booking.id, total = %booking.total(), "Demo booking created");
        }
    }

    if let Some(handle) = sweeper {
        handle.shutdown().await;
    }

    let snapshot = store.snapshot().await?;
    let json = serde_json::to_string_pretty(&snapshot)
        .map_err(|e| turf_store::StoreError::InvalidInput(format!("Failed to encode snapshot: {}", e)))?;
    println!("{}", json);
    Ok(())
}
