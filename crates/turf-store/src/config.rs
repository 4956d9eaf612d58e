//! # Store Configuration
//!
//! Booking policy, lock timeout, sweep schedule and seeding switches.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TURF_AUTO_CONFIRM=true                                             │
//! │     TURF_LOCK_TIMEOUT_MS=500                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/turfbook/turf.toml (Linux)                               │
//! │     ~/Library/Application Support/com.turfbook.turfbook/turf.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     manual confirmation, 2s lock timeout, sweep every 60s              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # turf.toml
//! [booking]
//! auto_confirm = false        # new bookings start pending
//! max_slots_per_booking = 24
//!
//! [locking]
//! acquire_timeout_ms = 2000   # Busy error after this long
//!
//! [sweep]
//! enabled = true
//! interval_secs = 60
//!
//! [seed]
//! reference_data = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use turf_core::MAX_SLOTS_PER_BOOKING;

use crate::error::{StoreError, StoreResult};

/// Config file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "turf.toml";

// =============================================================================
// Booking Policy
// =============================================================================

/// Rules applied when a booking is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingPolicy {
    /// Start new bookings as `confirmed` instead of `pending`.
    #[serde(default)]
    pub auto_confirm: bool,

    /// Most slots one booking may hold.
    #[serde(default = "default_max_slots")]
    pub max_slots_per_booking: usize,
}

fn default_max_slots() -> usize {
    MAX_SLOTS_PER_BOOKING
}

impl Default for BookingPolicy {
    fn default() -> Self {
        BookingPolicy {
            auto_confirm: false,
            max_slots_per_booking: default_max_slots(),
        }
    }
}

// =============================================================================
// Locking
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockSettings {
    /// How long an operation waits for the store lock before failing
    /// with a retryable Busy error.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_ms: u64,
}

fn default_acquire_timeout() -> u64 {
    2000
}

impl Default for LockSettings {
    fn default() -> Self {
        LockSettings {
            acquire_timeout_ms: default_acquire_timeout(),
        }
    }
}

impl LockSettings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }
}

// =============================================================================
// Sweep
// =============================================================================

/// Completion sweep schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_sweep_interval")]
    pub interval_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_sweep_interval() -> u64 {
    60
}

impl Default for SweepSettings {
    fn default() -> Self {
        SweepSettings {
            enabled: true,
            interval_secs: default_sweep_interval(),
        }
    }
}

impl SweepSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

// =============================================================================
// Seeding
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSettings {
    /// Load the reference cities and turfs into a new store.
    #[serde(default = "default_true")]
    pub reference_data: bool,
}

impl Default for SeedSettings {
    fn default() -> Self {
        SeedSettings {
            reference_data: true,
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete store configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub booking: BookingPolicy,

    #[serde(default)]
    pub locking: LockSettings,

    #[serde(default)]
    pub sweep: SweepSettings,

    #[serde(default)]
    pub seed: SeedSettings,
}

impl StoreConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (turf.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> StoreResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading store config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load store config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a TOML document. Missing sections take their defaults.
    pub fn from_toml(contents: &str) -> StoreResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> StoreResult<()> {
        if self.booking.max_slots_per_booking == 0 {
            return Err(StoreError::Config(
                "max_slots_per_booking must be greater than 0".into(),
            ));
        }

        if self.booking.max_slots_per_booking > MAX_SLOTS_PER_BOOKING {
            return Err(StoreError::Config(format!(
                "max_slots_per_booking cannot exceed {}",
                MAX_SLOTS_PER_BOOKING
            )));
        }

        if self.locking.acquire_timeout_ms == 0 {
            return Err(StoreError::Config(
                "acquire_timeout_ms must be greater than 0".into(),
            ));
        }

        if self.sweep.enabled && self.sweep.interval_secs == 0 {
            return Err(StoreError::Config(
                "sweep interval_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides read through `var`.
    ///
    /// Unparseable values are logged and ignored.
    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(value) = var("TURF_AUTO_CONFIRM") {
            match parse_bool(&value) {
                Some(on) => {
                    debug!(auto_confirm = on, "Overriding auto_confirm from environment");
                    self.booking.auto_confirm = on;
                }
                None => warn!(value = %value, "Invalid TURF_AUTO_CONFIRM"),
            }
        }

        if let Some(value) = var("TURF_LOCK_TIMEOUT_MS") {
            match value.trim().parse::<u64>() {
                Ok(ms) => {
                    debug!(ms, "Overriding lock timeout from environment");
                    self.locking.acquire_timeout_ms = ms;
                }
                Err(_) => warn!(value = %value, "Invalid TURF_LOCK_TIMEOUT_MS"),
            }
        }

        if let Some(value) = var("TURF_SWEEP_INTERVAL_SECS") {
            match value.trim().parse::<u64>() {
                Ok(secs) => self.sweep.interval_secs = secs,
                Err(_) => warn!(value = %value, "Invalid TURF_SWEEP_INTERVAL_SECS"),
            }
        }

        if let Some(value) = var("TURF_SWEEP_ENABLED") {
            match parse_bool(&value) {
                Some(on) => self.sweep.enabled = on,
                None => warn!(value = %value, "Invalid TURF_SWEEP_ENABLED"),
            }
        }

        if let Some(value) = var("TURF_SEED_REFERENCE_DATA") {
            match parse_bool(&value) {
                Some(on) => self.seed.reference_data = on,
                None => warn!(value = %value, "Invalid TURF_SEED_REFERENCE_DATA"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "turfbook", "turfbook")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
