//! Centralized tuning constants for the Skymate roulette engine.
//!
//! These values define the deterministic math for the core simulation.
//! Keeping them together ensures that travel rules can only be adjusted via
//! code changes reviewed in version control.

// Logging targets ----------------------------------------------------------
pub(crate) const LOG_TARGET_SPIN: &str = "skymate::spin";
pub(crate) const LOG_TARGET_SELECTOR: &str = "skymate::selector";
pub(crate) const LOG_TARGET_GRAPH: &str = "skymate::graph";

// Geodesy ------------------------------------------------------------------
pub const EARTH_RADIUS_MILES: f64 = 3958.8;
pub const KM_PER_MILE: f64 = 1.60934;
pub const MILES_PER_KM: f64 = 0.621_371;

// Flight time model --------------------------------------------------------
pub const CRUISE_SPEED_MPH: f64 = 460.0;
/// Taxi, climb and descent overhead added to every leg.
pub const FLIGHT_OVERHEAD_MINUTES: f64 = 40.0;

// Mileage accrual ----------------------------------------------------------
pub const ACCRUAL_RATE: f64 = 1.0;

// Session defaults ---------------------------------------------------------
pub const STARTING_AIRPORT: &str = "HND";
pub const DEFAULT_SEED: u64 = 1337;
pub const DEFAULT_BIG_AIRPORT_RATIO: f64 = 0.6;
pub const DEFAULT_EXCLUDE_RADIUS_KM: f64 = 50.0;
pub const DEFAULT_RETRY_MODE: bool = false;

// Settings bounds ----------------------------------------------------------
pub const BIG_AIRPORT_RATIO_MIN: f64 = 0.0;
pub const BIG_AIRPORT_RATIO_MAX: f64 = 1.0;
pub const EXCLUDE_RADIUS_KM_MIN: f64 = 0.0;

// RNG domain tags ----------------------------------------------------------
pub(crate) const RNG_DOMAIN_ROULETTE: &[u8] = b"roulette";
