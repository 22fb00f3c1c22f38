//! Skymate Roulette Engine
//!
//! Platform-agnostic core logic for the Skymate airport roulette: a traveler
//! starts at Haneda and spins for a random connected destination, accruing
//! miles with every committed flight. No UI or animation lives here.

pub mod airport;
pub mod constants;
pub mod geo;
pub mod ledger;
pub mod numbers;
pub mod rng;
pub mod selector;
pub mod settings;
pub mod spin;

// Re-export commonly used types
pub use airport::{Airport, AirportGraph, AirportSize, GraphError, Region};
pub use geo::{FlightDuration, distance, flight_duration, km_to_miles, miles_to_km};
pub use ledger::{HistoryLedger, LedgerError, TravelHistoryItem};
pub use rng::CountingRng;
pub use selector::{SelectionError, choose_destination, select_candidates};
pub use settings::{AppSettings, SettingsError, SettingsPatch};
pub use spin::{
    FlightQuote, SessionConfig, SessionSnapshot, SpinCommand, SpinError, SpinPhase,
    SpinResolution, SpinSession, SpinStart,
};
