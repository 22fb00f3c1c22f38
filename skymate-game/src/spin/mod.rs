//! Spin lifecycle: the state machine that draws, reveals and commits destinations.
mod phase;
mod session;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_SEED, STARTING_AIRPORT};
use crate::selector::SelectionError;
use crate::settings::{AppSettings, SettingsError};

pub use phase::{SpinCommand, SpinPhase, SpinResolution, SpinStart};
pub use session::{FlightQuote, SessionSnapshot, SpinSession};

/// Errors raised by spin session commands. State is unchanged whenever one is returned.
#[derive(Debug, Error, PartialEq)]
pub enum SpinError {
    #[error("dead end at {airport}: {source}")]
    DeadEnd {
        airport: String,
        #[source]
        source: SelectionError,
    },
    #[error("cannot {command} while {phase}")]
    InvalidTransition {
        command: SpinCommand,
        phase: &'static str,
    },
    #[error("settings are locked while a spin result is outstanding")]
    SettingsLocked,
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("unknown airport {0}")]
    UnknownAirport(String),
}

/// Construction-time configuration for a spin session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    #[serde(default = "SessionConfig::default_start")]
    pub start: String,
    /// Settings applied at construction; `reset` falls back to the defaults.
    #[serde(default)]
    pub settings: AppSettings,
    #[serde(default = "SessionConfig::default_seed")]
    pub seed: u64,
}

impl SessionConfig {
    fn default_start() -> String {
        STARTING_AIRPORT.to_string()
    }

    const fn default_seed() -> u64 {
        DEFAULT_SEED
    }

    #[must_use]
    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = start.into();
        self
    }

    #[must_use]
    pub const fn with_settings(mut self, settings: AppSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            start: Self::default_start(),
            settings: AppSettings::default(),
            seed: Self::default_seed(),
        }
    }
}
