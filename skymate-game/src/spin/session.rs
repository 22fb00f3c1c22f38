use std::sync::Arc;

use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use super::{SessionConfig, SpinCommand, SpinError, SpinPhase, SpinResolution, SpinStart};
use crate::airport::{Airport, AirportGraph};
use crate::constants::{ACCRUAL_RATE, LOG_TARGET_SPIN};
use crate::geo::{self, FlightDuration};
use crate::ledger::{HistoryLedger, TravelHistoryItem};
use crate::numbers::{round_f64_to_u32, u32_to_f64};
use crate::rng::CountingRng;
use crate::selector::{choose_destination, select_candidates};
use crate::settings::{AppSettings, SettingsPatch};

/// Distance, earnings and block time for a prospective leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightQuote {
    pub from: String,
    pub to: String,
    pub distance_miles: u32,
    pub distance_km: u32,
    pub earned_miles: u32,
    pub flight_time: FlightDuration,
}

/// Serializable view of everything a presentation layer observes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub current_airport: String,
    pub phase: SpinPhase,
    pub settings: AppSettings,
    pub history: HistoryLedger,
    pub total_miles: u64,
    pub total_earned_miles: u64,
    pub valid_destinations: Vec<String>,
}

/// Single-owner roulette session over a shared, read-only airport network.
#[derive(Debug, Clone)]
pub struct SpinSession {
    graph: Arc<AirportGraph>,
    config: SessionConfig,
    start: Airport,
    current: Airport,
    settings: AppSettings,
    phase: SpinPhase,
    ledger: HistoryLedger,
    rng: CountingRng<SmallRng>,
}

impl SpinSession {
    /// Construct a session positioned at the configured starting airport.
    ///
    /// # Errors
    ///
    /// Returns an error if the starting airport is not in the graph or the
    /// configured settings are out of range.
    pub fn new(graph: Arc<AirportGraph>, config: SessionConfig) -> Result<Self, SpinError> {
        config.settings.validate()?;
        let start = graph
            .get(&config.start)
            .cloned()
            .ok_or_else(|| SpinError::UnknownAirport(config.start.clone()))?;
        Ok(Self {
            current: start.clone(),
            settings: config.settings,
            phase: SpinPhase::Idle,
            ledger: HistoryLedger::new(),
            rng: CountingRng::roulette(config.seed),
            graph,
            config,
            start,
        })
    }

    /// Construct a session over the compiled-in network.
    ///
    /// # Errors
    ///
    /// See [`SpinSession::new`].
    pub fn with_builtin_network(config: SessionConfig) -> Result<Self, SpinError> {
        Self::new(AirportGraph::builtin(), config)
    }

    #[must_use]
    pub const fn current_airport(&self) -> &Airport {
        &self.current
    }

    #[must_use]
    pub const fn is_spinning(&self) -> bool {
        self.phase.is_spinning()
    }

    #[must_use]
    pub const fn target_airport(&self) -> Option<&Airport> {
        self.phase.target()
    }

    #[must_use]
    pub const fn pending_airport(&self) -> Option<&Airport> {
        self.phase.pending()
    }

    #[must_use]
    pub const fn phase(&self) -> &SpinPhase {
        &self.phase
    }

    #[must_use]
    pub const fn settings(&self) -> &AppSettings {
        &self.settings
    }

    #[must_use]
    pub const fn history(&self) -> &HistoryLedger {
        &self.ledger
    }

    #[must_use]
    pub fn total_miles(&self) -> u64 {
        self.ledger.total_distance()
    }

    #[must_use]
    pub fn total_earned_miles(&self) -> u64 {
        self.ledger.total_earned()
    }

    /// Destinations the next spin may land on, recomputed from the current state.
    #[must_use]
    pub fn valid_destinations(&self) -> Vec<&Airport> {
        select_candidates(&self.graph, &self.current, &self.settings)
    }

    #[must_use]
    pub fn graph(&self) -> &AirportGraph {
        &self.graph
    }

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Draw calls consumed from the roulette stream so far.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.rng.draws()
    }

    /// Draw the next destination and hold it until `complete_spin`.
    ///
    /// While a spin or pending result is outstanding this is a no-op that
    /// reports the outstanding airport.
    ///
    /// # Errors
    ///
    /// Returns [`SpinError::DeadEnd`] when no destination passes the filters.
    pub fn start_spin(&mut self) -> Result<SpinStart, SpinError> {
        match &self.phase {
            SpinPhase::Spinning { target } => {
                log::debug!(target: LOG_TARGET_SPIN, "spin already running toward {}", target.iata);
                return Ok(SpinStart::AlreadySpinning(target.clone()));
            }
            SpinPhase::Pending { pending } => {
                log::debug!(target: LOG_TARGET_SPIN, "{} still awaits a decision", pending.iata);
                return Ok(SpinStart::AwaitingDecision(pending.clone()));
            }
            SpinPhase::Idle => {}
        }

        let candidates = select_candidates(&self.graph, &self.current, &self.settings);
        let target = choose_destination(&candidates, &self.settings, &mut self.rng)
            .map_err(|source| {
                log::info!(
                    target: LOG_TARGET_SPIN,
                    "dead end at {} (radius {} km)",
                    self.current.iata,
                    self.settings.exclude_radius_km
                );
                SpinError::DeadEnd {
                    airport: self.current.iata.clone(),
                    source,
                }
            })?
            .clone();

        log::debug!(
            target: LOG_TARGET_SPIN,
            "spin from {} drew {} out of {} candidates",
            self.current.iata,
            target.iata,
            candidates.len()
        );
        self.phase = SpinPhase::Spinning {
            target: target.clone(),
        };
        Ok(SpinStart::Started(target))
    }

    /// Signal that the caller's reveal finished.
    ///
    /// # Errors
    ///
    /// Returns [`SpinError::InvalidTransition`] unless a spin is running.
    pub fn complete_spin(&mut self) -> Result<SpinResolution, SpinError> {
        let SpinPhase::Spinning { target } = &self.phase else {
            return Err(self.invalid(SpinCommand::CompleteSpin));
        };
        let target = target.clone();

        if self.settings.retry_mode {
            log::debug!(target: LOG_TARGET_SPIN, "{} parked for confirmation", target.iata);
            self.phase = SpinPhase::Pending {
                pending: target.clone(),
            };
            Ok(SpinResolution::Pending(target))
        } else {
            self.phase = SpinPhase::Idle;
            Ok(SpinResolution::Committed(self.commit(target)))
        }
    }

    /// Accept the pending result.
    ///
    /// # Errors
    ///
    /// Returns [`SpinError::InvalidTransition`] unless a result is pending.
    pub fn confirm(&mut self) -> Result<TravelHistoryItem, SpinError> {
        let SpinPhase::Pending { pending } = &self.phase else {
            return Err(self.invalid(SpinCommand::Confirm));
        };
        let destination = pending.clone();
        self.phase = SpinPhase::Idle;
        Ok(self.commit(destination))
    }

    /// Discard the pending result without committing it. Does not start a new spin.
    ///
    /// # Errors
    ///
    /// Returns [`SpinError::InvalidTransition`] unless a result is pending.
    pub fn retry(&mut self) -> Result<Airport, SpinError> {
        match std::mem::take(&mut self.phase) {
            SpinPhase::Pending { pending } => {
                log::debug!(target: LOG_TARGET_SPIN, "discarded {}", pending.iata);
                Ok(pending)
            }
            other => {
                self.phase = other;
                Err(self.invalid(SpinCommand::Retry))
            }
        }
    }

    /// Merge a partial settings update.
    ///
    /// # Errors
    ///
    /// Returns [`SpinError::SettingsLocked`] while a spin or pending result is
    /// outstanding, or a validation error if the merged values are out of range.
    pub fn update_settings(&mut self, patch: SettingsPatch) -> Result<AppSettings, SpinError> {
        if patch.is_empty() {
            return Ok(self.settings);
        }
        if !self.phase.is_idle() {
            log::debug!(
                target: LOG_TARGET_SPIN,
                "rejected settings change while {}",
                self.phase
            );
            return Err(SpinError::SettingsLocked);
        }
        self.settings = self.settings.merged(&patch)?;
        Ok(self.settings)
    }

    /// Return to the starting airport with an empty history and default settings.
    pub fn reset(&mut self) {
        self.current = self.start.clone();
        self.ledger = HistoryLedger::new();
        self.phase = SpinPhase::Idle;
        self.settings = AppSettings::default();
        log::debug!(target: LOG_TARGET_SPIN, "session reset to {}", self.start.iata);
    }

    /// Replace the roulette stream, e.g. to replay a journey.
    pub fn reseed(&mut self, seed: u64) {
        self.config.seed = seed;
        self.rng = CountingRng::roulette(seed);
    }

    /// Price a leg from the current airport without committing it.
    #[must_use]
    pub fn quote(&self, destination: &Airport) -> FlightQuote {
        let distance_miles = self.current.distance_to(destination);
        FlightQuote {
            from: self.current.iata.clone(),
            to: destination.iata.clone(),
            distance_miles,
            distance_km: geo::miles_to_km(distance_miles),
            earned_miles: round_f64_to_u32(u32_to_f64(distance_miles) * ACCRUAL_RATE),
            flight_time: geo::flight_duration(distance_miles),
        }
    }

    /// Quote for the pending result, if any.
    #[must_use]
    pub fn pending_quote(&self) -> Option<FlightQuote> {
        self.pending_airport().map(|airport| self.quote(airport))
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current_airport: self.current.iata.clone(),
            phase: self.phase.clone(),
            settings: self.settings,
            history: self.ledger.clone(),
            total_miles: self.total_miles(),
            total_earned_miles: self.total_earned_miles(),
            valid_destinations: self
                .valid_destinations()
                .into_iter()
                .map(|airport| airport.iata.clone())
                .collect(),
        }
    }

    fn commit(&mut self, destination: Airport) -> TravelHistoryItem {
        let quote = self.quote(&destination);
        let item = TravelHistoryItem {
            from: quote.from,
            to: quote.to,
            distance: quote.distance_miles,
            earned_miles: quote.earned_miles,
            flight_time: quote.flight_time.to_string(),
            flight_number: self.ledger.next_flight_number(),
        };
        log::info!(
            target: LOG_TARGET_SPIN,
            "flight {}: {} -> {} ({} mi, {})",
            item.flight_number,
            item.from,
            item.to,
            item.distance,
            item.flight_time
        );
        self.ledger.append(item.clone());
        self.current = destination;
        item
    }

    fn invalid(&self, command: SpinCommand) -> SpinError {
        log::debug!(target: LOG_TARGET_SPIN, "rejected {command} while {}", self.phase);
        SpinError::InvalidTransition {
            command,
            phase: self.phase.label(),
        }
    }
}
