use anyhow::{Context, Result};
use colored::Colorize;
use skymate_game::{
    SessionConfig, SessionSnapshot, SettingsPatch, SpinError, SpinResolution, SpinSession,
};
use std::sync::Arc;

use crate::logic::policy::TravelerStrategy;

/// Spins per journey when neither the plan nor the CLI says otherwise.
pub const DEFAULT_JOURNEY_SPINS: u32 = 25;

/// Scripted journey: who travels, for how long, and what must hold afterwards.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub strategy: TravelerStrategy,
    pub spins: Option<u32>,
    pub settings: SettingsPatch,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new(strategy: TravelerStrategy) -> Self {
        Self {
            strategy,
            spins: None,
            settings: SettingsPatch::default(),
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_spins(mut self, spins: u32) -> Self {
        self.spins = Some(spins);
        self
    }

    #[must_use]
    pub const fn with_settings(mut self, settings: SettingsPatch) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Assertion hook run after a journey completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// One spin of a journey and what the traveler made of it.
#[derive(Debug, Clone)]
pub struct SpinRecord {
    pub spin: u32,
    pub from: String,
    pub drawn: String,
    pub distance_miles: u32,
    pub accepted: bool,
    pub rationale: Option<String>,
}

/// Complete record of a journey run.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub strategy: TravelerStrategy,
    pub spins_requested: u32,
    pub records: Vec<SpinRecord>,
    pub retries: u32,
    pub dead_end: Option<String>,
    pub draws: u64,
    pub final_snapshot: SessionSnapshot,
}

impl SimulationSummary {
    #[must_use]
    pub fn accepted(&self) -> impl Iterator<Item = &SpinRecord> {
        self.records.iter().filter(|record| record.accepted)
    }
}

/// Headless deterministic runner for roulette journeys.
#[derive(Debug, Clone)]
pub struct JourneyTester {
    verbose: bool,
    base: SessionConfig,
    default_spins: u32,
}

impl JourneyTester {
    #[must_use]
    pub const fn new(base: SessionConfig, default_spins: u32, verbose: bool) -> Self {
        Self {
            verbose,
            base,
            default_spins,
        }
    }

    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    /// Drive a fresh session through `plan` with the given seed.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be built, the plan's settings are
    /// rejected, or the engine refuses a command the runner issued.
    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> Result<SimulationSummary> {
        let spins = plan.spins.unwrap_or(self.default_spins);
        let config = self.base.clone().with_seed(seed);
        let mut session = SpinSession::with_builtin_network(config)
            .with_context(|| format!("failed to start session at {}", self.base.start))?;
        session
            .update_settings(plan.settings)
            .context("plan settings rejected")?;
        let mut policy = plan.strategy.create_policy(seed);
        if self.verbose {
            println!(
                "  🛫 {} from {} (ratio {:.1}, radius {} km, retry {})",
                policy.name().bright_white(),
                session.current_airport().iata,
                session.settings().big_airport_ratio,
                session.settings().exclude_radius_km,
                session.settings().retry_mode
            );
        }

        let mut records = Vec::new();
        let mut retries = 0;
        let mut dead_end = None;

        for spin in 1..=spins {
            let from = session.current_airport().iata.clone();
            match session.start_spin() {
                Ok(_) => {}
                Err(SpinError::DeadEnd { airport, .. }) => {
                    log::info!("journey halted at dead end {airport}");
                    dead_end = Some(airport);
                    break;
                }
                Err(err) => return Err(err).context("start spin"),
            }

            let record = match session.complete_spin().context("complete spin")? {
                SpinResolution::Committed(item) => SpinRecord {
                    spin,
                    from,
                    drawn: item.to,
                    distance_miles: item.distance,
                    accepted: true,
                    rationale: None,
                },
                SpinResolution::Pending(airport) => {
                    let quote = session.quote(&airport);
                    let decision = policy.decide(&quote);
                    if decision.accept {
                        session.confirm().context("confirm")?;
                    } else {
                        session.retry().context("retry")?;
                        retries += 1;
                    }
                    SpinRecord {
                        spin,
                        from,
                        drawn: airport.iata,
                        distance_miles: quote.distance_miles,
                        accepted: decision.accept,
                        rationale: decision.rationale,
                    }
                }
            };

            if self.verbose {
                log_spin(&record);
            }
            records.push(record);
        }

        Ok(SimulationSummary {
            seed,
            strategy: plan.strategy,
            spins_requested: spins,
            records,
            retries,
            dead_end,
            draws: session.draws(),
            final_snapshot: session.snapshot(),
        })
    }
}

fn log_spin(record: &SpinRecord) {
    let verdict = if record.accepted {
        "flew".green()
    } else {
        "retried".yellow()
    };
    println!(
        "    #{:<3} {} -> {} ({} mi) {} {}",
        record.spin,
        record.from,
        record.drawn,
        record.distance_miles,
        verdict,
        record.rationale.as_deref().unwrap_or("")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use skymate_game::AppSettings;

    fn tester() -> JourneyTester {
        JourneyTester::new(SessionConfig::default(), 10, false)
    }

    #[test]
    fn immediate_journey_accepts_every_spin() {
        let plan = SimulationPlan::new(TravelerStrategy::AlwaysConfirm);
        let summary = tester().run_plan(&plan, 5).unwrap();
        assert_eq!(summary.records.len(), 10);
        assert_eq!(summary.retries, 0);
        assert!(summary.dead_end.is_none());
        assert_eq!(summary.final_snapshot.history.len(), 10);
        assert!(summary.draws >= 10);
    }

    #[test]
    fn retry_journey_counts_rejections() {
        let plan = SimulationPlan::new(TravelerStrategy::RetryShortHops)
            .with_spins(40)
            .with_settings(SettingsPatch::default().retry_mode(true));
        let summary = tester().run_plan(&plan, 9).unwrap();
        let accepted = summary.accepted().count();
        assert_eq!(accepted + summary.retries as usize, 40);
        assert_eq!(summary.final_snapshot.history.len(), accepted);
    }

    #[test]
    fn dead_end_stops_the_journey() {
        let base = SessionConfig::default()
            .with_start("TRA")
            .with_settings(AppSettings {
                exclude_radius_km: 100.0,
                ..AppSettings::default()
            });
        let tester = JourneyTester::new(base, 5, false);
        let summary = tester
            .run_plan(&SimulationPlan::new(TravelerStrategy::AlwaysConfirm), 1)
            .unwrap();
        assert_eq!(summary.dead_end.as_deref(), Some("TRA"));
        assert!(summary.records.is_empty());
    }

    #[test]
    fn invalid_plan_settings_fail() {
        let plan = SimulationPlan::new(TravelerStrategy::AlwaysConfirm)
            .with_settings(SettingsPatch::default().big_airport_ratio(2.0));
        assert!(tester().run_plan(&plan, 1).is_err());
    }
}
