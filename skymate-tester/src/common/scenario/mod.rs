pub mod catalog;

use anyhow::Result;
use skymate_game::SettingsPatch;

use crate::logic::{SimulationPlan, SimulationSummary, TravelerStrategy};
use catalog::find_catalog_scenario;

/// Scenario keys in the order `all` expands to.
pub const ALL_SCENARIOS: &[&str] = &[
    "smoke",
    "retry-round-trip",
    "coin-flip",
    "dead-end",
    "big-ratio-extremes",
    "radius-bounds",
    "reset-every-state",
    "determinism",
    "settings-lock",
];

// Logic test scenario
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn simulation(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

/// Committed history must replay the accepted spins in order and chain leg to leg.
fn ledger_expectation(summary: &SimulationSummary) -> Result<()> {
    let snapshot = &summary.final_snapshot;
    let history = snapshot.history.all();
    let accepted: Vec<_> = summary.accepted().collect();
    anyhow::ensure!(
        history.len() == accepted.len(),
        "history has {} legs but {} spins were accepted",
        history.len(),
        accepted.len()
    );

    let mut miles = 0_u64;
    for (idx, (item, record)) in history.iter().zip(&accepted).enumerate() {
        anyhow::ensure!(
            item.flight_number as usize == idx + 1,
            "flight {} recorded at position {}",
            item.flight_number,
            idx + 1
        );
        anyhow::ensure!(
            item.from == record.from && item.to == record.drawn,
            "leg {} is {} -> {} but the spin drew {} -> {}",
            item.flight_number,
            item.from,
            item.to,
            record.from,
            record.drawn
        );
        if let Some(previous) = idx.checked_sub(1).and_then(|prev| history.get(prev)) {
            anyhow::ensure!(
                previous.to == item.from,
                "leg {} does not depart from {}",
                item.flight_number,
                previous.to
            );
        }
        anyhow::ensure!(
            item.earned_miles == item.distance,
            "leg {} earned {} for {} mi",
            item.flight_number,
            item.earned_miles,
            item.distance
        );
        miles += u64::from(item.distance);
    }
    anyhow::ensure!(
        snapshot.total_miles == miles && snapshot.total_earned_miles == miles,
        "totals {} / {} do not match {miles} mi flown",
        snapshot.total_miles,
        snapshot.total_earned_miles
    );
    if let Some(last) = history.last() {
        anyhow::ensure!(
            snapshot.current_airport == last.to,
            "traveler at {} after landing at {}",
            snapshot.current_airport,
            last.to
        );
    }
    if summary.dead_end.is_none() {
        anyhow::ensure!(
            summary.records.len() == summary.spins_requested as usize,
            "journey stopped after {} of {} spins",
            summary.records.len(),
            summary.spins_requested
        );
    }
    Ok(())
}

/// Retried spins must leave the traveler where they were.
fn retry_expectation(summary: &SimulationSummary) -> Result<()> {
    let rejected = summary.records.iter().filter(|r| !r.accepted).count();
    anyhow::ensure!(
        rejected == summary.retries as usize,
        "{rejected} rejected spins but {} retries counted",
        summary.retries
    );
    for pair in summary.records.windows(2) {
        if !pair[0].accepted {
            anyhow::ensure!(
                pair[1].from == pair[0].from,
                "spin {} moved the traveler despite a retry",
                pair[0].spin
            );
        }
    }
    Ok(())
}

fn immediate_expectation(summary: &SimulationSummary) -> Result<()> {
    anyhow::ensure!(
        summary.retries == 0 && summary.records.iter().all(|r| r.accepted),
        "immediate mode must commit every spin"
    );
    Ok(())
}

fn smoke_scenario() -> TestScenario {
    TestScenario::simulation(
        "Smoke Journey",
        SimulationPlan::new(TravelerStrategy::AlwaysConfirm)
            .with_settings(SettingsPatch::default().retry_mode(false))
            .with_expectation(ledger_expectation)
            .with_expectation(immediate_expectation),
    )
}

fn retry_round_trip_scenario() -> TestScenario {
    TestScenario::simulation(
        "Retry Round Trip",
        SimulationPlan::new(TravelerStrategy::RetryShortHops)
            .with_settings(SettingsPatch::default().retry_mode(true))
            .with_expectation(ledger_expectation)
            .with_expectation(retry_expectation),
    )
}

fn coin_flip_scenario() -> TestScenario {
    TestScenario::simulation(
        "Coin Flip Traveler",
        SimulationPlan::new(TravelerStrategy::CoinFlip)
            .with_settings(SettingsPatch::default().retry_mode(true))
            .with_expectation(ledger_expectation)
            .with_expectation(retry_expectation),
    )
}

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    match name.to_lowercase().as_str() {
        "smoke" => Some(smoke_scenario()),
        "retry-round-trip" | "retry" => Some(retry_round_trip_scenario()),
        "coin-flip" | "coin" => Some(coin_flip_scenario()),
        "dead-end" => find_catalog_scenario("Dead End Handling"),
        "big-ratio-extremes" | "ratio" => find_catalog_scenario("Big Airport Ratio Extremes"),
        "radius-bounds" | "radius" => find_catalog_scenario("Exclusion Radius Bounds"),
        "reset-every-state" | "reset" => find_catalog_scenario("Reset From Every State"),
        "determinism" | "deterministic" => find_catalog_scenario("Deterministic Journeys"),
        "settings-lock" | "lock" => find_catalog_scenario("Settings Lock"),
        _ => None,
    }
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    vec![
        ("smoke", "Smoke Journey"),
        ("retry-round-trip", "Retry Round Trip"),
        ("coin-flip", "Coin Flip Traveler"),
        ("dead-end", "Dead End Handling"),
        ("big-ratio-extremes", "Big Airport Ratio Extremes"),
        ("radius-bounds", "Exclusion Radius Bounds"),
        ("reset-every-state", "Reset From Every State"),
        ("determinism", "Deterministic Journeys"),
        ("settings-lock", "Settings Lock"),
    ]
}
