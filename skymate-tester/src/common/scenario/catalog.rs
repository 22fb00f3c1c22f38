use anyhow::{Result, anyhow};

use crate::common::scenario::TestScenario;
use crate::logic::{SimulationPlan, SimulationSummary, TravelerStrategy};
use skymate_game::{
    AirportGraph, AirportSize, AppSettings, SessionConfig, SettingsPatch, SpinError,
    SpinResolution, SpinSession, SpinStart, select_candidates,
};

const CLASS_TRIALS: usize = 60;

pub fn catalog_scenarios() -> Vec<TestScenario> {
    vec![
        TestScenario::simulation(
            "Dead End Handling",
            base_plan().with_expectation(dead_end_expectation),
        ),
        TestScenario::simulation(
            "Big Airport Ratio Extremes",
            base_plan().with_expectation(ratio_extremes_expectation),
        ),
        TestScenario::simulation(
            "Exclusion Radius Bounds",
            base_plan().with_expectation(radius_bounds_expectation),
        ),
        TestScenario::simulation(
            "Reset From Every State",
            base_plan().with_expectation(reset_expectation),
        ),
        TestScenario::simulation(
            "Deterministic Journeys",
            base_plan().with_expectation(determinism_expectation),
        ),
        TestScenario::simulation(
            "Settings Lock",
            base_plan().with_expectation(settings_lock_expectation),
        ),
    ]
}

pub fn find_catalog_scenario(name: &str) -> Option<TestScenario> {
    catalog_scenarios()
        .into_iter()
        .find(|scenario| scenario.name == name)
}

fn base_plan() -> SimulationPlan {
    SimulationPlan::new(TravelerStrategy::AlwaysConfirm).with_spins(0)
}

fn session_at(start: &str, seed: u64, settings: AppSettings) -> Result<SpinSession> {
    let config = SessionConfig::default()
        .with_start(start)
        .with_seed(seed)
        .with_settings(settings);
    Ok(SpinSession::with_builtin_network(config)?)
}

fn retry_settings() -> AppSettings {
    AppSettings {
        retry_mode: true,
        ..AppSettings::default()
    }
}

fn dead_end_expectation(summary: &SimulationSummary) -> Result<()> {
    let settings = AppSettings {
        exclude_radius_km: 65.0,
        ..AppSettings::default()
    };
    let mut session = session_at("TRA", summary.seed, settings)?;
    let err = session
        .start_spin()
        .err()
        .ok_or_else(|| anyhow!("TRA should be a dead end at a 65 km radius"))?;
    anyhow::ensure!(
        matches!(err, SpinError::DeadEnd { .. }),
        "expected a dead end, got {err}"
    );
    anyhow::ensure!(
        session.phase().is_idle() && session.history().is_empty(),
        "dead end must leave the session untouched"
    );

    session.update_settings(SettingsPatch::default().exclude_radius_km(64.0))?;
    let start = session.start_spin()?;
    anyhow::ensure!(
        start.airport().iata == "MMY",
        "TRA's only route leads to MMY, drew {}",
        start.airport().iata
    );
    Ok(())
}

fn ratio_extremes_expectation(summary: &SimulationSummary) -> Result<()> {
    for (ratio, expected) in [(1.0, AirportSize::Big), (0.0, AirportSize::Small)] {
        let settings = AppSettings {
            big_airport_ratio: ratio,
            ..retry_settings()
        };
        let mut session = session_at("HND", summary.seed, settings)?;
        for _ in 0..CLASS_TRIALS {
            let SpinStart::Started(target) = session.start_spin()? else {
                anyhow::bail!("idle session did not draw");
            };
            anyhow::ensure!(
                target.size == expected,
                "ratio {ratio} drew {} ({:?})",
                target.iata,
                target.size
            );
            session.complete_spin()?;
            session.retry()?;
        }
    }
    Ok(())
}

fn radius_bounds_expectation(_summary: &SimulationSummary) -> Result<()> {
    let graph = AirportGraph::builtin();
    for radius in [0.0, 50.0, 150.0, 300.0, 500.0] {
        let settings = AppSettings {
            exclude_radius_km: radius,
            ..AppSettings::default()
        };
        for airport in graph.all() {
            let candidates = select_candidates(&graph, airport, &settings);
            for candidate in &candidates {
                let km = f64::from(airport.distance_km_to(candidate));
                anyhow::ensure!(
                    km >= radius,
                    "{} offered {} at {km} km inside {radius} km",
                    airport.iata,
                    candidate.iata
                );
            }
            for code in &airport.connections {
                let Some(dest) = graph.get(code) else {
                    continue;
                };
                let kept = candidates.iter().any(|c| c.iata == dest.iata);
                let km = f64::from(airport.distance_km_to(dest));
                anyhow::ensure!(
                    kept || km < radius,
                    "{} dropped {code} at {km} km with radius {radius}",
                    airport.iata
                );
            }
        }
    }

    for bad in [
        SettingsPatch::default().exclude_radius_km(-1.0),
        SettingsPatch::default().exclude_radius_km(f64::INFINITY),
        SettingsPatch::default().big_airport_ratio(1.5),
        SettingsPatch::default().big_airport_ratio(f64::NAN),
    ] {
        anyhow::ensure!(
            AppSettings::default().merged(&bad).is_err(),
            "settings patch {bad:?} should be rejected"
        );
    }
    Ok(())
}

fn reset_expectation(summary: &SimulationSummary) -> Result<()> {
    let mut session = session_at("HND", summary.seed, retry_settings())?;
    let check = |session: &SpinSession, label: &str| -> Result<()> {
        anyhow::ensure!(
            session.current_airport().iata == "HND"
                && session.phase().is_idle()
                && session.history().is_empty()
                && session.settings() == &AppSettings::default(),
            "reset from {label} left the session dirty"
        );
        Ok(())
    };
    let retry_on = SettingsPatch::default().retry_mode(true);

    session.reset();
    check(&session, "fresh idle")?;

    session.update_settings(retry_on)?;
    for _ in 0..3 {
        session.start_spin()?;
        session.complete_spin()?;
        session.confirm()?;
    }
    session.update_settings(SettingsPatch::default().exclude_radius_km(200.0))?;
    session.reset();
    check(&session, "idle after flights")?;

    session.start_spin()?;
    session.reset();
    check(&session, "spinning")?;

    session.update_settings(retry_on)?;
    session.start_spin()?;
    session.complete_spin()?;
    anyhow::ensure!(
        session.pending_airport().is_some(),
        "retry mode should park the draw"
    );
    session.reset();
    check(&session, "pending")?;
    Ok(())
}

fn determinism_expectation(summary: &SimulationSummary) -> Result<()> {
    let fly = |seed: u64| -> Result<Vec<String>> {
        let mut session = session_at("HND", seed, AppSettings::default())?;
        let mut path = Vec::new();
        for _ in 0..30 {
            session.start_spin()?;
            if let SpinResolution::Committed(item) = session.complete_spin()? {
                path.push(item.to);
            }
        }
        Ok(path)
    };
    let first = fly(summary.seed)?;
    let second = fly(summary.seed)?;
    anyhow::ensure!(
        first == second,
        "seed {} produced two different journeys",
        summary.seed
    );
    Ok(())
}

fn settings_lock_expectation(summary: &SimulationSummary) -> Result<()> {
    let mut session = session_at("HND", summary.seed, retry_settings())?;
    let patch = SettingsPatch::default().big_airport_ratio(0.2);

    session.start_spin()?;
    anyhow::ensure!(
        session.update_settings(patch) == Err(SpinError::SettingsLocked),
        "settings must lock while spinning"
    );
    session.complete_spin()?;
    anyhow::ensure!(
        session.update_settings(patch) == Err(SpinError::SettingsLocked),
        "settings must lock while a result is pending"
    );
    anyhow::ensure!(
        session.update_settings(SettingsPatch::default()).is_ok(),
        "an empty patch is always accepted"
    );
    session.retry()?;
    let updated = session.update_settings(patch)?;
    anyhow::ensure!(
        (updated.big_airport_ratio - 0.2).abs() < f64::EPSILON && updated.retry_mode,
        "idle update must merge into the current settings"
    );
    Ok(())
}
