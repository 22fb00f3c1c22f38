//! Candidate derivation and the two-stage weighted destination draw.
use rand::Rng;
use smallvec::SmallVec;
use thiserror::Error;

use crate::airport::{Airport, AirportGraph, AirportSize};
use crate::constants::LOG_TARGET_SELECTOR;
use crate::settings::AppSettings;

type ClassBucket<'a> = SmallVec<[&'a Airport; 16]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("no valid destinations remain after filtering")]
    NoCandidates,
}

/// Resolve the outbound routes of `current` into eligible destinations.
///
/// Codes that do not resolve are dropped, as are airports strictly closer
/// than the exclusion radius. Repeated codes yield a single candidate.
#[must_use]
pub fn select_candidates<'g>(
    graph: &'g AirportGraph,
    current: &Airport,
    settings: &AppSettings,
) -> Vec<&'g Airport> {
    let mut candidates: Vec<&'g Airport> = Vec::with_capacity(current.connections.len());
    for code in &current.connections {
        let Some(airport) = graph.get(code) else {
            log::debug!(
                target: LOG_TARGET_SELECTOR,
                "{} lists unknown connection {code}; skipping",
                current.iata
            );
            continue;
        };
        if candidates.iter().any(|seen| seen.iata == airport.iata) {
            continue;
        }
        let distance_km = f64::from(current.distance_km_to(airport));
        if distance_km < settings.exclude_radius_km {
            continue;
        }
        candidates.push(airport);
    }
    candidates
}

/// Pick one destination: hub-or-regional class first, then uniformly within it.
///
/// The class roll only happens when both classes are present, so a lone hub
/// among many regionals is still drawn with probability `big_airport_ratio`.
///
/// # Errors
///
/// Returns [`SelectionError::NoCandidates`] when `candidates` is empty.
pub fn choose_destination<'a, R>(
    candidates: &[&'a Airport],
    settings: &AppSettings,
    rng: &mut R,
) -> Result<&'a Airport, SelectionError>
where
    R: Rng + ?Sized,
{
    if candidates.is_empty() {
        return Err(SelectionError::NoCandidates);
    }

    let (big, small): (ClassBucket<'a>, ClassBucket<'a>) = candidates
        .iter()
        .copied()
        .partition(|airport| airport.size.is_big());

    let bucket = if big.is_empty() {
        &small
    } else if small.is_empty() {
        &big
    } else {
        let roll = rng.r#gen::<f64>();
        let class = if roll < settings.big_airport_ratio {
            AirportSize::Big
        } else {
            AirportSize::Small
        };
        log::debug!(
            target: LOG_TARGET_SELECTOR,
            "class roll {roll:.3} against ratio {:.2} -> {class:?}",
            settings.big_airport_ratio
        );
        if class.is_big() { &big } else { &small }
    };

    let idx = rng.gen_range(0..bucket.len());
    Ok(bucket[idx])
}
