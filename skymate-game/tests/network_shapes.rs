use std::collections::HashSet;
use std::fmt::Write as _;
use std::hash::Hasher;

use skymate_game::{AirportGraph, AirportSize, AppSettings, select_candidates};
use twox_hash::XxHash64;

const NETWORK_SHAPE_HASH: u64 = 0xa8b6_a1e7_71d1_c64c;

#[test]
fn network_shape_snapshot_stable() {
    let graph = AirportGraph::builtin();
    let mut canonical = String::new();
    for airport in graph.all() {
        writeln!(
            canonical,
            "{}|{:?}|{:?}|{}",
            airport.iata,
            airport.size,
            airport.region,
            airport.connections.join(",")
        )
        .unwrap();
    }
    let digest = snapshot_hash(canonical.as_bytes());
    assert_eq!(
        digest, NETWORK_SHAPE_HASH,
        "airport network shape changed\n{canonical}"
    );
}

#[test]
fn builtin_network_counts() {
    let graph = AirportGraph::builtin();
    assert_eq!(graph.len(), 57);
    let routes: usize = graph.all().iter().map(|a| a.connections.len()).sum();
    assert_eq!(routes, 256);
    let hubs = graph.all().iter().filter(|a| a.size == AirportSize::Big).count();
    assert_eq!(hubs, 9);
    assert!(graph.unresolved_connections().is_empty());
    for airport in graph.all() {
        assert!(
            !airport.connections.contains(&airport.iata),
            "{} routes to itself",
            airport.iata
        );
    }
}

#[test]
fn every_airport_reachable_from_haneda() {
    let graph = AirportGraph::builtin();
    let mut seen: HashSet<&str> = HashSet::from(["HND"]);
    let mut stack = vec!["HND"];
    while let Some(code) = stack.pop() {
        for next in graph.neighbors(code) {
            if seen.insert(next.as_str()) {
                stack.push(next.as_str());
            }
        }
    }
    assert_eq!(seen.len(), graph.len());
}

#[test]
fn distances_are_symmetric_for_every_pair() {
    let graph = AirportGraph::builtin();
    for a in graph.all() {
        assert_eq!(a.distance_to(a), 0);
        for b in graph.all() {
            assert_eq!(a.distance_to(b), b.distance_to(a), "{} <-> {}", a.iata, b.iata);
        }
    }
}

#[test]
fn candidates_respect_radius_everywhere() {
    let graph = AirportGraph::builtin();
    for radius in [0.0, 24.0, 50.0, 100.0, 250.0, 500.0] {
        let settings = AppSettings {
            exclude_radius_km: radius,
            ..AppSettings::default()
        };
        for airport in graph.all() {
            let candidates = select_candidates(&graph, airport, &settings);
            let kept: HashSet<&str> = candidates.iter().map(|c| c.iata.as_str()).collect();
            for code in &airport.connections {
                let dest = graph.get(code).unwrap();
                let km = f64::from(airport.distance_km_to(dest));
                assert_eq!(
                    kept.contains(code.as_str()),
                    km >= radius,
                    "{} -> {code} at {km} km with radius {radius}",
                    airport.iata
                );
            }
        }
    }
}

#[test]
fn default_radius_leaves_no_dead_ends() {
    let graph = AirportGraph::builtin();
    let settings = AppSettings::default();
    for airport in graph.all() {
        assert!(
            !select_candidates(&graph, airport, &settings).is_empty(),
            "{} is a dead end at the default radius",
            airport.iata
        );
    }
}

#[test]
fn known_legs_match_reference_distances() {
    let graph = AirportGraph::builtin();
    let leg = |from: &str, to: &str| {
        let a = graph.get(from).unwrap();
        let b = graph.get(to).unwrap();
        (a.distance_to(b), a.distance_km_to(b))
    };
    assert_eq!(leg("HND", "CTS").0, 510);
    assert_eq!(leg("HND", "OKA"), (966, 1555));
    assert_eq!(leg("TRA", "MMY").1, 64);
    assert_eq!(leg("KTD", "MMD").1, 13);
    assert_eq!(leg("KJK", "ASJ").1, 24);
}

fn snapshot_hash(bytes: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(bytes);
    hasher.finish()
}
