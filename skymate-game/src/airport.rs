//! Static airport network: airport records and the read-only route graph.
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::LOG_TARGET_GRAPH;
use crate::geo;

const DEFAULT_NETWORK_DATA: &str = include_str!("../data/airports.json");

/// Hub classification used by the roulette's two-stage draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AirportSize {
    /// Hubs and major airports.
    Big,
    /// Regional and island airports.
    Small,
}

impl AirportSize {
    #[must_use]
    pub const fn is_big(self) -> bool {
        matches!(self, Self::Big)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Hokkaido,
    Tohoku,
    #[default]
    KantoChubu,
    Kansai,
    ChugokuShikoku,
    Kyushu,
    Nansei,
    Okinawa,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub iata: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub size: AirportSize,
    #[serde(default)]
    pub region: Region,
    /// Outbound routes by IATA code. Directed; may name airports absent from the graph.
    #[serde(default)]
    pub connections: Vec<String>,
}

impl Airport {
    /// Great-circle distance to another airport in whole miles.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> u32 {
        geo::distance(self.lat, self.lng, other.lat, other.lng)
    }

    /// Great-circle distance to another airport in whole kilometres.
    #[must_use]
    pub fn distance_km_to(&self, other: &Self) -> u32 {
        geo::miles_to_km(self.distance_to(other))
    }
}

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("airport network data is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct NetworkFile {
    airports: Vec<Airport>,
}

/// Immutable directed graph of airports keyed by IATA code.
#[derive(Debug, Clone, Default)]
pub struct AirportGraph {
    airports: Vec<Airport>,
    index: HashMap<String, usize>,
}

impl AirportGraph {
    /// Build a graph from records; the first record wins when a code repeats.
    #[must_use]
    pub fn from_airports(airports: impl IntoIterator<Item = Airport>) -> Self {
        let mut graph = Self::default();
        for airport in airports {
            if graph.index.contains_key(&airport.iata) {
                log::warn!(
                    target: LOG_TARGET_GRAPH,
                    "ignoring duplicate airport record {}",
                    airport.iata
                );
                continue;
            }
            graph.index.insert(airport.iata.clone(), graph.airports.len());
            graph.airports.push(airport);
        }
        graph
    }

    /// Parse a `{"airports": [...]}` network table.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into airport records.
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        let file: NetworkFile = serde_json::from_str(json)?;
        Ok(Self::from_airports(file.airports))
    }

    /// Parse the compiled-in network, falling back to an empty graph on malformed data.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_NETWORK_DATA).unwrap_or_else(|err| {
            log::error!(target: LOG_TARGET_GRAPH, "{err}");
            Self::default()
        })
    }

    /// Process-wide shared copy of the compiled-in network.
    #[must_use]
    pub fn builtin() -> Arc<Self> {
        static NETWORK: OnceLock<Arc<AirportGraph>> = OnceLock::new();
        NETWORK
            .get_or_init(|| Arc::new(Self::load_from_static()))
            .clone()
    }

    #[must_use]
    pub fn get(&self, iata: &str) -> Option<&Airport> {
        self.index.get(iata).map(|&idx| &self.airports[idx])
    }

    #[must_use]
    pub fn contains(&self, iata: &str) -> bool {
        self.index.contains_key(iata)
    }

    /// Raw outbound codes for an airport; empty when the code is unknown.
    #[must_use]
    pub fn neighbors(&self, iata: &str) -> &[String] {
        self.get(iata)
            .map_or(&[] as &[String], |airport| airport.connections.as_slice())
    }

    /// All airports in dataset order.
    #[must_use]
    pub fn all(&self) -> &[Airport] {
        &self.airports
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.airports.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }

    /// Connections that do not resolve to an airport in this graph.
    #[must_use]
    pub fn unresolved_connections(&self) -> Vec<(&str, &str)> {
        self.airports
            .iter()
            .flat_map(|airport| {
                airport
                    .connections
                    .iter()
                    .filter(|code| !self.contains(code))
                    .map(move |code| (airport.iata.as_str(), code.as_str()))
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn airport(
        iata: &str,
        lat: f64,
        lng: f64,
        size: AirportSize,
        links: &[&str],
    ) -> Airport {
        Airport {
            iata: iata.to_string(),
            name: iata.to_string(),
            lat,
            lng,
            size,
            region: Region::default(),
            connections: links.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn builtin_network_loads_every_airport() {
        let graph = AirportGraph::builtin();
        assert_eq!(graph.len(), 57);
        assert!(graph.unresolved_connections().is_empty());
        let hnd = graph.get("HND").expect("haneda present");
        assert_eq!(hnd.size, AirportSize::Big);
        assert_eq!(hnd.connections.len(), 36);
        assert_eq!(graph.get("OKD").map(|a| a.region), Some(Region::Hokkaido));
    }

    #[test]
    fn neighbors_are_raw_and_ordered() {
        let graph = AirportGraph::builtin();
        assert_eq!(graph.neighbors("TRA"), ["MMY".to_string()]);
        assert_eq!(graph.neighbors("KTD")[0], "OKA");
        assert!(graph.neighbors("XXX").is_empty());
    }

    #[test]
    fn duplicate_codes_keep_first_record() {
        let graph = AirportGraph::from_airports([
            airport("AAA", 0.0, 0.0, AirportSize::Big, &["BBB"]),
            airport("AAA", 1.0, 1.0, AirportSize::Small, &[]),
        ]);
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.get("AAA").map(|a| a.size), Some(AirportSize::Big));
        assert_eq!(graph.unresolved_connections(), vec![("AAA", "BBB")]);
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = AirportGraph::from_json("{\"airports\": 3}").unwrap_err();
        assert!(err.to_string().contains("malformed"));
    }

    #[test]
    fn parses_size_and_defaults_region() {
        let graph = AirportGraph::from_json(
            r#"{"airports": [{"iata": "ZZZ", "name": "Test", "lat": 1.0, "lng": 2.0, "size": "SMALL"}]}"#,
        )
        .unwrap();
        let zzz = graph.get("ZZZ").unwrap();
        assert_eq!(zzz.size, AirportSize::Small);
        assert!(zzz.connections.is_empty());
    }
}
