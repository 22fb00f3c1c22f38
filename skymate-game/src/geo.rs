//! Great-circle distance, unit conversion and flight-time estimates.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CRUISE_SPEED_MPH, EARTH_RADIUS_MILES, FLIGHT_OVERHEAD_MINUTES, KM_PER_MILE, MILES_PER_KM,
};
use crate::numbers::{round_f64_to_u32, u32_to_f64};

/// Haversine distance between two coordinates, rounded to whole miles.
///
/// Latitude and longitude deltas are taken as absolute values so the result
/// is bit-for-bit identical regardless of argument order.
#[must_use]
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> u32 {
    let d_lat = (lat2 - lat1).abs().to_radians();
    let d_lon = (lon2 - lon1).abs().to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    round_f64_to_u32(EARTH_RADIUS_MILES * c)
}

#[must_use]
pub fn miles_to_km(miles: u32) -> u32 {
    round_f64_to_u32(u32_to_f64(miles) * KM_PER_MILE)
}

#[must_use]
pub fn km_to_miles(km: f64) -> f64 {
    km * MILES_PER_KM
}

/// Estimated block time for a leg of the given length.
#[must_use]
pub fn flight_duration(miles: u32) -> FlightDuration {
    let minutes = u32_to_f64(miles) / CRUISE_SPEED_MPH * 60.0 + FLIGHT_OVERHEAD_MINUTES;
    FlightDuration::from_minutes(round_f64_to_u32(minutes))
}

/// Whole-minute flight duration; renders as `1h 47m` or `45m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FlightDuration {
    total_minutes: u32,
}

impl FlightDuration {
    #[must_use]
    pub const fn from_minutes(total_minutes: u32) -> Self {
        Self { total_minutes }
    }

    #[must_use]
    pub const fn total_minutes(self) -> u32 {
        self.total_minutes
    }

    #[must_use]
    pub const fn hours(self) -> u32 {
        self.total_minutes / 60
    }

    #[must_use]
    pub const fn minutes(self) -> u32 {
        self.total_minutes % 60
    }
}

impl fmt::Display for FlightDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hours() > 0 {
            write!(f, "{}h {}m", self.hours(), self.minutes())
        } else {
            write!(f, "{}m", self.minutes())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haneda_to_new_chitose_matches_reference() {
        let miles = distance(35.5494, 139.7798, 42.7752, 141.6923);
        assert_eq!(miles, 510);
        let duration = flight_duration(miles);
        assert_eq!(duration.total_minutes(), 107);
        assert_eq!(duration.to_string(), "1h 47m");
    }

    #[test]
    fn distance_is_symmetric_and_zero_for_same_point() {
        let forward = distance(26.1958, 127.6458, 43.1161, 141.3803);
        let backward = distance(43.1161, 141.3803, 26.1958, 127.6458);
        assert_eq!(forward, backward);
        assert_eq!(distance(34.7855, 135.4382, 34.7855, 135.4382), 0);
    }

    #[test]
    fn converts_units() {
        assert_eq!(miles_to_km(0), 0);
        assert_eq!(miles_to_km(100), 161);
        assert_eq!(miles_to_km(510), 821);
        assert!((km_to_miles(100.0) - 62.1371).abs() < 1e-9);
    }

    #[test]
    fn short_hops_render_minutes_only() {
        assert_eq!(flight_duration(0).to_string(), "40m");
        let hop = flight_duration(8);
        assert_eq!(hop.total_minutes(), 41);
        assert_eq!(hop.hours(), 0);
        assert_eq!(hop.to_string(), "41m");
    }

    #[test]
    fn whole_hours_keep_zero_minutes() {
        let duration = FlightDuration::from_minutes(120);
        assert_eq!(duration.to_string(), "2h 0m");
        assert_eq!(flight_duration(153).total_minutes(), 60);
        assert_eq!(flight_duration(153).to_string(), "1h 0m");
    }
}
