//! Roulette settings and their partial-update form.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    BIG_AIRPORT_RATIO_MAX, BIG_AIRPORT_RATIO_MIN, DEFAULT_BIG_AIRPORT_RATIO,
    DEFAULT_EXCLUDE_RADIUS_KM, DEFAULT_RETRY_MODE, EXCLUDE_RADIUS_KM_MIN,
};

/// Errors raised when roulette settings leave their allowed ranges.
#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{field} must be a finite value of at least {min:.2} (got {value})")]
    MinViolation {
        field: &'static str,
        min: f64,
        value: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Chance of drawing from hub airports when both classes are available.
    #[serde(default = "AppSettings::default_big_airport_ratio")]
    pub big_airport_ratio: f64,
    /// Neighbours strictly closer than this are never offered.
    #[serde(default = "AppSettings::default_exclude_radius_km")]
    pub exclude_radius_km: f64,
    /// Park each result for confirmation instead of committing it.
    #[serde(default = "AppSettings::default_retry_mode")]
    pub retry_mode: bool,
}

impl AppSettings {
    const fn default_big_airport_ratio() -> f64 {
        DEFAULT_BIG_AIRPORT_RATIO
    }

    const fn default_exclude_radius_km() -> f64 {
        DEFAULT_EXCLUDE_RADIUS_KM
    }

    const fn default_retry_mode() -> bool {
        DEFAULT_RETRY_MODE
    }

    /// Check every field against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns the first field that is out of range.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(BIG_AIRPORT_RATIO_MIN..=BIG_AIRPORT_RATIO_MAX).contains(&self.big_airport_ratio) {
            return Err(SettingsError::RangeViolation {
                field: "bigAirportRatio",
                min: BIG_AIRPORT_RATIO_MIN,
                max: BIG_AIRPORT_RATIO_MAX,
                value: self.big_airport_ratio,
            });
        }
        if !self.exclude_radius_km.is_finite() || self.exclude_radius_km < EXCLUDE_RADIUS_KM_MIN {
            return Err(SettingsError::MinViolation {
                field: "excludeRadiusKm",
                min: EXCLUDE_RADIUS_KM_MIN,
                value: self.exclude_radius_km,
            });
        }
        Ok(())
    }

    /// Apply a patch, returning the merged settings without mutating `self`.
    ///
    /// # Errors
    ///
    /// Returns an error if the merged settings fail validation.
    pub fn merged(&self, patch: &SettingsPatch) -> Result<Self, SettingsError> {
        let merged = Self {
            big_airport_ratio: patch.big_airport_ratio.unwrap_or(self.big_airport_ratio),
            exclude_radius_km: patch.exclude_radius_km.unwrap_or(self.exclude_radius_km),
            retry_mode: patch.retry_mode.unwrap_or(self.retry_mode),
        };
        merged.validate()?;
        Ok(merged)
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            big_airport_ratio: Self::default_big_airport_ratio(),
            exclude_radius_km: Self::default_exclude_radius_km(),
            retry_mode: Self::default_retry_mode(),
        }
    }
}

/// Partial settings update; `None` fields keep their current value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default)]
    pub big_airport_ratio: Option<f64>,
    #[serde(default)]
    pub exclude_radius_km: Option<f64>,
    #[serde(default)]
    pub retry_mode: Option<bool>,
}

impl SettingsPatch {
    #[must_use]
    pub const fn big_airport_ratio(mut self, ratio: f64) -> Self {
        self.big_airport_ratio = Some(ratio);
        self
    }

    #[must_use]
    pub const fn exclude_radius_km(mut self, km: f64) -> Self {
        self.exclude_radius_km = Some(km);
        self
    }

    #[must_use]
    pub const fn retry_mode(mut self, enabled: bool) -> Self {
        self.retry_mode = Some(enabled);
        self
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.big_airport_ratio.is_none()
            && self.exclude_radius_km.is_none()
            && self.retry_mode.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let settings = AppSettings::default();
        assert!((settings.big_airport_ratio - 0.6).abs() < f64::EPSILON);
        assert!((settings.exclude_radius_km - 50.0).abs() < f64::EPSILON);
        assert!(!settings.retry_mode);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn json_fragment_fills_missing_fields() {
        let settings: AppSettings = serde_json::from_str(r#"{"retryMode": true}"#).unwrap();
        assert!(settings.retry_mode);
        assert!((settings.exclude_radius_km - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn merge_applies_only_present_fields() {
        let base = AppSettings::default();
        let patch = SettingsPatch::default().exclude_radius_km(0.0);
        let merged = base.merged(&patch).unwrap();
        assert!(merged.exclude_radius_km.abs() < f64::EPSILON);
        assert!((merged.big_airport_ratio - base.big_airport_ratio).abs() < f64::EPSILON);
        assert!(SettingsPatch::default().is_empty());
        assert!(!patch.is_empty());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let base = AppSettings::default();
        let err = base
            .merged(&SettingsPatch::default().big_airport_ratio(1.5))
            .unwrap_err();
        assert!(matches!(
            err,
            SettingsError::RangeViolation {
                field: "bigAirportRatio",
                ..
            }
        ));
        assert!(
            base.merged(&SettingsPatch::default().big_airport_ratio(f64::NAN))
                .is_err()
        );
        assert!(
            base.merged(&SettingsPatch::default().exclude_radius_km(-1.0))
                .is_err()
        );
        assert!(
            base.merged(&SettingsPatch::default().exclude_radius_km(f64::INFINITY))
                .is_err()
        );
    }
}
