//! Peak-intensity categorization.
//!
//! IBTrACS reports WMO sustained wind in knots. Storms are graded on the
//! m/s scale used by the Central Weather Administration, with fixed
//! ascending thresholds.

use serde::{Deserialize, Serialize};

use crate::model::{IntensityCategory, Observation};

/// Knots to metres per second.
pub const KNOTS_TO_MS: f64 = 0.514444;

/// Upper bounds (m/s) of the lower three categories.
///
/// Category bands in ascending order:
///   v < depression_max               → tropical depression
///   depression_max ≤ v ≤ mild_max    → mild typhoon
///   mild_max < v ≤ moderate_max      → moderate typhoon
///   v > moderate_max                 → severe typhoon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensityThresholds {
    #[serde(default = "default_depression_max")]
    pub depression_max_ms: f64,
    #[serde(default = "default_mild_max")]
    pub mild_max_ms: f64,
    #[serde(default = "default_moderate_max")]
    pub moderate_max_ms: f64,
}

fn default_depression_max() -> f64 {
    17.2
}

fn default_mild_max() -> f64 {
    24.4
}

fn default_moderate_max() -> f64 {
    32.6
}

impl Default for IntensityThresholds {
    fn default() -> Self {
        Self {
            depression_max_ms: default_depression_max(),
            mild_max_ms: default_mild_max(),
            moderate_max_ms: default_moderate_max(),
        }
    }
}

impl IntensityThresholds {
    /// Grades a wind speed in m/s. `None` in, `None` out.
    pub fn categorize(&self, wind_ms: Option<f64>) -> Option<IntensityCategory> {
        let v = wind_ms?;
        if v.is_nan() {
            return None;
        }
        let category = if v < self.depression_max_ms {
            IntensityCategory::TropicalDepression
        } else if v <= self.mild_max_ms {
            IntensityCategory::MildTyphoon
        } else if v <= self.moderate_max_ms {
            IntensityCategory::ModerateTyphoon
        } else {
            IntensityCategory::SevereTyphoon
        };
        Some(category)
    }
}

pub fn knots_to_ms(knots: f64) -> f64 {
    knots * KNOTS_TO_MS
}

/// Highest wind reading across a storm's rows, converted to m/s.
///
/// Returns `None` when no row carries a wind reading.
pub fn peak_wind_ms(rows: &[Observation]) -> Option<f64> {
    rows.iter()
        .filter_map(|r| r.wind_knots)
        .filter(|w| !w.is_nan())
        .fold(None, |max: Option<f64>, w| match max {
            Some(m) if m >= w => Some(m),
            _ => Some(w),
        })
        .map(knots_to_ms)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
