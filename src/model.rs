/// Core data types for the storm track cache service.
///
/// This module defines the shared domain model imported by all other modules:
/// observation rows as they come out of the IBTrACS CSV, the cleaned rows the
/// classifiers work on, per-storm summaries, and the partition key that
/// addresses one cache artifact.
/// It contains no I/O and no classification logic, only types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Basin codes
// ---------------------------------------------------------------------------

/// One of the seven ocean basins a storm can be assigned to.
///
/// Variants are declared in alphabetical order of their codes so the derived
/// `Ord` sorts partitions the same way the completion report lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Basin {
    #[serde(rename = "CP")]
    CentralPacific,
    #[serde(rename = "EP")]
    EastPacific,
    #[serde(rename = "NA")]
    NorthAtlantic,
    #[serde(rename = "NI")]
    NorthIndian,
    #[serde(rename = "SI")]
    SouthIndian,
    #[serde(rename = "SP")]
    SouthPacific,
    #[serde(rename = "WP")]
    WestPacific,
}

impl Basin {
    /// Every valid basin, in code order.
    pub const ALL: [Basin; 7] = [
        Basin::CentralPacific,
        Basin::EastPacific,
        Basin::NorthAtlantic,
        Basin::NorthIndian,
        Basin::SouthIndian,
        Basin::SouthPacific,
        Basin::WestPacific,
    ];

    /// Two-letter IBTrACS basin code.
    pub fn code(self) -> &'static str {
        match self {
            Basin::CentralPacific => "CP",
            Basin::EastPacific => "EP",
            Basin::NorthAtlantic => "NA",
            Basin::NorthIndian => "NI",
            Basin::SouthIndian => "SI",
            Basin::SouthPacific => "SP",
            Basin::WestPacific => "WP",
        }
    }

    /// Parses a raw basin code. Surrounding whitespace and case are ignored;
    /// anything outside the seven valid codes yields `None`.
    pub fn from_code(raw: &str) -> Option<Basin> {
        let normalized = raw.trim().to_uppercase();
        Basin::ALL.into_iter().find(|b| b.code() == normalized)
    }
}

impl fmt::Display for Basin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ---------------------------------------------------------------------------
// Intensity categories
// ---------------------------------------------------------------------------

/// Peak-intensity category, in ascending order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IntensityCategory {
    #[serde(rename = "tropical depression")]
    TropicalDepression,
    #[serde(rename = "mild typhoon")]
    MildTyphoon,
    #[serde(rename = "moderate typhoon")]
    ModerateTyphoon,
    #[serde(rename = "severe typhoon")]
    SevereTyphoon,
}

impl IntensityCategory {
    pub const ALL: [IntensityCategory; 4] = [
        IntensityCategory::TropicalDepression,
        IntensityCategory::MildTyphoon,
        IntensityCategory::ModerateTyphoon,
        IntensityCategory::SevereTyphoon,
    ];

    /// Label stored in the `category` property of each feature.
    pub fn label(self) -> &'static str {
        match self {
            IntensityCategory::TropicalDepression => "tropical depression",
            IntensityCategory::MildTyphoon => "mild typhoon",
            IntensityCategory::ModerateTyphoon => "moderate typhoon",
            IntensityCategory::SevereTyphoon => "severe typhoon",
        }
    }

    /// Exact label match; no case folding.
    pub fn from_label(label: &str) -> Option<IntensityCategory> {
        IntensityCategory::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl fmt::Display for IntensityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Observation rows
// ---------------------------------------------------------------------------

/// One row of the IBTrACS CSV after typed parsing.
///
/// Every field that failed to parse is `None`. Rows are read once and never
/// mutated; `ingest::ibtracs::clean_observations` turns the ones with all
/// essential fields into `Observation`s.
#[derive(Debug, Clone, PartialEq)]
pub struct RawObservation {
    pub storm_id: String,
    pub season: Option<i32>,
    pub basin_raw: Option<String>,
    pub subbasin_raw: Option<String>,
    pub name: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub wind_knots: Option<f64>,   // WMO_WIND
    pub identifier: Option<String>, // USA_ATCF_ID, e.g. "WP012009"
}

/// A cleaned observation: season, timestamp and position are guaranteed present.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub storm_id: String,
    pub season: i32,
    pub basin_raw: Option<String>,
    pub subbasin_raw: Option<String>,
    pub name: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub wind_knots: Option<f64>,
    pub identifier: Option<String>,
}

// ---------------------------------------------------------------------------
// Storm summaries and partitions
// ---------------------------------------------------------------------------

/// Summary of one storm's lifetime, built once by `analysis::tracks`.
#[derive(Debug, Clone, PartialEq)]
pub struct StormTrack {
    pub storm_id: String,
    pub season: i32,
    pub basin: Basin,
    pub name: String,
    /// (longitude, latitude) pairs in ascending timestamp order.
    pub coordinates: Vec<(f64, f64)>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Peak sustained wind in m/s, rounded to one decimal.
    pub peak_wind_ms: Option<f64>,
    pub category: Option<IntensityCategory>,
}

impl StormTrack {
    pub fn partition_key(&self) -> PartitionKey {
        PartitionKey {
            season: self.season,
            basin: self.basin,
        }
    }
}

/// Addresses one cache artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartitionKey {
    pub season: i32,
    pub basin: Basin,
}

impl PartitionKey {
    pub fn new(season: i32, basin: Basin) -> Self {
        Self { season, basin }
    }

    /// Store address, e.g. `wp_2009`.
    pub fn address(&self) -> String {
        format!("{}_{}", self.basin.code().to_lowercase(), self.season)
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
