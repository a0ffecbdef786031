//! Basin inference for a single storm.
//!
//! IBTrACS rows do not always carry a usable basin: the BASIN/SUBBASIN
//! columns may be blank or hold codes outside the seven we partition by
//! (`MM`, `SA`, subbasin codes like `BB`). Inference runs as an ordered list
//! of attempts; the first one that yields a basin wins:
//!
//! 1. `textual_vote`: most frequent valid BASIN/SUBBASIN code.
//! 2. `identifier_prefix`: basin implied by the ATCF identifier prefix.
//! 3. `coordinate_fallback`: rough geographic bands on the median position.
//!
//! The last step is infallible, so `BasinClassifier::classify` returns a
//! `Basin`, never an `Option`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

use crate::model::{Basin, Observation};

/// Longitude band [min, max) that separates the South Indian basin from the
/// South Pacific. Everything else in the southern hemisphere is SP.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BasinRules {
    #[serde(default = "default_south_indian_min_lon")]
    pub south_indian_min_lon: f64,
    #[serde(default = "default_south_indian_max_lon")]
    pub south_indian_max_lon: f64,
}

fn default_south_indian_min_lon() -> f64 {
    20.0
}

fn default_south_indian_max_lon() -> f64 {
    135.0
}

impl Default for BasinRules {
    fn default() -> Self {
        Self {
            south_indian_min_lon: default_south_indian_min_lon(),
            south_indian_max_lon: default_south_indian_max_lon(),
        }
    }
}

impl BasinRules {
    /// SI or SP for a longitude already normalized into [-180, 180).
    fn southern_basin(&self, lon: f64) -> Basin {
        if self.south_indian_min_lon <= lon && lon < self.south_indian_max_lon {
            Basin::SouthIndian
        } else {
            Basin::SouthPacific
        }
    }
}

// Northern-hemisphere fallback bands, [min, max) in normalized longitude.
const NORTH_ATLANTIC_LON: (f64, f64) = (-100.0, 0.0);
const EAST_PACIFIC_LON: (f64, f64) = (-180.0, -100.0);
// Lies entirely inside EAST_PACIFIC_LON and is checked after it, so it never
// matches. Kept as-is until the intended CP boundary is confirmed.
const CENTRAL_PACIFIC_LON: (f64, f64) = (-140.0, -120.0);

/// One inference step. `None` passes the storm on to the next step.
type Attempt = fn(&BasinRules, &[Observation]) -> Option<Basin>;

/// Assigns exactly one basin to a storm's rows.
#[derive(Debug, Clone, Default)]
pub struct BasinClassifier {
    rules: BasinRules,
}

impl BasinClassifier {
    const ATTEMPTS: [Attempt; 2] = [textual_vote, identifier_prefix];

    pub fn new(rules: BasinRules) -> Self {
        Self { rules }
    }

    pub fn classify(&self, rows: &[Observation]) -> Basin {
        Self::ATTEMPTS
            .iter()
            .find_map(|attempt| attempt(&self.rules, rows))
            .unwrap_or_else(|| coordinate_fallback(&self.rules, rows))
    }
}

// ---------------------------------------------------------------------------
// Tier 1: textual vote
// ---------------------------------------------------------------------------

/// Most frequent valid code across all SUBBASIN values followed by all BASIN
/// values. Ties go to the code seen first in that sequence.
pub fn textual_vote(_rules: &BasinRules, rows: &[Observation]) -> Option<Basin> {
    let subbasins = rows.iter().filter_map(|r| r.subbasin_raw.as_deref());
    let basins = rows.iter().filter_map(|r| r.basin_raw.as_deref());
    let codes: Vec<Basin> = subbasins.chain(basins).filter_map(Basin::from_code).collect();
    stable_mode(&codes)
}

/// Mode of `items`, with ties broken by first appearance.
pub fn stable_mode<T: Copy + Eq + Hash>(items: &[T]) -> Option<T> {
    let mut counts: HashMap<T, usize> = HashMap::new();
    let mut first_seen: Vec<T> = Vec::new();
    for &item in items {
        let count = counts.entry(item).or_insert(0);
        if *count == 0 {
            first_seen.push(item);
        }
        *count += 1;
    }

    let mut best: Option<(T, usize)> = None;
    for item in first_seen {
        let count = counts[&item];
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((item, count)),
        }
    }
    best.map(|(item, _)| item)
}

// ---------------------------------------------------------------------------
// Tier 2: ATCF identifier prefix
// ---------------------------------------------------------------------------

/// Maps the two-letter prefix of the first identifier in the group.
///
/// `SH` (southern hemisphere) is split into SI/SP on median longitude.
/// Unknown prefixes and identifiers shorter than two characters yield `None`.
pub fn identifier_prefix(rules: &BasinRules, rows: &[Observation]) -> Option<Basin> {
    let identifier = rows
        .iter()
        .filter_map(|r| r.identifier.as_deref())
        .map(str::trim)
        .find(|id| !id.is_empty())?;

    let prefix: String = identifier.chars().take(2).collect();
    if prefix.chars().count() < 2 {
        return None;
    }

    match prefix.to_uppercase().as_str() {
        "AL" => Some(Basin::NorthAtlantic),
        "EP" => Some(Basin::EastPacific),
        "CP" => Some(Basin::CentralPacific),
        "WP" => Some(Basin::WestPacific),
        "IO" => Some(Basin::NorthIndian),
        "SH" => {
            let lon = median_longitude(rows).map(normalize_longitude);
            match lon {
                Some(lon) => Some(rules.southern_basin(lon)),
                None => Some(Basin::SouthIndian),
            }
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tier 3: coordinate fallback
// ---------------------------------------------------------------------------

/// Geographic guess from median latitude and longitude. Always succeeds.
pub fn coordinate_fallback(rules: &BasinRules, rows: &[Observation]) -> Basin {
    let lat = median(rows.iter().map(|r| r.latitude)).unwrap_or(0.0);
    let lon = normalize_longitude(median_longitude(rows).unwrap_or(0.0));

    if lat >= 0.0 {
        if in_band(lon, NORTH_ATLANTIC_LON) {
            Basin::NorthAtlantic
        } else if in_band(lon, EAST_PACIFIC_LON) {
            Basin::EastPacific
        } else if in_band(lon, CENTRAL_PACIFIC_LON) {
            Basin::CentralPacific
        } else {
            Basin::WestPacific
        }
    } else {
        rules.southern_basin(lon)
    }
}

fn in_band(lon: f64, (min, max): (f64, f64)) -> bool {
    min <= lon && lon < max
}

// ---------------------------------------------------------------------------
// Geometry helpers
// ---------------------------------------------------------------------------

/// Wraps any longitude into [-180, 180).
pub fn normalize_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 180.0 { wrapped - 360.0 } else { wrapped }
}

fn median_longitude(rows: &[Observation]) -> Option<f64> {
    median(rows.iter().map(|r| r.longitude))
}

/// Median of the non-NaN values; the mean of the middle pair for even counts.
pub fn median<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
