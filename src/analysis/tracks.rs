/// Builds one immutable `StormTrack` per storm group.
///
/// Combines the group's geometry and timing with the basin and intensity
/// classifiers. The classifiers are injected so the builder holds no
/// configuration of its own.

use crate::analysis::grouping::StormGroup;
use crate::classify::basin::BasinClassifier;
use crate::classify::intensity::{self, IntensityThresholds};
use crate::logging::{self, Stage};
use crate::model::StormTrack;

/// Display name used when no row of a storm carries one.
pub const UNKNOWN_NAME: &str = "UNKNOWN";

pub struct TrackBuilder {
    basin: BasinClassifier,
    intensity: IntensityThresholds,
}

impl TrackBuilder {
    pub fn new(basin: BasinClassifier, intensity: IntensityThresholds) -> Self {
        Self { basin, intensity }
    }

    /// Summarizes one storm. Returns `None` only for an empty group.
    pub fn build_track(&self, group: &StormGroup) -> Option<StormTrack> {
        let first = group.rows.first()?;
        let last = group.rows.last()?;

        let basin = self.basin.classify(&group.rows);

        let name = group
            .rows
            .iter()
            .find_map(|r| r.name.as_deref())
            .map(title_case)
            .unwrap_or_else(|| title_case(UNKNOWN_NAME));

        let coordinates = group
            .rows
            .iter()
            .map(|r| (r.longitude, r.latitude))
            .collect();

        // category is graded on the unrounded speed
        let peak = intensity::peak_wind_ms(&group.rows);
        let category = self.intensity.categorize(peak);

        logging::debug(
            Stage::Classify,
            Some(&group.storm_id),
            &format!("basin={} category={:?}", basin, category),
        );

        Some(StormTrack {
            storm_id: group.storm_id.clone(),
            season: first.season,
            basin,
            name,
            coordinates,
            start: first.timestamp,
            end: last.timestamp,
            peak_wind_ms: peak.map(round_one_decimal),
            category,
        })
    }

    pub fn build_tracks(&self, groups: &[StormGroup]) -> Vec<StormTrack> {
        groups.iter().filter_map(|g| self.build_track(g)).collect()
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Capitalizes the first letter of every word and lowercases the rest.
///
/// A word starts after any character without case, so `"NOT_NAMED"`
/// becomes `"Not_Named"`, `"O'NEIL"` becomes `"O'Neil"` and a letter after
/// a CJK character starts a new word.
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_is_cased = false;
    for c in raw.chars() {
        if prev_is_cased {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_is_cased = c.is_lowercase() || c.is_uppercase();
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
