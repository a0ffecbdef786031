//! Partitioning and serialization of storm summaries.
//!
//! Summaries are bucketed by (season, basin). Each bucket is written as one
//! GeoJSON FeatureCollection: one LineString feature per storm, in storm-id
//! order. Identical input always produces byte-identical artifacts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::logging::{self, Stage};
use crate::model::{Basin, PartitionKey, StormTrack};
use crate::store::{ArtifactStore, StoreError};

// ---------------------------------------------------------------------------
// GeoJSON artifact types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: LineString,
    pub properties: StormProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineString {
    #[serde(rename = "type")]
    pub kind: String,
    /// [longitude, latitude] pairs.
    pub coordinates: Vec<[f64; 2]>,
}

/// Per-storm feature properties. Wind and category serialize as `null`
/// when the storm has no wind readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StormProperties {
    pub id: String,
    pub name: String,
    pub season: i32,
    pub basin: String,
    pub start: String,
    pub end: String,
    pub peak_wind_ms: Option<f64>,
    pub category: Option<String>,
}

impl From<&StormTrack> for Feature {
    fn from(track: &StormTrack) -> Self {
        Feature {
            kind: "Feature".to_string(),
            geometry: LineString {
                kind: "LineString".to_string(),
                coordinates: track
                    .coordinates
                    .iter()
                    .map(|&(lon, lat)| [lon, lat])
                    .collect(),
            },
            properties: StormProperties {
                id: track.storm_id.clone(),
                name: track.name.clone(),
                season: track.season,
                basin: track.basin.code().to_string(),
                start: track.start.to_rfc3339(),
                end: track.end.to_rfc3339(),
                peak_wind_ms: track.peak_wind_ms,
                category: track.category.map(|c| c.label().to_string()),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Bucketing
// ---------------------------------------------------------------------------

/// Groups summaries by partition key, preserving input order inside a bucket.
pub fn bucket_tracks(tracks: Vec<StormTrack>) -> BTreeMap<PartitionKey, Vec<StormTrack>> {
    let mut buckets: BTreeMap<PartitionKey, Vec<StormTrack>> = BTreeMap::new();
    for track in tracks {
        buckets.entry(track.partition_key()).or_default().push(track);
    }
    buckets
}

pub fn build_feature_collection(tracks: &[StormTrack]) -> FeatureCollection {
    FeatureCollection::new(tracks.iter().map(Feature::from).collect())
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Storm counts per written partition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionSummary {
    pub counts: BTreeMap<PartitionKey, usize>,
}

impl PartitionSummary {
    pub fn total_storms(&self) -> usize {
        self.counts.values().sum()
    }

    /// Per-season lines, basins alphabetical: `2009 -> EP:3, WP:12`.
    pub fn season_lines(&self) -> Vec<String> {
        let mut by_season: BTreeMap<i32, Vec<(Basin, usize)>> = BTreeMap::new();
        for (key, &count) in &self.counts {
            by_season.entry(key.season).or_default().push((key.basin, count));
        }

        by_season
            .into_iter()
            .map(|(season, basins)| {
                let parts: Vec<String> = basins
                    .iter()
                    .map(|(basin, count)| format!("{}:{}", basin, count))
                    .collect();
                format!("{} -> {}", season, parts.join(", "))
            })
            .collect()
    }
}

/// Serializes and stores every bucket, replacing any existing artifact.
///
/// Stops at the first store failure; partitions already written stay written.
pub fn write_partitions(
    buckets: &BTreeMap<PartitionKey, Vec<StormTrack>>,
    store: &mut dyn ArtifactStore,
) -> Result<PartitionSummary, StoreError> {
    let mut summary = PartitionSummary::default();

    for (key, tracks) in buckets {
        let body = serde_json::to_string(&build_feature_collection(tracks))?;
        if let Err(e) = store.put(key, &body) {
            logging::log_store_failure(&key.address(), "write", &e);
            return Err(e);
        }
        logging::info(
            Stage::Partition,
            Some(&key.address()),
            &format!("[OK] {} storms={}", key.address(), tracks.len()),
        );
        summary.counts.insert(*key, tracks.len());
    }

    Ok(summary)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
