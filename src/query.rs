//! Lookup over built partitions.
//!
//! Reads the artifacts for one season and a set of basins, filters their
//! features by basin and intensity category, and returns the merged
//! collection with a small diagnostic block. Problems with one partition
//! never fail the request: a missing or unreadable artifact contributes zero
//! features.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::logging::{self, Stage};
use crate::model::{Basin, IntensityCategory, PartitionKey};
use crate::store::{ArtifactStore, StoreError};

/// Client errors. Only the season can make a request invalid.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueryError {
    #[error("missing season")]
    MissingSeason,

    #[error("invalid season: '{0}'")]
    InvalidSeason(String),
}

#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    /// Raw season parameter, as received.
    pub season: Option<String>,
    /// Requested basin codes, any case.
    pub basins: Vec<String>,
    /// Requested category labels. Empty means no category filter.
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryDebug {
    pub season: i32,
    pub basins: Vec<String>,
    pub categories: Vec<String>,
    pub count: usize,
}

/// Merged FeatureCollection. Features are passed through exactly as stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Value>,
    pub debug: QueryDebug,
}

/// Season must be a non-zero integer.
pub fn parse_season(raw: Option<&str>) -> Result<i32, QueryError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());
    let Some(raw) = raw else {
        return Err(QueryError::MissingSeason);
    };
    match raw.parse::<i32>() {
        Ok(season) if season != 0 => Ok(season),
        _ => Err(QueryError::InvalidSeason(raw.to_string())),
    }
}

/// A stored basin matches a selection when it equals it or extends it
/// (`NA` selects `NA`, `NA1`, ...).
fn basin_matches(stored: &str, selected: &[Basin]) -> bool {
    let stored = stored.trim().to_uppercase();
    selected
        .iter()
        .any(|b| stored == b.code() || stored.starts_with(b.code()))
}

fn category_matches(stored: Option<&str>, requested: &[String]) -> bool {
    if requested.is_empty() {
        return true;
    }
    match stored {
        Some(label) => {
            IntensityCategory::from_label(label).is_some()
                && requested.iter().any(|r| r == label)
        }
        None => false,
    }
}

/// Reads one partition and returns its raw features. Absent or unreadable
/// partitions yield no features; unreadable ones are logged.
fn load_features(store: &mut dyn ArtifactStore, key: &PartitionKey) -> Vec<Value> {
    let address = key.address();
    let body = match store.get(key) {
        Ok(Some(body)) => body,
        Ok(None) => return Vec::new(),
        Err(e) => {
            logging::log_store_failure(&address, "read", &e);
            return Vec::new();
        }
    };

    let message = match serde_json::from_str::<Value>(&body) {
        Ok(Value::Object(mut collection)) => match collection.remove("features") {
            Some(Value::Array(features)) => return features,
            None => return Vec::new(),
            Some(_) => "'features' is not an array".to_string(),
        },
        Ok(_) => "top level is not an object".to_string(),
        Err(e) => e.to_string(),
    };

    let err = StoreError::Corrupt {
        address: address.clone(),
        message,
    };
    logging::log_store_failure(&address, "read", &err);
    Vec::new()
}

/// Pulls `properties.basin` and `properties.category` out of one stored
/// feature. Non-object features don't fit and are skipped; missing or
/// non-string properties read as absent.
fn feature_fields(feature: &Value) -> Option<(&str, Option<&str>)> {
    let feature = feature.as_object()?;
    let properties = feature.get("properties");
    let basin = properties.and_then(|p| p.get("basin")).and_then(Value::as_str);
    let category = properties.and_then(|p| p.get("category")).and_then(Value::as_str);
    Some((basin.unwrap_or(""), category))
}

pub fn query_partitions(
    store: &mut dyn ArtifactStore,
    request: &QueryRequest,
) -> Result<QueryResponse, QueryError> {
    let season = parse_season(request.season.as_deref())?;

    let mut selected: Vec<Basin> = Vec::new();
    for raw in &request.basins {
        if let Some(basin) = Basin::from_code(raw) {
            if !selected.contains(&basin) {
                selected.push(basin);
            }
        }
    }

    let mut features = Vec::new();
    for &basin in &selected {
        let key = PartitionKey::new(season, basin);
        features.extend(load_features(store, &key).into_iter().filter(|f| {
            feature_fields(f).is_some_and(|(basin, category)| {
                basin_matches(basin, &selected) && category_matches(category, &request.categories)
            })
        }));
    }

    let count = features.len();
    logging::debug(
        Stage::Query,
        None,
        &format!("season={} basins={:?} features={}", season, selected, count),
    );

    Ok(QueryResponse {
        kind: "FeatureCollection".to_string(),
        features,
        debug: QueryDebug {
            season,
            basins: selected.iter().map(|b| b.code().to_string()).collect(),
            categories: request.categories.clone(),
            count,
        },
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
