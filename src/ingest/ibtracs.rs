/// IBTrACS best-track CSV retrieval and loading
///
/// Downloads the International Best Track Archive for Climate Stewardship
/// "ALL" CSV, parses its rows into typed observations and cleans them down
/// to the rows the classifiers can use.
///
/// Data documentation: https://www.ncei.noaa.gov/products/international-best-track-archive

use chrono::{DateTime, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord};
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::logging::{self, Stage};
use crate::model::{Observation, RawObservation};

// ============================================================================
// Errors
// ============================================================================

/// Retrieval failures. All of them abort the run before anything is written.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("IBTrACS download returned HTTP {0}")]
    HttpStatus(u16),

    #[error("IBTrACS download failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to write '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required columns: {0}")]
    MissingColumns(String),
}

// ============================================================================
// Retrieval
// ============================================================================

pub fn build_client(timeout_secs: u64) -> Result<reqwest::blocking::Client, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;
    Ok(client)
}

/// Returns the cached CSV at `csv_path`, downloading it first if it is
/// missing or `force` is set.
///
/// The body is streamed into a `.part` sibling and renamed into place only
/// once complete, so a failed download leaves any previous copy untouched.
pub fn fetch_or_reuse(
    client: &reqwest::blocking::Client,
    url: &str,
    csv_path: &Path,
    force: bool,
) -> Result<PathBuf, FetchError> {
    if csv_path.exists() && !force {
        logging::info(
            Stage::Fetch,
            None,
            &format!("Reusing {} (pass --redownload to refresh)", csv_path.display()),
        );
        return Ok(csv_path.to_path_buf());
    }

    let io_err = |path: &Path| {
        let path = path.display().to_string();
        move |source: std::io::Error| FetchError::Io { path, source }
    };

    if let Some(parent) = csv_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }
    }

    logging::info(Stage::Fetch, None, &format!("Downloading {}", url));
    let mut response = client.get(url).send()?;
    if !response.status().is_success() {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    let partial = csv_path.with_extension("csv.part");
    let mut file = File::create(&partial).map_err(io_err(&partial))?;
    if let Err(e) = response.copy_to(&mut file) {
        let _ = fs::remove_file(&partial);
        return Err(e.into());
    }
    drop(file);
    if let Err(e) = fs::rename(&partial, csv_path) {
        let _ = fs::remove_file(&partial);
        return Err(io_err(csv_path)(e));
    }

    logging::info(Stage::Fetch, None, &format!("Saved {}", csv_path.display()));
    Ok(csv_path.to_path_buf())
}

// ============================================================================
// Parsing
// ============================================================================

/// Column positions of the fields we read, resolved from the header row.
struct Columns {
    sid: usize,
    season: usize,
    basin: usize,
    subbasin: usize,
    name: usize,
    iso_time: usize,
    lat: usize,
    lon: usize,
    wmo_wind: usize,
    atcf_id: usize,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, LoadError> {
        let mut missing = Vec::new();
        let mut find = |name: &'static str| {
            let idx = headers.iter().position(|h| h.trim() == name);
            if idx.is_none() {
                missing.push(name);
            }
            idx.unwrap_or(0)
        };

        let columns = Columns {
            sid: find("SID"),
            season: find("SEASON"),
            basin: find("BASIN"),
            subbasin: find("SUBBASIN"),
            name: find("NAME"),
            iso_time: find("ISO_TIME"),
            lat: find("LAT"),
            lon: find("LON"),
            wmo_wind: find("WMO_WIND"),
            atcf_id: find("USA_ATCF_ID"),
        };

        if missing.is_empty() {
            Ok(columns)
        } else {
            Err(LoadError::MissingColumns(missing.join(", ")))
        }
    }
}

/// Non-blank cell text, trimmed.
fn cell(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_float(s: Option<&str>) -> Option<f64> {
    s?.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Accepts "2009" as well as float-formatted integers like "2009.0".
fn parse_season(s: Option<&str>) -> Option<i32> {
    let s = s?;
    if let Ok(season) = s.parse::<i32>() {
        return Some(season);
    }
    let value = parse_float(Some(s))?;
    if value.fract() == 0.0 && value >= i32::MIN as f64 && value <= i32::MAX as f64 {
        Some(value as i32)
    } else {
        None
    }
}

/// IBTrACS writes "2009-08-01 00:00:00" in UTC; RFC 3339 is accepted too.
fn parse_timestamp(s: Option<&str>) -> Option<DateTime<Utc>> {
    let s = s?;
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(DateTime::from_naive_utc_and_offset(naive, Utc));
        }
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_record(record: &StringRecord, cols: &Columns) -> RawObservation {
    let text = |idx: usize| cell(record, idx).map(str::to_string);

    RawObservation {
        storm_id: cell(record, cols.sid).unwrap_or_default().to_string(),
        season: parse_season(cell(record, cols.season)),
        basin_raw: text(cols.basin),
        subbasin_raw: text(cols.subbasin),
        name: text(cols.name),
        timestamp: parse_timestamp(cell(record, cols.iso_time)),
        latitude: parse_float(cell(record, cols.lat)),
        longitude: parse_float(cell(record, cols.lon)),
        wind_knots: parse_float(cell(record, cols.wmo_wind)),
        identifier: text(cols.atcf_id),
    }
}

/// Parses IBTrACS CSV text into typed rows.
///
/// Fails only if the header lacks one of the columns we read. Individual
/// records that cannot be read are skipped; unparsable cells become `None`.
pub fn parse_observations<R: Read>(reader: R) -> Result<Vec<RawObservation>, LoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let cols = Columns::resolve(reader.headers()?)?;

    let mut rows = Vec::new();
    let mut unreadable = 0usize;
    for result in reader.records() {
        match result {
            Ok(record) => rows.push(parse_record(&record, &cols)),
            Err(_) => unreadable += 1,
        }
    }

    if unreadable > 0 {
        logging::debug(
            Stage::Load,
            None,
            &format!("Skipped {} unreadable CSV records", unreadable),
        );
    }
    Ok(rows)
}

pub fn load_observations(path: &Path) -> Result<Vec<RawObservation>, LoadError> {
    let file = File::open(path)?;
    parse_observations(BufReader::new(file))
}

// ============================================================================
// Cleaning
// ============================================================================

/// Row counts from one cleaning pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub total: usize,
    pub kept: usize,
    /// Missing storm id, season, timestamp, latitude or longitude.
    pub malformed: usize,
    pub out_of_range: usize,
}

/// Drops rows missing an essential field and rows outside `seasons`.
///
/// Row order is preserved.
pub fn clean_observations(
    raw: Vec<RawObservation>,
    seasons: &RangeInclusive<i32>,
) -> (Vec<Observation>, LoadStats) {
    let mut stats = LoadStats {
        total: raw.len(),
        ..LoadStats::default()
    };
    let mut cleaned = Vec::with_capacity(raw.len());

    for row in raw {
        let (Some(season), Some(timestamp), Some(latitude), Some(longitude)) =
            (row.season, row.timestamp, row.latitude, row.longitude)
        else {
            stats.malformed += 1;
            continue;
        };
        if row.storm_id.is_empty() {
            stats.malformed += 1;
            continue;
        }
        if !seasons.contains(&season) {
            stats.out_of_range += 1;
            continue;
        }

        cleaned.push(Observation {
            storm_id: row.storm_id,
            season,
            basin_raw: row.basin_raw,
            subbasin_raw: row.subbasin_raw,
            name: row.name,
            timestamp,
            latitude,
            longitude,
            wind_knots: row.wind_knots,
            identifier: row.identifier,
        });
    }

    stats.kept = cleaned.len();
    (cleaned, stats)
}

// ============================================================================
// Tests
// ============================================================================
