//! Batch build: fetch → load → clean → group → classify → partition → store.
//!
//! Argument problems (basin allow-list, season range) and retrieval failures
//! abort the run before anything is written. Malformed rows are dropped and
//! counted, never fatal.

use std::ops::RangeInclusive;
use thiserror::Error;

use crate::analysis::grouping::group_by_storm;
use crate::analysis::tracks::TrackBuilder;
use crate::basins;
use crate::classify::basin::BasinClassifier;
use crate::config::{self, ConfigError, ServiceConfig, StoreBackend};
use crate::ingest::ibtracs::{self, FetchError, LoadError, LoadStats};
use crate::logging::{self, Stage};
use crate::model::{Basin, RawObservation};
use crate::partition::{self, PartitionSummary};
use crate::store::{ArtifactStore, FsStore, PgStore, StoreError};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no valid basin in '{0}'; allowed values: CP, EP, NA, NI, SI, SP, WP")]
    InvalidBasins(String),

    #[error("invalid season range {start}..={end}")]
    InvalidSeasonRange { start: i32, end: i32 },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What the caller asked the build to do.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub seasons: RangeInclusive<i32>,
    /// Basin allow-list as given on the command line.
    pub basins: Vec<String>,
    pub force_refresh: bool,
}

impl BuildRequest {
    pub fn new(start: i32, end: i32) -> Self {
        Self {
            seasons: start..=end,
            basins: basins::all_basin_codes()
                .into_iter()
                .map(String::from)
                .collect(),
            force_refresh: false,
        }
    }
}

/// Completion report for one build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub load: LoadStats,
    /// Storms summarized, before the basin allow-list.
    pub storms: usize,
    /// Storms dropped because their basin is not on the allow-list.
    pub skipped: usize,
    pub partitions: PartitionSummary,
}

/// Checks the arguments that must be valid before any I/O happens.
pub fn validate_request(request: &BuildRequest) -> Result<Vec<Basin>, PipelineError> {
    let (start, end) = (*request.seasons.start(), *request.seasons.end());
    if start > end {
        return Err(PipelineError::InvalidSeasonRange { start, end });
    }
    basins::parse_allow_list(&request.basins)
        .ok_or_else(|| PipelineError::InvalidBasins(request.basins.join(" ")))
}

/// Runs everything after loading: cleaning through storage.
pub fn build_from_rows(
    raw: Vec<RawObservation>,
    seasons: &RangeInclusive<i32>,
    allowed: &[Basin],
    config: &ServiceConfig,
    store: &mut dyn ArtifactStore,
) -> Result<BuildReport, StoreError> {
    let (rows, load) = ibtracs::clean_observations(raw, seasons);
    logging::log_load_summary(load.total, load.kept, load.malformed, load.out_of_range);

    let groups = group_by_storm(rows);
    let builder = TrackBuilder::new(BasinClassifier::new(config.basin), config.intensity);
    let tracks = builder.build_tracks(&groups);
    let storms = tracks.len();

    let (kept, dropped): (Vec<_>, Vec<_>) =
        tracks.into_iter().partition(|t| allowed.contains(&t.basin));
    for track in &dropped {
        logging::debug(
            Stage::Classify,
            Some(&track.storm_id),
            &format!("skipped, basin {} not requested", track.basin),
        );
    }

    let buckets = partition::bucket_tracks(kept);
    let partitions = partition::write_partitions(&buckets, store)?;
    logging::log_partition_summary(partitions.counts.len(), partitions.total_storms(), dropped.len());
    for line in partitions.season_lines() {
        logging::info(Stage::Partition, None, &format!("  {}", line));
    }

    Ok(BuildReport {
        load,
        storms,
        skipped: dropped.len(),
        partitions,
    })
}

/// Full build against the configured source.
///
/// `allowed` is the allow-list returned by `validate_request` for this
/// request; the caller validates before opening the store.
pub fn run_build(
    config: &ServiceConfig,
    request: &BuildRequest,
    allowed: &[Basin],
    store: &mut dyn ArtifactStore,
) -> Result<BuildReport, PipelineError> {
    logging::info(
        Stage::System,
        None,
        &format!(
            "Seasons {}..={}, basins: {}",
            request.seasons.start(),
            request.seasons.end(),
            basins::describe_basins(allowed).join(", ")
        ),
    );

    let client = ibtracs::build_client(config.source.timeout_secs)?;
    let csv_path = ibtracs::fetch_or_reuse(
        &client,
        &config.source.url,
        &config.source.csv_path,
        request.force_refresh,
    )?;

    let raw = ibtracs::load_observations(&csv_path)?;
    let report = build_from_rows(raw, &request.seasons, allowed, config, store)?;
    Ok(report)
}

/// Opens the store backend named in the config.
pub fn open_store(config: &ServiceConfig) -> Result<Box<dyn ArtifactStore>, PipelineError> {
    match config.store.backend {
        StoreBackend::Fs => Ok(Box::new(FsStore::new(&config.cache.dir))),
        StoreBackend::Postgres => {
            let url = config::database_url()?;
            Ok(Box::new(PgStore::connect(&url)?))
        }
    }
}
