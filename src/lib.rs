//! Storm track cache service.
//!
//! Builds per-(season, basin) GeoJSON partitions of IBTrACS storm tracks
//! and answers filtered lookups over them.

pub mod analysis;
pub mod basins;
pub mod classify;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod partition;
pub mod pipeline;
pub mod query;
pub mod store;
