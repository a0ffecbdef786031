//! Runtime configuration for the storm track cache service.
//!
//! Loaded from a TOML file (`stormtrack.toml` by default). Every field has a
//! default, so a missing file or a partial file is fine. The loaded values are
//! immutable and handed to each component by constructor.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::classify::basin::BasinRules;
use crate::classify::intensity::IntensityThresholds;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "stormtrack.toml";

/// IBTrACS v04r01 "ALL" CSV.
pub const IBTRACS_CSV_URL: &str = "https://www.ncei.noaa.gov/data/international-best-track-archive-for-climate-stewardship-ibtracs/v04r01/access/csv/ibtracs.ALL.list.v04r01.csv";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("DATABASE_URL must be set for the postgres store backend")]
    MissingDatabaseUrl,
}

/// Where the raw CSV comes from and where it is cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_url")]
    pub url: String,

    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,

    /// HTTP timeout for the download; the file is several hundred MB.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_source_url() -> String {
    IBTRACS_CSV_URL.to_string()
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("data/ibtracs.csv")
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_source_url(),
            csv_path: default_csv_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Directory for the filesystem partition store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("data/cache")
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Fs,
    Postgres,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub file: Option<String>,

    #[serde(default)]
    pub timestamps: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
            timestamps: false,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub intensity: IntensityThresholds,

    #[serde(default)]
    pub basin: BasinRules,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Parses a config from TOML text.
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    /// Loads the config at `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text, &path.display().to_string())
    }
}

/// Reads `DATABASE_URL`, loading `.env` first if present.
pub fn database_url() -> Result<String, ConfigError> {
    dotenv::dotenv().ok();
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ServiceConfig::from_toml_str("", "inline").unwrap();
        assert_eq!(config.source.url, IBTRACS_CSV_URL);
        assert_eq!(config.cache.dir, PathBuf::from("data/cache"));
        assert_eq!(config.store.backend, StoreBackend::Fs);
        assert_eq!(config.intensity, IntensityThresholds::default());
        assert_eq!(config.basin, BasinRules::default());
    }

    #[test]
    fn test_partial_config_overrides_only_given_fields() {
        let text = r#"
            [cache]
            dir = "/tmp/storms"

            [store]
            backend = "postgres"

            [intensity]
            moderate_max_ms = 33.0
        "#;
        let config = ServiceConfig::from_toml_str(text, "inline").unwrap();
        assert_eq!(config.cache.dir, PathBuf::from("/tmp/storms"));
        assert_eq!(config.store.backend, StoreBackend::Postgres);
        assert_eq!(config.intensity.moderate_max_ms, 33.0);
        assert_eq!(config.intensity.depression_max_ms, 17.2);
        assert_eq!(config.source.timeout_secs, 300);
    }

    #[test]
    fn test_malformed_config_is_reported() {
        let err = ServiceConfig::from_toml_str("[store]\nbackend = 7", "bad.toml").unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = ServiceConfig::load(Path::new("/nonexistent/stormtrack.toml")).unwrap();
        assert_eq!(config.logging.level, "info");
    }
}
