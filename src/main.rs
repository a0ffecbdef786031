//! Command-line entry point.
//!
//! `stormtrack build` refreshes the partition cache for a season range;
//! `stormtrack query` prints one filtered lookup as JSON;
//! `stormtrack basins` lists the basin registry.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use stormtrack_service::basins::{self, BasinInfo};
use stormtrack_service::config::{DEFAULT_CONFIG_PATH, ServiceConfig};
use stormtrack_service::logging::{self, LogLevel, Stage};
use stormtrack_service::pipeline::{self, BuildRequest};
use stormtrack_service::query::{self, QueryRequest};

#[derive(Parser)]
#[command(name = "stormtrack")]
#[command(about = "IBTrACS storm track partition cache", version)]
struct Cli {
    /// Path to TOML config file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild partitions for a season range
    Build {
        /// First season (inclusive)
        #[arg(long = "from")]
        from: i32,
        /// Last season (inclusive)
        #[arg(long = "to")]
        to: i32,
        /// Basin codes to keep (default: all)
        #[arg(long, num_args = 0.., default_values_t = basins::all_basin_codes().into_iter().map(String::from).collect::<Vec<_>>())]
        basins: Vec<String>,
        /// Download the source CSV even if a cached copy exists
        #[arg(long)]
        redownload: bool,
    },

    /// Look up storms for one season
    Query {
        /// Season to read
        #[arg(long)]
        season: Option<String>,
        /// Basin code (repeatable)
        #[arg(long = "basin")]
        basins: Vec<String>,
        /// Intensity category label (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,
    },

    /// List the basin codes and what they cover
    Basins {
        /// Show a single basin
        code: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match ServiceConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ {}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::init_logger(
        LogLevel::from_config(&config.logging.level),
        config.logging.file.as_deref(),
        config.logging.timestamps,
    );

    match cli.command {
        Commands::Build {
            from,
            to,
            basins,
            redownload,
        } => {
            let request = BuildRequest {
                seasons: from..=to,
                basins,
                force_refresh: redownload,
            };
            // argument errors must surface before the store is opened
            let allowed = match pipeline::validate_request(&request) {
                Ok(allowed) => allowed,
                Err(e) => {
                    logging::error(Stage::System, None, &e.to_string());
                    return ExitCode::FAILURE;
                }
            };

            let result = pipeline::open_store(&config).and_then(|mut store| {
                pipeline::run_build(&config, &request, &allowed, store.as_mut())
            });
            match result {
                Ok(report) => {
                    logging::info(
                        Stage::System,
                        None,
                        &format!(
                            "Done: {} storms in {} partitions",
                            report.partitions.total_storms(),
                            report.partitions.counts.len()
                        ),
                    );
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    logging::error(Stage::System, None, &e.to_string());
                    ExitCode::FAILURE
                }
            }
        }

        Commands::Basins { code } => {
            let entries: Vec<&BasinInfo> = match code {
                Some(code) => match basins::find_basin(&code) {
                    Some(info) => vec![info],
                    None => {
                        logging::error(
                            Stage::System,
                            None,
                            &format!(
                                "unknown basin '{}'; known codes: {}",
                                code,
                                basins::all_basin_codes().join(", ")
                            ),
                        );
                        return ExitCode::FAILURE;
                    }
                },
                None => basins::BASIN_REGISTRY.iter().collect(),
            };
            for info in entries {
                println!("{}", info.summary_line());
            }
            ExitCode::SUCCESS
        }

        Commands::Query {
            season,
            basins,
            categories,
        } => {
            let mut store = match pipeline::open_store(&config) {
                Ok(store) => store,
                Err(e) => {
                    logging::error(Stage::Query, None, &e.to_string());
                    return ExitCode::FAILURE;
                }
            };

            let request = QueryRequest {
                season,
                basins,
                categories,
            };
            match query::query_partitions(store.as_mut(), &request) {
                Ok(response) => match serde_json::to_string(&response) {
                    Ok(json) => {
                        println!("{}", json);
                        ExitCode::SUCCESS
                    }
                    Err(e) => {
                        logging::error(Stage::Query, None, &e.to_string());
                        ExitCode::FAILURE
                    }
                },
                Err(e) => {
                    let body = serde_json::json!({ "error": e.to_string() });
                    println!("{}", body);
                    ExitCode::from(2)
                }
            }
        }
    }
}
