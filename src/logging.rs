/// Structured logging for the storm track cache service
///
/// Provides context-rich logging tagged with the pipeline stage and an
/// optional scope (storm id or partition address). Supports console output
/// and an optional log file for batch runs.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Parses the `[logging] level` config value. Unknown values fall back to `Info`.
    pub fn from_config(value: &str) -> LogLevel {
        match value.trim().to_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "warn" | "warning" => LogLevel::Warning,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline Stages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Load,
    Classify,
    Partition,
    Store,
    Query,
    System,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Fetch => write!(f, "FETCH"),
            Stage::Load => write!(f, "LOAD"),
            Stage::Classify => write!(f, "CLASSIFY"),
            Stage::Partition => write!(f, "PARTITION"),
            Stage::Store => write!(f, "STORE"),
            Stage::Query => write!(f, "QUERY"),
            Stage::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - the partition simply has not been built yet
    Expected,
    /// Unexpected failure - corrupt artifact, permissions, or backend outage
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut slot) = LOGGER.lock() {
            *slot = Some(logger);
        }
    }

    fn log(&self, level: LogLevel, stage: Stage, scope: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");

        let scope_part = scope.map(|s| format!(" [{}]", s)).unwrap_or_default();
        let log_entry = format!(
            "{} {} {}{}: {}",
            timestamp, level, stage, scope_part, message
        );

        // Console output
        if self.console_timestamps {
            match level {
                LogLevel::Error => eprintln!("{}", log_entry),
                LogLevel::Warning => eprintln!("   {}", log_entry),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => println!("   [DEBUG] {}", message),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", stage, scope_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", stage, scope_part, message),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => {} // Skip debug in non-timestamp mode
            }
        }

        // File output
        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

fn emit(level: LogLevel, stage: Stage, scope: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, stage, scope, message);
        }
    }
}

/// Log a general informational message
pub fn info(stage: Stage, scope: Option<&str>, message: &str) {
    emit(LogLevel::Info, stage, scope, message);
}

/// Log a warning message
pub fn warn(stage: Stage, scope: Option<&str>, message: &str) {
    emit(LogLevel::Warning, stage, scope, message);
}

/// Log an error message
pub fn error(stage: Stage, scope: Option<&str>, message: &str) {
    emit(LogLevel::Error, stage, scope, message);
}

/// Log a debug message
pub fn debug(stage: Stage, scope: Option<&str>, message: &str) {
    emit(LogLevel::Debug, stage, scope, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a partition store failure based on its message
pub fn classify_store_failure(error_message: &str) -> FailureType {
    if error_message.contains("not found") {
        FailureType::Expected
    } else if error_message.contains("parse error")
        || error_message.contains("database error")
        || error_message.contains("permission denied")
    {
        FailureType::Unexpected
    } else {
        FailureType::Unknown
    }
}

/// Log a store failure with automatic classification
pub fn log_store_failure(address: &str, operation: &str, err: &dyn std::error::Error) {
    let error_msg = err.to_string();
    let failure_type = classify_store_failure(&error_msg);

    let message = format!("{} failed [{}]: {}", operation, failure_type, error_msg);

    match failure_type {
        FailureType::Expected => debug(Stage::Store, Some(address), &message),
        FailureType::Unexpected => error(Stage::Store, Some(address), &message),
        FailureType::Unknown => warn(Stage::Store, Some(address), &message),
    }
}

// ---------------------------------------------------------------------------
// Summary Logging
// ---------------------------------------------------------------------------

/// Log how many rows survived cleaning
pub fn log_load_summary(total: usize, kept: usize, dropped_malformed: usize, out_of_range: usize) {
    let message = format!(
        "Loaded {}/{} rows ({} malformed, {} outside season range)",
        kept, total, dropped_malformed, out_of_range
    );

    if kept == 0 && total > 0 {
        warn(Stage::Load, None, &message);
    } else {
        info(Stage::Load, None, &message);
    }
}

/// Log a summary of the partition write pass
pub fn log_partition_summary(partitions: usize, storms: usize, skipped: usize) {
    let message = format!(
        "Partition write complete: {} storms in {} partitions, {} skipped by basin filter",
        storms, partitions, skipped
    );

    if partitions == 0 {
        warn(Stage::Partition, None, &message);
    } else {
        info(Stage::Partition, None, &message);
    }
}
