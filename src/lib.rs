//! Jar-Harvest: a catalog scanner for device-specific archive packages
//!
//! This crate walks a range of numeric catalog identifiers, picks the archive
//! package best suited to the target device on each catalog page, downloads it,
//! and records one outcome per identifier in a run log that can later be
//! replayed to retry the failures.

pub mod catalog;
pub mod config;
pub mod output;
pub mod state;

use thiserror::Error;

/// Numeric key addressing one entry in the remote catalog
pub type CatalogId = u64;

/// Main error type for Jar-Harvest operations
///
/// Per-identifier failures never surface here; they are absorbed into an
/// [`OutcomeRecord`]. These variants cover run-level faults only.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Selector error: {0}")]
    Selector(String),

    #[error("Run log error: {0}")]
    RunLog(#[from] RunLogError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors reading or writing run log files
#[derive(Debug, Error)]
pub enum RunLogError {
    #[error("Failed to access run log {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Refusing to write a run log without records")]
    Empty,
}

/// Result type alias for Jar-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use catalog::{run_harvest, HarvestReport, Selection};
pub use config::Config;
pub use state::{OutcomeRecord, OutcomeStatus};
