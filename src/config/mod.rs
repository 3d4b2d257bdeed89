//! Configuration module for Jar-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so the harvester also runs without a file.
//!
//! # Example
//!
//! ```no_run
//! use jar_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Worker pool size: {}", config.scheduler.max_workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CatalogConfig, Config, HttpConfig, OutputConfig, SchedulerConfig, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
