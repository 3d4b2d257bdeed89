//! Output module for run logs and run statistics
//!
//! This module handles:
//! - Writing the run log once all outcome records are collected
//! - Reading a prior run log back, for retry mode and statistics
//! - Summarizing a run log for display

mod run_log;
pub mod stats;

pub use run_log::{parse_run_log, read_retry_ids, read_run_log, ParsedRunLog, RunLog};
pub use stats::{compute_statistics, print_statistics, RunStatistics};
