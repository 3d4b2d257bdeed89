//! Statistics generation from run logs
//!
//! This module provides functionality for summarizing a prior run log and
//! displaying the result.

use crate::output::run_log::ParsedRunLog;
use crate::state::OutcomeStatus;
use std::collections::HashMap;

/// Run statistics summary
#[derive(Debug, Clone)]
pub struct RunStatistics {
    /// Number of outcome records in the log
    pub total_records: u64,

    /// Count of records by status
    pub records_by_status: HashMap<OutcomeStatus, u64>,

    /// Records that count as successful
    pub successful: u64,

    /// Records a retry run would pick up
    pub retryable: u64,

    /// Counters from the log header, when present
    pub header_tried: Option<u64>,
    pub header_successful: Option<u64>,
}

impl RunStatistics {
    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_records == 0 {
            return 0.0;
        }
        (self.successful as f64 / self.total_records as f64) * 100.0
    }

    /// Returns true if the header counters agree with the records
    pub fn header_consistent(&self) -> bool {
        self.header_tried.map_or(true, |t| t == self.total_records)
            && self
                .header_successful
                .map_or(true, |s| s == self.successful)
    }
}

/// Computes statistics from a parsed run log
pub fn compute_statistics(log: &ParsedRunLog) -> RunStatistics {
    let mut records_by_status = HashMap::new();
    for record in &log.records {
        *records_by_status.entry(record.status).or_insert(0u64) += 1;
    }

    let successful = log
        .records
        .iter()
        .filter(|r| r.status.is_success())
        .count() as u64;

    RunStatistics {
        total_records: log.records.len() as u64,
        records_by_status,
        successful,
        retryable: log.retry_ids().len() as u64,
        header_tried: log.total_tried,
        header_successful: log.total_successful,
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &RunStatistics) {
    println!("=== Run Statistics ===\n");

    println!("Overview:");
    println!("  Identifiers tried: {}", stats.total_records);
    println!("  Successful: {}", stats.successful);
    println!("  Retryable failures: {}", stats.retryable);
    println!();

    println!("Outcomes by Status:");
    let mut status_counts: Vec<_> = stats.records_by_status.iter().collect();
    status_counts.sort_by(|a, b| b.1.cmp(a.1));

    for (status, count) in status_counts {
        let percentage = if stats.total_records > 0 {
            (*count as f64 / stats.total_records as f64) * 100.0
        } else {
            0.0
        };
        println!("  {:?} [{}]: {} ({:.1}%)", status, status, count, percentage);
    }
    println!();

    if !stats.header_consistent() {
        println!(
            "Warning: header counters (tried {:?}, successful {:?}) disagree with the records",
            stats.header_tried, stats.header_successful
        );
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} identifiers)",
        stats.success_rate(),
        stats.successful,
        stats.total_records
    );
}
