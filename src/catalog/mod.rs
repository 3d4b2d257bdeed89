//! Catalog module for scanning catalog pages and downloading archives
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching of catalog pages
//! - Two-tier selection of the archive to download
//! - Archive downloads into the content directory
//! - Bounded concurrent scheduling over an identifier set

mod downloader;
mod fetcher;
mod scanner;
mod scheduler;
mod selector;

pub use downloader::{archive_file_name, DownloadError, Downloader};
pub use fetcher::{build_http_client, fetch_url, FetchResult};
pub use scanner::CatalogScanner;
pub use scheduler::{schedule, ScheduleResult};
pub use selector::{has_exact_tag, CandidateLink, ContentSelector, Selection};

use crate::config::Config;
use crate::output::RunLog;
use crate::{CatalogId, HarvestError};
use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What a harvest run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestReport {
    /// The identifier set was empty; nothing was fetched and no log written
    NothingToDo,

    /// Every identifier was processed and the run log written
    Completed {
        log_path: PathBuf,
        tried: usize,
        successful: usize,
    },
}

/// Runs a complete harvest over `ids`
///
/// This is the main entry point for a run. It will:
/// 1. Build the HTTP client and scanner
/// 2. Scan every identifier with the configured worker pool
/// 3. Write the run log once all records are collected
///
/// An empty `ids` is reported as [`HarvestReport::NothingToDo`] without
/// touching the network or the log directory.
///
/// # Example
///
/// ```no_run
/// use jar_harvest::catalog::run_harvest;
/// use jar_harvest::config::Config;
///
/// # async fn example() -> Result<(), jar_harvest::HarvestError> {
/// let report = run_harvest(Config::default(), (100..=120).collect()).await?;
/// println!("{:?}", report);
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(
    config: Config,
    ids: Vec<CatalogId>,
) -> Result<HarvestReport, HarvestError> {
    if ids.is_empty() {
        tracing::info!("No catalog identifiers to process, nothing to do");
        return Ok(HarvestReport::NothingToDo);
    }

    let client = build_http_client(&config.http)?;
    let scanner = Arc::new(CatalogScanner::new(&config, client)?);
    let max_workers = config.scheduler.max_workers as usize;

    let start_time = std::time::Instant::now();
    let result = schedule(&ids, max_workers, move |id| {
        let scanner = Arc::clone(&scanner);
        async move { scanner.scan(id).await }
    })
    .await;

    let records = match result {
        ScheduleResult::Completed(records) => records,
        ScheduleResult::NothingScheduled => return Ok(HarvestReport::NothingToDo),
    };

    let run_log = RunLog::new(records);
    let log_path = run_log.write_to_dir(Path::new(&config.output.log_dir), Local::now())?;

    tracing::info!(
        "Harvest completed: {}/{} successful in {:?}",
        run_log.total_successful(),
        run_log.total_tried(),
        start_time.elapsed()
    );
    tracing::info!("Log saved to {}", log_path.display());

    Ok(HarvestReport::Completed {
        log_path,
        tried: run_log.total_tried(),
        successful: run_log.total_successful(),
    })
}
