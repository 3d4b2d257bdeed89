//! Jar-Harvest main entry point
//!
//! This is the command-line interface for the Jar-Harvest catalog scanner.

use anyhow::Context;
use clap::{ArgGroup, Parser};
use jar_harvest::catalog::{run_harvest, HarvestReport};
use jar_harvest::config::{load_config_with_hash, Config};
use jar_harvest::output::{compute_statistics, print_statistics, read_retry_ids, read_run_log};
use jar_harvest::CatalogId;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Jar-Harvest: downloads device-specific archives from a numbered catalog
///
/// Scans a range of catalog identifiers, or retries the recoverable failures
/// of an earlier run, and writes a run log with one line per identifier.
#[derive(Parser, Debug)]
#[command(name = "jar-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Catalog scanner for device-specific archive packages", long_about = None)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["start", "retry", "stats"])
))]
struct Cli {
    /// First catalog identifier to scan (inclusive)
    #[arg(long, value_name = "ID", requires = "end")]
    start: Option<CatalogId>,

    /// Last catalog identifier to scan (inclusive)
    #[arg(long, value_name = "ID", requires = "start")]
    end: Option<CatalogId>,

    /// Retry the recoverable failures recorded in a prior run log
    #[arg(long, value_name = "LOG")]
    retry: Option<PathBuf>,

    /// Show statistics for a prior run log and exit
    #[arg(long, value_name = "LOG")]
    stats: Option<PathBuf>,

    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show the configuration and identifiers that would be scanned, then exit
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    if let Some(log_path) = &cli.stats {
        return handle_stats(log_path);
    }

    let config = load_configuration(cli.config.as_deref())?;

    let ids = if let Some(log_path) = &cli.retry {
        let ids = read_retry_ids(log_path)
            .with_context(|| format!("Failed to read retry log {}", log_path.display()))?;
        tracing::info!(
            "Recovered {} retryable identifiers from {}",
            ids.len(),
            log_path.display()
        );
        ids
    } else {
        match (cli.start, cli.end) {
            (Some(start), Some(end)) => (start..=end).collect(),
            _ => anyhow::bail!("both --start and --end are required for a range scan"),
        }
    };

    if cli.dry_run {
        handle_dry_run(&config, &ids);
        return Ok(());
    }

    handle_harvest(config, ids).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("jar_harvest=info,warn"),
            1 => EnvFilter::new("jar_harvest=debug,info"),
            2 => EnvFilter::new("jar_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file if one was given, otherwise the defaults
fn load_configuration(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::info!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    match load_config_with_hash(path) {
        Ok((config, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            Err(e.into())
        }
    }
}

/// Handles the --stats mode: summarizes a prior run log
fn handle_stats(log_path: &Path) -> anyhow::Result<()> {
    println!("Run log: {}\n", log_path.display());

    let log = read_run_log(log_path)
        .with_context(|| format!("Failed to read run log {}", log_path.display()))?;
    let stats = compute_statistics(&log);

    print_statistics(&stats);

    Ok(())
}

/// Handles the --dry-run mode: shows what would be scanned
fn handle_dry_run(config: &Config, ids: &[CatalogId]) {
    println!("=== Jar-Harvest Dry Run ===\n");

    println!("Catalog:");
    println!("  Base URL: {}", config.catalog.base_url);
    println!("  Device tag: {}", config.catalog.device_tag);
    println!("  Download path: {}", config.catalog.download_path);
    println!("  Marker class: {}", config.catalog.marker_class);

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Page timeout: {}s", config.http.page_timeout_secs);
    println!("  Download timeout: {}s", config.http.download_timeout_secs);

    println!("\nScheduler:");
    println!("  Max workers: {}", config.scheduler.max_workers);

    println!("\nOutput:");
    println!("  Content directory: {}", config.output.content_dir);
    println!("  Archive extension: .{}", config.output.archive_extension);
    println!("  Log directory: {}", config.output.log_dir);

    match (ids.first(), ids.last()) {
        (Some(first), Some(last)) => {
            println!("\n✓ Would scan {} identifiers ({} .. {})", ids.len(), first, last)
        }
        _ => println!("\n✓ Nothing to scan"),
    }
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, ids: Vec<CatalogId>) -> anyhow::Result<()> {
    tracing::info!(
        "Starting harvest of {} identifiers with {} workers",
        ids.len(),
        config.scheduler.max_workers
    );

    match run_harvest(config, ids).await {
        Ok(HarvestReport::NothingToDo) => {
            println!("Nothing to do: no identifiers to process, no log written");
            Ok(())
        }
        Ok(HarvestReport::Completed {
            log_path,
            tried,
            successful,
        }) => {
            println!(
                "Log saved to {} ({} / {} successful)",
                log_path.display(),
                successful,
                tried
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
