//! Run log writing and parsing
//!
//! A run log is a flat text file written once at the end of a run:
//!
//! ```text
//! Total tried: 3
//! Total successful: 1
//! 200: yay
//! 201: nay (no working .jar)
//! 202: nay (error), Request timeout
//! ```
//!
//! Its name is `<YYYYMMDD_HHMMSS>_<firstId>-<lastId>.log`, with a `_<n>` suffix
//! added when that name is already taken.

use crate::state::OutcomeRecord;
use crate::{CatalogId, RunLogError};
use chrono::{DateTime, TimeZone};
use std::collections::HashSet;
use std::fmt::Display;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const TOTAL_TRIED_PREFIX: &str = "Total tried: ";
const TOTAL_SUCCESSFUL_PREFIX: &str = "Total successful: ";
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// The outcome records of one run, in scheduling order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLog {
    records: Vec<OutcomeRecord>,
}

impl RunLog {
    pub fn new(records: Vec<OutcomeRecord>) -> Self {
        Self { records }
    }

    pub fn total_tried(&self) -> usize {
        self.records.len()
    }

    pub fn total_successful(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.status.is_success())
            .count()
    }

    /// First and last identifier of the run
    pub fn id_range(&self) -> Option<(CatalogId, CatalogId)> {
        Some((self.records.first()?.id, self.records.last()?.id))
    }

    /// Renders the full file body: both counters, then one line per record
    pub fn render(&self) -> String {
        let mut body = format!(
            "{}{}\n{}{}\n",
            TOTAL_TRIED_PREFIX,
            self.total_tried(),
            TOTAL_SUCCESSFUL_PREFIX,
            self.total_successful()
        );

        for record in &self.records {
            body.push_str(&record.to_log_line());
            body.push('\n');
        }

        body
    }

    /// File name for this run, or `None` for a run without records
    pub fn file_name<Tz>(&self, timestamp: DateTime<Tz>) -> Option<String>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let (first, last) = self.id_range()?;
        Some(format!(
            "{}_{}-{}.log",
            timestamp.format("%Y%m%d_%H%M%S"),
            first,
            last
        ))
    }

    /// Writes the log into `dir` and returns its path
    ///
    /// An existing file with the same name is never overwritten. When the
    /// name is taken, `_1`, `_2`, ... is appended before the extension.
    pub fn write_to_dir<Tz>(
        &self,
        dir: &Path,
        timestamp: DateTime<Tz>,
    ) -> Result<PathBuf, RunLogError>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let name = self.file_name(timestamp).ok_or(RunLogError::Empty)?;
        let stem = name.trim_end_matches(".log");

        std::fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;

        let mut attempt = 0u32;
        let (path, mut file) = loop {
            let path = if attempt == 0 {
                dir.join(&name)
            } else {
                dir.join(format!("{}_{}.log", stem, attempt))
            };

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => break (path, file),
                Err(e) if e.kind() == ErrorKind::AlreadyExists && attempt < MAX_NAME_ATTEMPTS => {
                    tracing::warn!(
                        "Run log {} already exists, trying another name",
                        path.display()
                    );
                    attempt += 1;
                }
                Err(e) => return Err(io_error(&path, e)),
            }
        };

        file.write_all(self.render().as_bytes())
            .map_err(|e| io_error(&path, e))?;

        Ok(path)
    }
}

/// A run log read back from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRunLog {
    /// Value of the `Total tried` counter, if present
    pub total_tried: Option<u64>,

    /// Value of the `Total successful` counter, if present
    pub total_successful: Option<u64>,

    /// Records in file order
    pub records: Vec<OutcomeRecord>,
}

impl ParsedRunLog {
    /// Identifiers worth retrying, in log order, each at most once
    pub fn retry_ids(&self) -> Vec<CatalogId> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| r.status.is_retryable())
            .map(|r| r.id)
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

/// Parses run log text
///
/// Each line is read on its own. Lines that are neither counters nor records
/// are skipped, and so is a counter line whose value is not a number.
pub fn parse_run_log(content: &str) -> ParsedRunLog {
    let mut parsed = ParsedRunLog {
        total_tried: None,
        total_successful: None,
        records: Vec::new(),
    };

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(value) = line.strip_prefix(TOTAL_TRIED_PREFIX) {
            if let Some(count) = parse_counter(value, index + 1) {
                parsed.total_tried = Some(count);
            }
        } else if let Some(value) = line.strip_prefix(TOTAL_SUCCESSFUL_PREFIX) {
            if let Some(count) = parse_counter(value, index + 1) {
                parsed.total_successful = Some(count);
            }
        } else if let Some(record) = OutcomeRecord::from_log_line(line) {
            parsed.records.push(record);
        } else {
            tracing::debug!("Skipping unrecognized run log line {}: {}", index + 1, line);
        }
    }

    parsed
}

/// Reads and parses a run log file
pub fn read_run_log(path: &Path) -> Result<ParsedRunLog, RunLogError> {
    let content = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    Ok(parse_run_log(&content))
}

/// Recovers the identifiers to retry from a prior run log
///
/// Successes and the two permanent failures (`no working .jar`,
/// `no downloads found`) are skipped.
///
/// # Example
///
/// ```no_run
/// use jar_harvest::output::read_retry_ids;
/// use std::path::Path;
///
/// let ids = read_retry_ids(Path::new("20250101_120000_100-200.log")).unwrap();
/// println!("{} identifiers to retry", ids.len());
/// ```
pub fn read_retry_ids(path: &Path) -> Result<Vec<CatalogId>, RunLogError> {
    Ok(read_run_log(path)?.retry_ids())
}

fn parse_counter(value: &str, line: usize) -> Option<u64> {
    match value.trim().parse() {
        Ok(count) => Some(count),
        Err(_) => {
            tracing::warn!(
                "Ignoring run log line {}: counter '{}' is not a number",
                line,
                value.trim()
            );
            None
        }
    }
}

fn io_error(path: &Path, source: std::io::Error) -> RunLogError {
    RunLogError::Io {
        path: path.display().to_string(),
        source,
    }
}
