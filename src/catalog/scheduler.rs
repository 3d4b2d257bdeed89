//! Work scheduler for catalog identifiers
//!
//! This module handles:
//! - Bounding in-flight scans with a semaphore
//! - Collecting outcome records from workers over a channel
//! - Returning records in input order regardless of completion order

use crate::state::OutcomeRecord;
use crate::CatalogId;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

/// Result of scheduling a set of identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleResult {
    /// The identifier set was empty; no work was done
    NothingScheduled,

    /// One record per scheduled identifier, in scheduling order
    Completed(Vec<OutcomeRecord>),
}

/// Runs `scan` once per identifier with at most `max_workers` in flight
///
/// Each worker sends its record to a single collector; records are placed by
/// input position, so the returned sequence matches `ids` even though scans
/// finish in any order. A worker that dies without reporting still gets a
/// transport failure record, so the result always has `ids.len()` entries.
///
/// # Example
///
/// ```
/// use jar_harvest::catalog::{schedule, ScheduleResult};
/// use jar_harvest::OutcomeRecord;
///
/// # #[tokio::main]
/// # async fn main() {
/// let result = schedule(&[3, 1, 2], 2, |id| async move { OutcomeRecord::success(id) }).await;
/// match result {
///     ScheduleResult::Completed(records) => {
///         let ids: Vec<_> = records.iter().map(|r| r.id).collect();
///         assert_eq!(ids, vec![3, 1, 2]);
///     }
///     ScheduleResult::NothingScheduled => unreachable!(),
/// }
/// # }
/// ```
pub async fn schedule<F, Fut>(ids: &[CatalogId], max_workers: usize, scan: F) -> ScheduleResult
where
    F: Fn(CatalogId) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = OutcomeRecord> + Send + 'static,
{
    if ids.is_empty() {
        return ScheduleResult::NothingScheduled;
    }

    let total = ids.len();
    let semaphore = Arc::new(Semaphore::new(max_workers.max(1)));
    let scan = Arc::new(scan);
    let (tx, mut rx) = mpsc::unbounded_channel::<(usize, OutcomeRecord)>();
    let mut workers = JoinSet::new();

    tracing::info!(
        "Scheduling {} identifiers across {} workers",
        total,
        max_workers.max(1)
    );

    for (position, &id) in ids.iter().enumerate() {
        // Blocks until a worker slot frees up
        let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
            tracing::error!("Worker pool closed before {} could be scheduled", id);
            break;
        };

        let scan = Arc::clone(&scan);
        let tx = tx.clone();
        workers.spawn(async move {
            let _permit = permit;
            let record = scan(id).await;
            let _ = tx.send((position, record));
        });
    }
    drop(tx);

    let mut slots: Vec<Option<OutcomeRecord>> = vec![None; total];
    let mut completed = 0usize;

    while let Some((position, record)) = rx.recv().await {
        slots[position] = Some(record);
        completed += 1;

        if completed % 10 == 0 {
            tracing::info!("Progress: {}/{} identifiers processed", completed, total);
        }
    }

    while let Some(joined) = workers.join_next().await {
        if let Err(e) = joined {
            tracing::error!("Worker task failed: {}", e);
        }
    }

    let records = slots
        .into_iter()
        .zip(ids)
        .map(|(slot, &id)| {
            slot.unwrap_or_else(|| OutcomeRecord::transport(id, "worker task aborted"))
        })
        .collect();

    ScheduleResult::Completed(records)
}
