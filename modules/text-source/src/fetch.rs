//! Concurrent content fetching for one batch of candidates.
//!
//! All fetches run as futures on the calling task, at most
//! `max_concurrent` at a time. When the batch deadline fires, whatever is
//! still running (or not yet started) is dropped and recorded as `Failed`.
//! The returned outcomes are always sorted by candidate index.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::traits::ContentFetcher;
use crate::types::{CandidatePage, FetchOutcome, IndexedOutcome};

#[derive(Debug, Clone, Copy)]
pub struct BatchLimits {
    pub fetch_timeout: Duration,
    pub batch_deadline: Duration,
    pub max_concurrent: usize,
}

/// Fetch every candidate. Returns exactly one outcome per candidate, ordered
/// by `index` regardless of completion order. Candidates sharing an index
/// keep their relative order.
pub async fn fetch_batch(
    fetcher: &dyn ContentFetcher,
    candidates: &[CandidatePage],
    limits: BatchLimits,
) -> Vec<IndexedOutcome> {
    let deadline = tokio::time::sleep(limits.batch_deadline);
    tokio::pin!(deadline);

    let mut in_flight = stream::iter(candidates.iter().enumerate().map(move |(slot, candidate)| {
        let link = candidate.link.as_str();
        async move { (slot, fetch_one(fetcher, link, limits.fetch_timeout).await) }
    }))
    .buffer_unordered(limits.max_concurrent.max(1));

    // Outcomes are keyed by position in `candidates`, never by index.
    let mut settled: Vec<Option<FetchOutcome>> = candidates.iter().map(|_| None).collect();
    let mut pending = candidates.len();
    loop {
        tokio::select! {
            biased;
            next = in_flight.next() => match next {
                Some((slot, outcome)) => {
                    debug!(index = candidates[slot].index, failed = outcome.is_failed(), "Fetch settled");
                    settled[slot] = Some(outcome);
                    pending -= 1;
                }
                None => break,
            },
            () = &mut deadline => {
                warn!(
                    pending,
                    deadline_ms = limits.batch_deadline.as_millis() as u64,
                    "Fetch batch deadline reached, cancelling remaining fetches"
                );
                break;
            }
        }
    }
    // Dropping the stream cancels every fetch that has not settled.
    drop(in_flight);

    let mut outcomes: Vec<IndexedOutcome> = candidates
        .iter()
        .zip(settled)
        .map(|(candidate, outcome)| IndexedOutcome {
            index: candidate.index,
            outcome: outcome.unwrap_or(FetchOutcome::Failed),
        })
        .collect();
    outcomes.sort_by_key(|o| o.index);
    outcomes
}

/// A single fetch, bounded by `timeout` even if the fetcher ignores it.
async fn fetch_one(fetcher: &dyn ContentFetcher, url: &str, timeout: Duration) -> FetchOutcome {
    match tokio::time::timeout(timeout, fetcher.fetch(url, timeout)).await {
        Ok(outcome) => outcome,
        Err(_) => {
            warn!(
                url,
                fetcher = fetcher.name(),
                timeout_ms = timeout.as_millis() as u64,
                "Content fetch timed out"
            );
            FetchOutcome::Failed
        }
    }
}
