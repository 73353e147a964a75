// Trait seams for the two external services.
//
// SearchProvider: turns passages into candidate pages.
// ContentFetcher: turns a candidate URL into its text.
//
// SourceFinder only sees these traits, so tests swap in the mocks from
// `testing.rs`: no network, no API keys.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{FetchOutcome, QueryResults, SearchRequest};

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Search every query in `request`, returning one `QueryResults` per query
    /// in request order. Candidate indices are 0-based positions in each list.
    async fn search(&self, request: &SearchRequest, max_results: usize)
        -> Result<Vec<QueryResults>>;
}

#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch the text of `url`, giving up after `timeout`. Every failure mode
    /// settles to `FetchOutcome::Failed`.
    async fn fetch(&self, url: &str, timeout: Duration) -> FetchOutcome;

    fn name(&self) -> &str;
}
