use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, warn};

use apify_client::{ApifyClient, BingSearchItem};
use serper_client::SerperClient;

use crate::traits::{ContentFetcher, SearchProvider};
use crate::types::{CandidatePage, FetchOutcome, QueryResults, SearchRequest};

// --- SearchProvider impl for ApifyClient (Bing) ---

/// Bing search through the Apify actor.
pub struct BingSearch {
    client: ApifyClient,
    market_code: String,
}

impl BingSearch {
    pub fn new(client: ApifyClient, market_code: &str) -> Self {
        Self {
            client,
            market_code: market_code.to_string(),
        }
    }
}

#[async_trait]
impl SearchProvider for BingSearch {
    async fn search(
        &self,
        request: &SearchRequest,
        max_results: usize,
    ) -> Result<Vec<QueryResults>> {
        let per_page = u32::try_from(max_results).unwrap_or(u32::MAX);
        let items = self
            .client
            .bing_search(request.queries(), per_page, &self.market_code)
            .await
            .context("Bing search via Apify failed")?;

        info!(
            queries = request.queries().len(),
            items = items.len(),
            "Bing search complete"
        );
        Ok(items.into_iter().map(query_results_from_item).collect())
    }
}

pub(crate) fn query_results_from_item(item: BingSearchItem) -> QueryResults {
    let candidates = item
        .pages
        .into_iter()
        .enumerate()
        .map(|(index, page)| CandidatePage {
            index,
            link: page.link,
            title: page.title,
            description: page.description,
            raw_date: page.date,
        })
        .collect();

    QueryResults {
        keyword: item.keyword,
        query_url: item.url,
        candidates,
    }
}

// --- ContentFetcher impl for SerperClient ---

#[async_trait]
impl ContentFetcher for SerperClient {
    async fn fetch(&self, url: &str, timeout: Duration) -> FetchOutcome {
        match self.scrape(url, timeout).await {
            Ok(page) => FetchOutcome::Content(page.text),
            Err(e) => {
                warn!(url, fetcher = "serper", error = %e, "Content fetch failed");
                FetchOutcome::Failed
            }
        }
    }

    fn name(&self) -> &str {
        "serper"
    }
}
