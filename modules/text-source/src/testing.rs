// Test doubles for the two provider seams.
//
// - MockSearchProvider (SearchProvider): query text → canned QueryResults
// - MockFetcher (ContentFetcher): URL → text, failure or hang, with optional latency
//
// Plus small constructors for candidates and result sets.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::traits::{ContentFetcher, SearchProvider};
use crate::types::{CandidatePage, FetchOutcome, QueryResults, SearchRequest};

// ---------------------------------------------------------------------------
// Constructors
// ---------------------------------------------------------------------------

pub fn candidate(index: usize, link: &str) -> CandidatePage {
    CandidatePage {
        index,
        link: link.to_string(),
        title: None,
        description: None,
        raw_date: None,
    }
}

/// Result set for `keyword` whose candidates are `links`, indexed in order.
pub fn query_results(keyword: &str, links: &[&str]) -> QueryResults {
    QueryResults {
        keyword: keyword.to_string(),
        query_url: format!("https://www.bing.com/search?q={}", keyword.replace(' ', "+")),
        candidates: links
            .iter()
            .enumerate()
            .map(|(index, link)| candidate(index, link))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// MockSearchProvider
// ---------------------------------------------------------------------------

/// HashMap-based search provider. Results stop at the first query without
/// registered results, so the provider returns fewer result sets than queries.
pub struct MockSearchProvider {
    results: HashMap<String, QueryResults>,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl MockSearchProvider {
    pub fn new() -> Self {
        Self {
            results: HashMap::new(),
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn on_query(mut self, query: &str, results: QueryResults) -> Self {
        self.results.insert(query.to_string(), results);
        self
    }

    /// Every search fails with `message`.
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockSearchProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    async fn search(
        &self,
        request: &SearchRequest,
        max_results: usize,
    ) -> Result<Vec<QueryResults>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            bail!("MockSearchProvider: {message}");
        }

        Ok(request
            .queries()
            .iter()
            .map_while(|query| self.results.get(query).cloned())
            .map(|mut results| {
                results.candidates.truncate(max_results);
                results
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum PageBehavior {
    Content { text: String, latency: Duration },
    Failure,
    Hang,
}

/// URL-keyed content fetcher. Unregistered URLs fail. Records the order in
/// which fetches complete.
pub struct MockFetcher {
    pages: HashMap<String, PageBehavior>,
    completed: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            completed: Mutex::new(Vec::new()),
        }
    }

    pub fn on_page(self, url: &str, text: &str) -> Self {
        self.on_page_delayed(url, text, Duration::ZERO)
    }

    pub fn on_page_delayed(mut self, url: &str, text: &str, latency: Duration) -> Self {
        self.pages.insert(
            url.to_string(),
            PageBehavior::Content {
                text: text.to_string(),
                latency,
            },
        );
        self
    }

    pub fn on_failure(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), PageBehavior::Failure);
        self
    }

    /// The fetch never completes on its own.
    pub fn on_hang(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), PageBehavior::Hang);
        self
    }

    /// URLs of fetches that ran to completion, in completion order.
    pub fn completion_order(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentFetcher for MockFetcher {
    async fn fetch(&self, url: &str, _timeout: Duration) -> FetchOutcome {
        let outcome = match self.pages.get(url) {
            Some(PageBehavior::Content { text, latency }) => {
                if !latency.is_zero() {
                    tokio::time::sleep(*latency).await;
                }
                FetchOutcome::Content(text.clone())
            }
            Some(PageBehavior::Hang) => std::future::pending().await,
            Some(PageBehavior::Failure) | None => FetchOutcome::Failed,
        };
        self.completed.lock().unwrap().push(url.to_string());
        outcome
    }

    fn name(&self) -> &str {
        "mock"
    }
}
