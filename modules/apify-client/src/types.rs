use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Bing SERP scraper types ---

/// Input for the Bing search results scraper actor.
#[derive(Debug, Clone, Serialize)]
pub struct BingSearchInput {
    pub queries: Vec<String>,
    #[serde(rename = "resultPerPage")]
    pub result_per_page: u32,
    #[serde(rename = "marketCode")]
    pub market_code: String,
}

/// One dataset item from the Bing scraper: the result page for a single query.
#[derive(Debug, Clone, Deserialize)]
pub struct BingSearchItem {
    /// The keyword Bing reports having searched for.
    #[serde(default)]
    pub keyword: String,
    /// The SERP URL that was scraped.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub pages: Vec<BingPage>,
}

/// A single organic result on a Bing results page.
#[derive(Debug, Clone, Deserialize)]
pub struct BingPage {
    pub link: String,
    pub title: Option<String>,
    #[serde(alias = "desc")]
    pub description: Option<String>,
    /// Free-form date as shown by Bing, e.g. "3 days ago" or "Jan 5, 2023".
    pub date: Option<String>,
}

/// Wrapper for Apify API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Apify actor run metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct RunData {
    pub id: String,
    pub status: String,
    #[serde(rename = "defaultDatasetId")]
    pub default_dataset_id: String,
    #[serde(rename = "startedAt")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "finishedAt")]
    pub finished_at: Option<DateTime<Utc>>,
}
