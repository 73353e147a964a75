pub mod error;

pub use error::{Result, SerperError};

use std::time::Duration;

use serde::Deserialize;

const SCRAPE_URL: &str = "https://scrape.serper.dev";

/// Rendered text of a page as returned by the scrape endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapedPage {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

pub struct SerperClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl SerperClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_endpoint(api_key, SCRAPE_URL)
    }

    pub fn with_endpoint(api_key: &str, endpoint: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Fetch the extracted text of `url`. `timeout` bounds the whole request,
    /// including reading the body.
    pub async fn scrape(&self, url: &str, timeout: Duration) -> Result<ScrapedPage> {
        let body = serde_json::json!({ "url": url });

        let resp = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .header("Content-Type", "application/json")
            .timeout(timeout)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SerperError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let page: ScrapedPage = resp.json().await?;
        tracing::debug!(url, bytes = page.text.len(), "Serper scrape complete");
        Ok(page)
    }
}
