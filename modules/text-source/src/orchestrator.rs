//! Search → fetch → score → assemble.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};

use crate::config::FinderConfig;
use crate::dates;
use crate::error::{Result, SourceSearchError};
use crate::fetch::{fetch_batch, BatchLimits};
use crate::similarity::source_score;
use crate::traits::{ContentFetcher, SearchProvider};
use crate::types::{CandidatePage, QueryResults, ScoredSource, SearchRequest, SearchSession};

pub struct SourceFinder {
    search: Arc<dyn SearchProvider>,
    fetcher: Arc<dyn ContentFetcher>,
    config: FinderConfig,
}

impl SourceFinder {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        fetcher: Arc<dyn ContentFetcher>,
        config: FinderConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            search,
            fetcher,
            config,
        })
    }

    /// Find where `text` likely came from, using up to `max_results`
    /// candidates from the search provider.
    ///
    /// Fails only if the search itself fails. Candidates whose content could
    /// not be fetched come back without text or score.
    pub async fn find_text_source(&self, text: &str, max_results: usize) -> Result<SearchSession> {
        let mut sessions = self
            .find(SearchRequest::Single(text.to_string()), max_results)
            .await?;
        sessions
            .pop()
            .ok_or(SourceSearchError::MissingResults { position: 0 })
    }

    /// Search every passage in `request` with one provider call and build a
    /// session per passage, in request order.
    pub async fn find(
        &self,
        request: SearchRequest,
        max_results: usize,
    ) -> Result<Vec<SearchSession>> {
        validate_request(&request, max_results)?;

        let searched_at = Utc::now();
        info!(
            queries = request.queries().len(),
            text_chars = request.queries().iter().map(|q| q.chars().count()).sum::<usize>(),
            max_results,
            "Searching for text sources"
        );

        let results = self
            .search
            .search(&request, max_results)
            .await
            .map_err(SourceSearchError::SearchProvider)?;

        let queries = request.queries();
        if results.len() < queries.len() {
            return Err(SourceSearchError::MissingResults {
                position: results.len(),
            });
        }
        for (position, set) in results.iter().enumerate() {
            check_candidate_indices(position, &set.candidates)?;
        }

        let sessions = futures::future::join_all(
            queries
                .iter()
                .zip(results)
                .map(|(text, results)| self.build_session(text, results, searched_at)),
        )
        .await;

        Ok(sessions)
    }

    async fn build_session(
        &self,
        text: &str,
        results: QueryResults,
        searched_at: DateTime<Utc>,
    ) -> SearchSession {
        let QueryResults {
            keyword,
            query_url,
            mut candidates,
        } = results;
        candidates.sort_by_key(|c| c.index);

        let limits = BatchLimits {
            fetch_timeout: self.config.fetch_timeout,
            batch_deadline: self.config.batch_deadline,
            max_concurrent: self.config.max_concurrent_fetches,
        };
        let outcomes = fetch_batch(self.fetcher.as_ref(), &candidates, limits).await;
        let website_texts: Vec<Option<String>> =
            outcomes.into_iter().map(|o| o.outcome.into_text()).collect();
        let scores = self.score_all(text, &website_texts).await;

        let context = SourceContext {
            text,
            keyword: &keyword,
            query_url: &query_url,
            today: searched_at.date_naive(),
            searched_at,
        };
        let sources: Vec<ScoredSource> = candidates
            .into_iter()
            .zip(website_texts)
            .zip(scores)
            .map(|((page, website_text), score)| context.scored_source(page, website_text, score))
            .collect();

        let fetched = sources.iter().filter(|s| s.website_text.is_some()).count();
        info!(
            candidates = sources.len(),
            fetched,
            failed = sources.len() - fetched,
            "Search session assembled"
        );

        SearchSession {
            original_text: text.to_string(),
            query_url,
            searched_by_keyword: keyword,
            searched_at,
            sources,
        }
    }

    /// Score every fetched page against `text` on the blocking pool.
    async fn score_all(&self, text: &str, website_texts: &[Option<String>]) -> Vec<Option<f64>> {
        let text = text.to_string();
        let contents = website_texts.to_vec();
        let patch = self.config.patch;

        let scored = tokio::task::spawn_blocking(move || {
            contents
                .iter()
                .map(|content| {
                    content
                        .as_deref()
                        .map(|content| source_score(&text, content, &patch))
                })
                .collect::<Vec<_>>()
        })
        .await;

        match scored {
            Ok(scores) => scores,
            Err(e) => {
                warn!(error = %e, "Scoring task failed, leaving scores empty");
                vec![None; website_texts.len()]
            }
        }
    }
}

/// Per-session fields shared by every source.
struct SourceContext<'a> {
    text: &'a str,
    keyword: &'a str,
    query_url: &'a str,
    today: NaiveDate,
    searched_at: DateTime<Utc>,
}

impl SourceContext<'_> {
    fn scored_source(
        &self,
        page: CandidatePage,
        website_text: Option<String>,
        source_score: Option<f64>,
    ) -> ScoredSource {
        let website_date = page
            .raw_date
            .as_deref()
            .and_then(|raw| match dates::normalize(raw, self.today) {
                Ok(date) => Some(date),
                Err(e) => {
                    warn!(link = %page.link, error = %e, "Unparseable website date, leaving it empty");
                    None
                }
            });

        ScoredSource {
            text: self.text.to_string(),
            searched_by_text: self.keyword.to_string(),
            query_url: self.query_url.to_string(),
            website_link: page.link,
            index: page.index,
            website_title: page.title,
            website_description: page.description,
            website_text,
            source_score,
            website_date,
            raw_date: page.raw_date,
            searched_at: self.searched_at,
        }
    }
}

/// A result set's candidate indices must be exactly `0..N`, once each.
fn check_candidate_indices(position: usize, candidates: &[CandidatePage]) -> Result<()> {
    let mut seen = vec![false; candidates.len()];
    for candidate in candidates {
        match seen.get_mut(candidate.index) {
            Some(slot) if !*slot => *slot = true,
            Some(_) => {
                return Err(SourceSearchError::InconsistentCandidates {
                    position,
                    reason: format!("duplicate index {}", candidate.index),
                })
            }
            None => {
                return Err(SourceSearchError::InconsistentCandidates {
                    position,
                    reason: format!(
                        "index {} out of range for {} candidates",
                        candidate.index,
                        candidates.len()
                    ),
                })
            }
        }
    }
    Ok(())
}

fn validate_request(request: &SearchRequest, max_results: usize) -> Result<()> {
    if max_results == 0 {
        return Err(SourceSearchError::Validation(
            "max_results must be greater than 0".into(),
        ));
    }
    let queries = request.queries();
    if queries.is_empty() {
        return Err(SourceSearchError::Validation(
            "at least one text is required".into(),
        ));
    }
    if let Some(position) = queries.iter().position(|q| q.trim().is_empty()) {
        return Err(SourceSearchError::Validation(format!(
            "text {position} is empty"
        )));
    }
    Ok(())
}
