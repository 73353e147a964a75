use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// --- Requests ---

/// What to search for: one passage or several at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchRequest {
    Single(String),
    Batch(Vec<String>),
}

impl SearchRequest {
    /// Build a request from a list of passages: one passage is a `Single`,
    /// anything else a `Batch`.
    pub fn from_texts(mut texts: Vec<String>) -> Self {
        if texts.len() == 1 {
            Self::Single(texts.remove(0))
        } else {
            Self::Batch(texts)
        }
    }

    pub fn queries(&self) -> &[String] {
        match self {
            Self::Single(text) => std::slice::from_ref(text),
            Self::Batch(texts) => texts,
        }
    }

    pub fn is_batch(&self) -> bool {
        matches!(self, Self::Batch(_))
    }
}

// --- Provider output ---

/// One entry from the search provider's result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidatePage {
    /// Position in the provider's result list. Unique within a session.
    pub index: usize,
    pub link: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Date exactly as the provider rendered it.
    pub raw_date: Option<String>,
}

/// The provider's answer for a single query.
#[derive(Debug, Clone, Default)]
pub struct QueryResults {
    /// The keyword the provider actually searched for.
    pub keyword: String,
    pub query_url: String,
    pub candidates: Vec<CandidatePage>,
}

// --- Fetching ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Content(String),
    /// Timed out, non-success status, transport error or cancelled.
    Failed,
}

impl FetchOutcome {
    /// Extracted text, if any. Blank content counts as none.
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Content(text) if !text.trim().is_empty() => Some(text),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// A fetch result tagged with the candidate it was launched for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedOutcome {
    pub index: usize,
    pub outcome: FetchOutcome,
}

// --- Output ---

/// A candidate page annotated with its fetched text, score and date.
/// Serializes to the `sources[]` entry of the output artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredSource {
    pub text: String,
    pub searched_by_text: String,
    pub query_url: String,
    pub website_link: String,
    pub index: usize,
    pub website_title: Option<String>,
    pub website_description: Option<String>,
    pub website_text: Option<String>,
    pub source_score: Option<f64>,
    pub website_date: Option<NaiveDate>,
    #[serde(skip)]
    pub raw_date: Option<String>,
    pub searched_at: DateTime<Utc>,
}

/// Everything one search produced for one passage.
#[derive(Debug, Clone)]
pub struct SearchSession {
    pub original_text: String,
    pub query_url: String,
    pub searched_by_keyword: String,
    pub searched_at: DateTime<Utc>,
    /// Ordered by `index`, one entry per candidate.
    pub sources: Vec<ScoredSource>,
}

impl SearchSession {
    pub fn artifact(&self) -> SourcesArtifact<'_> {
        SourcesArtifact {
            sources: &self.sources,
        }
    }

    /// Highest-scoring source, if any candidate could be scored.
    pub fn best_match(&self) -> Option<&ScoredSource> {
        self.sources
            .iter()
            .filter(|s| s.source_score.is_some())
            .max_by(|a, b| {
                a.source_score
                    .partial_cmp(&b.source_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}

/// Serialized form of a session: `{ "sources": [...] }`.
#[derive(Debug, Serialize)]
pub struct SourcesArtifact<'a> {
    pub sources: &'a [ScoredSource],
}
