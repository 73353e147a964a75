//! Finds the likely web origins of a text passage.
//!
//! A search provider supplies candidate pages, every candidate's text is
//! fetched concurrently, and each one is scored against the passage with a
//! patch-wise similarity ratio. See [`SourceFinder`].

pub mod config;
pub mod dates;
pub mod error;
pub mod fetch;
pub mod orchestrator;
pub mod providers;
pub mod similarity;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;
pub mod types;

pub use config::{Config, FinderConfig};
pub use error::{Result, SourceSearchError};
pub use orchestrator::SourceFinder;
pub use providers::BingSearch;
pub use similarity::PatchSettings;
pub use traits::{ContentFetcher, SearchProvider};
pub use types::{
    CandidatePage, FetchOutcome, IndexedOutcome, QueryResults, ScoredSource, SearchRequest,
    SearchSession, SourcesArtifact,
};
