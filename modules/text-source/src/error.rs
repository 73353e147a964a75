use thiserror::Error;

pub type Result<T> = std::result::Result<T, SourceSearchError>;

/// Failures that abort a whole search. Per-candidate problems (failed fetches,
/// odd dates) never surface here; they are recorded on the candidate instead.
#[derive(Debug, Error)]
pub enum SourceSearchError {
    #[error("Search provider error: {0:#}")]
    SearchProvider(#[source] anyhow::Error),

    #[error("Search provider returned no results for query {position}")]
    MissingResults { position: usize },

    #[error("Search provider returned inconsistent candidates for query {position}: {reason}")]
    InconsistentCandidates { position: usize, reason: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_keeps_context_chain() {
        let inner = anyhow::anyhow!("status 502").context("Apify run failed");
        let err = SourceSearchError::SearchProvider(inner);
        assert_eq!(
            err.to_string(),
            "Search provider error: Apify run failed: status 502"
        );
    }

    #[test]
    fn missing_results_names_position() {
        let err = SourceSearchError::MissingResults { position: 2 };
        assert!(err.to_string().contains("query 2"));
    }

    #[test]
    fn inconsistent_candidates_names_position_and_reason() {
        let err = SourceSearchError::InconsistentCandidates {
            position: 1,
            reason: "duplicate index 0".into(),
        };
        assert_eq!(
            err.to_string(),
            "Search provider returned inconsistent candidates for query 1: duplicate index 0"
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SourceSearchError>();
    }
}
