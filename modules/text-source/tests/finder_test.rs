//! End-to-end runs of `SourceFinder` against mock providers.

use std::sync::Arc;
use std::time::Duration;

use text_source::testing::{query_results, MockFetcher, MockSearchProvider};
use text_source::{FinderConfig, SearchRequest, SourceFinder, SourceSearchError};

const PASSAGE: &str = "The quick brown fox jumps over the lazy dog, repeated for length. \
The quick brown fox jumps over the lazy dog, repeated for length. \
The quick brown fox jumps over the lazy dog, repeated for length.";

fn finder(search: MockSearchProvider, fetcher: MockFetcher, config: FinderConfig) -> SourceFinder {
    SourceFinder::new(Arc::new(search), Arc::new(fetcher), config).expect("valid config")
}

#[tokio::test]
async fn matching_page_scores_high_and_failed_page_is_null() {
    assert!(PASSAGE.len() >= 150);
    let search = MockSearchProvider::new().on_query(
        PASSAGE,
        query_results(PASSAGE, &["https://origin.example", "https://down.example"]),
    );
    let fetcher = MockFetcher::new()
        .on_page("https://origin.example", PASSAGE)
        .on_failure("https://down.example");

    let session = finder(search, fetcher, FinderConfig::default())
        .find_text_source(PASSAGE, 10)
        .await
        .expect("search succeeds");

    assert_eq!(session.sources.len(), 2);
    let origin = &session.sources[0];
    assert_eq!(origin.index, 0);
    assert_eq!(origin.website_text.as_deref(), Some(PASSAGE));
    let score = origin.source_score.expect("origin is scored");
    assert!((score - 1.0).abs() < 1e-9, "score was {score}");

    let down = &session.sources[1];
    assert_eq!(down.index, 1);
    assert!(down.website_text.is_none());
    assert!(down.source_score.is_none());

    let json = serde_json::to_value(session.artifact()).unwrap();
    assert!(json["sources"][1]["website_text"].is_null());
    assert!(json["sources"][1]["source_score"].is_null());
    assert_eq!(json["sources"][0]["index"], 0);
}

#[tokio::test]
async fn output_order_is_independent_of_completion_order() {
    let links = ["https://slow.example", "https://fast.example", "https://medium.example"];
    let search = MockSearchProvider::new().on_query(PASSAGE, query_results(PASSAGE, &links));
    let fetcher = MockFetcher::new()
        .on_page_delayed(links[0], "slow page", Duration::from_millis(300))
        .on_page_delayed(links[1], "fast page", Duration::from_millis(10))
        .on_page_delayed(links[2], "medium page", Duration::from_millis(100));
    let fetcher = Arc::new(fetcher);
    let finder = SourceFinder::new(
        Arc::new(search),
        fetcher.clone(),
        FinderConfig::default(),
    )
    .unwrap();

    let session = finder.find_text_source(PASSAGE, 10).await.unwrap();

    assert_eq!(fetcher.completion_order(), vec![links[1], links[2], links[0]]);
    let indices: Vec<usize> = session.sources.iter().map(|s| s.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    let texts: Vec<_> = session
        .sources
        .iter()
        .map(|s| s.website_text.as_deref())
        .collect();
    assert_eq!(
        texts,
        vec![Some("slow page"), Some("fast page"), Some("medium page")]
    );
}

#[tokio::test]
async fn every_candidate_appears_exactly_once() {
    let links: Vec<String> = (0..12).map(|i| format!("https://site{i}.example")).collect();
    let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
    let search = MockSearchProvider::new().on_query(PASSAGE, query_results(PASSAGE, &link_refs));

    // Every third page fails, the rest answer with staggered latency.
    let mut fetcher = MockFetcher::new();
    for (i, link) in links.iter().enumerate() {
        fetcher = if i % 3 == 0 {
            fetcher.on_failure(link)
        } else {
            fetcher.on_page_delayed(link, PASSAGE, Duration::from_millis(((12 - i) * 5) as u64))
        };
    }
    let config = FinderConfig {
        max_concurrent_fetches: 4,
        ..Default::default()
    };

    let session = finder(search, fetcher, config)
        .find_text_source(PASSAGE, 12)
        .await
        .unwrap();

    assert_eq!(session.sources.len(), 12);
    for (position, source) in session.sources.iter().enumerate() {
        assert_eq!(source.index, position);
        assert_eq!(source.website_link, links[position]);
        assert_eq!(source.source_score.is_some(), source.website_text.is_some());
        assert_eq!(source.website_text.is_none(), position % 3 == 0);
    }
}

#[tokio::test]
async fn hung_fetch_is_cut_off_by_batch_deadline() {
    let search = MockSearchProvider::new().on_query(
        PASSAGE,
        query_results(PASSAGE, &["https://hung.example", "https://origin.example"]),
    );
    let fetcher = MockFetcher::new()
        .on_hang("https://hung.example")
        .on_page("https://origin.example", PASSAGE);
    let config = FinderConfig {
        fetch_timeout: Duration::from_secs(60),
        batch_deadline: Duration::from_millis(150),
        ..Default::default()
    };

    let session = tokio::time::timeout(
        Duration::from_secs(5),
        finder(search, fetcher, config).find_text_source(PASSAGE, 10),
    )
    .await
    .expect("batch deadline bounds the search")
    .unwrap();

    assert!(session.sources[0].website_text.is_none());
    assert!(session.sources[1].source_score.is_some());
}

#[tokio::test]
async fn provider_failure_produces_no_session() {
    let search = MockSearchProvider::new().failing("quota exceeded");
    let result = finder(search, MockFetcher::new(), FinderConfig::default())
        .find_text_source(PASSAGE, 10)
        .await;

    match result {
        Err(SourceSearchError::SearchProvider(e)) => {
            assert!(e.to_string().contains("quota exceeded"))
        }
        other => panic!("expected provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn batch_request_yields_one_session_per_text() {
    let other = "A completely different passage about sailing ships and distant harbours.";
    let search = MockSearchProvider::new()
        .on_query(PASSAGE, query_results("fox", &["https://fox.example"]))
        .on_query(other, query_results("ships", &["https://ships.example", "https://fox.example"]));
    let fetcher = MockFetcher::new()
        .on_page("https://fox.example", PASSAGE)
        .on_page("https://ships.example", other);

    let request = SearchRequest::Batch(vec![PASSAGE.to_string(), other.to_string()]);
    let sessions = finder(search, fetcher, FinderConfig::default())
        .find(request, 10)
        .await
        .unwrap();

    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].original_text, PASSAGE);
    assert_eq!(sessions[0].searched_by_keyword, "fox");
    assert_eq!(sessions[1].searched_by_keyword, "ships");
    assert_eq!(sessions[1].sources.len(), 2);
    assert_eq!(sessions[1].sources[0].source_score, Some(1.0));
    let cross = sessions[1].sources[1].source_score.unwrap();
    assert!(cross < 1.0);
    assert_eq!(
        sessions[1].best_match().map(|s| s.website_link.as_str()),
        Some("https://ships.example")
    );
}

#[tokio::test]
async fn batch_with_missing_result_set_fails() {
    let search = MockSearchProvider::new().on_query(PASSAGE, query_results("fox", &[]));
    let request = SearchRequest::Batch(vec![PASSAGE.to_string(), "unanswered".to_string()]);

    let err = finder(search, MockFetcher::new(), FinderConfig::default())
        .find(request, 10)
        .await
        .unwrap_err();

    assert!(matches!(err, SourceSearchError::MissingResults { position: 1 }));
}

#[tokio::test]
async fn max_results_limits_candidates() {
    let links = ["https://a.example", "https://b.example", "https://c.example"];
    let search = MockSearchProvider::new().on_query(PASSAGE, query_results(PASSAGE, &links));

    let session = finder(search, MockFetcher::new(), FinderConfig::default())
        .find_text_source(PASSAGE, 2)
        .await
        .unwrap();

    assert_eq!(session.sources.len(), 2);
    assert!(session.sources.iter().all(|s| s.source_score.is_none()));
}

#[tokio::test]
async fn shared_candidate_index_fails_before_fetching() {
    let mut results = query_results(
        PASSAGE,
        &["https://hung.example", "https://ok.example", "https://x.example"],
    );
    results.candidates[1].index = 0;
    results.candidates[2].index = 1;
    let search = MockSearchProvider::new().on_query(PASSAGE, results);
    let fetcher = Arc::new(
        MockFetcher::new()
            .on_hang("https://hung.example")
            .on_page("https://ok.example", "ok")
            .on_page("https://x.example", "x"),
    );
    let config = FinderConfig {
        batch_deadline: Duration::from_millis(100),
        ..Default::default()
    };
    let finder = SourceFinder::new(Arc::new(search), fetcher.clone(), config).unwrap();

    let err = finder.find_text_source(PASSAGE, 10).await.unwrap_err();

    assert!(matches!(
        err,
        SourceSearchError::InconsistentCandidates { position: 0, .. }
    ));
    assert!(fetcher.completion_order().is_empty());
}
