//! Integration tests for the TMDB provider against a local fake API

mod common;

use common::{FakeTmdb, BAD_KEY, VALID_KEY};
use flick::search::providers::TmdbProvider;
use flick::search::{SearchError, SearchProvider};

fn provider_for(server: &FakeTmdb, key: &str) -> TmdbProvider {
    TmdbProvider::new(key).with_api_base(server.base_url())
}

#[tokio::test]
async fn test_search_returns_first_page() {
    let server = FakeTmdb::start().await.unwrap();
    let provider = provider_for(&server, VALID_KEY);

    let page = provider.search("The").await.unwrap();

    assert_eq!(page.page, 1);
    assert_eq!(page.total_results, 3);
    let titles: Vec<_> = page.results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, FakeTmdb::titles_for("The"));
    assert_eq!(page.results[0].id, 603);
    assert_eq!(page.results[0].release_date.as_deref(), Some("1999-03-30"));
}

#[tokio::test]
async fn test_query_text_is_url_encoded() {
    let server = FakeTmdb::start().await.unwrap();
    let provider = provider_for(&server, VALID_KEY);

    let page = provider.search("Pulp Fiction & more").await.unwrap();

    assert!(page.results.is_empty());
    assert_eq!(server.queries().await, vec!["Pulp Fiction & more"]);
}

#[tokio::test]
async fn test_invalid_key_surfaces_api_message() {
    let server = FakeTmdb::start().await.unwrap();
    let provider = provider_for(&server, BAD_KEY);

    let err = provider.search("The").await.unwrap_err();

    match &err {
        SearchError::Api { status_code, .. } => assert_eq!(*status_code, Some(7)),
        other => panic!("expected api error, got {other:?}"),
    }
    assert_eq!(err.to_string(), "Invalid API key");
}

#[tokio::test]
async fn test_error_shape_with_ok_status_is_api_error() {
    let server = FakeTmdb::start().await.unwrap();
    let provider = provider_for(&server, VALID_KEY);

    let err = provider.search("api-error").await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "The resource you requested could not be found."
    );
}

#[tokio::test]
async fn test_unrecognized_payloads_are_malformed() {
    let server = FakeTmdb::start().await.unwrap();
    let provider = provider_for(&server, VALID_KEY);

    for query in ["malformed", "garbage"] {
        let err = provider.search(query).await.unwrap_err();
        assert!(
            matches!(err, SearchError::Malformed(_)),
            "expected malformed for {query}, got {err:?}"
        );
    }
}

#[tokio::test]
async fn test_plain_text_server_error_uses_status_reason() {
    let server = FakeTmdb::start().await.unwrap();
    let provider = provider_for(&server, VALID_KEY);

    let err = provider.search("server-error").await.unwrap_err();

    assert_eq!(err.to_string(), "Internal Server Error");
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // Bind then drop to get a port nobody listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let provider = TmdbProvider::new(VALID_KEY).with_api_base(format!("http://{addr}"));
    let err = provider.search("The").await.unwrap_err();

    assert!(matches!(err, SearchError::Network(_)), "got {err:?}");
}
