//! End-to-end search flow: controller + TMDB provider + fake API

mod common;

use common::{FakeTmdb, BAD_KEY, SLOW_DELAY, VALID_KEY};
use flick::controller::{ControllerOptions, Notification, SearchController, SEARCH_FAILED_TITLE};
use flick::search::providers::TmdbProvider;
use flick::search::{SearchError, SearchPage, SearchProvider};
use std::sync::Arc;
use std::time::Duration;

fn controller_for(server: &FakeTmdb, key: &str) -> SearchController {
    let provider = TmdbProvider::new(key).with_api_base(server.base_url());
    SearchController::new(Arc::new(provider), ControllerOptions::default())
}

fn titles(controller: &SearchController) -> Vec<String> {
    controller
        .state()
        .results
        .iter()
        .map(|r| r.title().to_string())
        .collect()
}

#[tokio::test]
async fn test_startup_populates_results_with_default_term() {
    let server = FakeTmdb::start().await.unwrap();
    let mut controller = controller_for(&server, VALID_KEY);

    assert!(controller.state().is_loading);
    controller.start();
    controller.settle().await;

    assert_eq!(server.queries().await, vec!["The"]);
    assert!(!controller.state().is_loading);
    assert!(!controller.state().results.is_empty());
    assert_eq!(titles(&controller), FakeTmdb::titles_for("The"));
}

#[tokio::test]
async fn test_result_urls_point_at_movie_pages() {
    let server = FakeTmdb::start().await.unwrap();
    let mut controller = controller_for(&server, VALID_KEY);

    controller.search("Fight");
    controller.settle().await;

    let results = &controller.state().results;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url(), "https://www.themoviedb.org/movie/550");
    assert_eq!(
        results[0].overview(),
        "An insomniac office worker forms an underground club."
    );
}

#[tokio::test]
async fn test_slow_stale_request_never_wins() {
    let server = FakeTmdb::start().await.unwrap();
    let mut controller = controller_for(&server, VALID_KEY);

    controller.search("slow:Godfather");
    // Let the first request reach the server before superseding it
    tokio::time::sleep(Duration::from_millis(50)).await;
    controller.search("Pulp");
    controller.settle().await;
    assert_eq!(titles(&controller), vec!["Pulp Fiction"]);

    // Past the point where the slow answer would have arrived
    tokio::time::sleep(SLOW_DELAY + Duration::from_millis(100)).await;
    assert!(!controller.poll().changed());
    assert_eq!(titles(&controller), vec!["Pulp Fiction"]);
    assert!(controller.take_notifications().is_empty());
}

#[tokio::test]
async fn test_failure_keeps_results_and_notifies_once() {
    let server = FakeTmdb::start().await.unwrap();
    let mut controller = controller_for(&server, VALID_KEY);
    controller.start();
    controller.settle().await;
    let before = controller.state().results.clone();

    controller.search("server-error");
    controller.settle().await;

    assert!(!controller.state().is_loading);
    assert_eq!(controller.state().results, before);
    assert_eq!(
        controller.take_notifications(),
        vec![Notification::failure(SEARCH_FAILED_TITLE, "Internal Server Error")]
    );
}

#[tokio::test]
async fn test_invalid_key_notification_carries_api_message() {
    let server = FakeTmdb::start().await.unwrap();
    let mut controller = controller_for(&server, BAD_KEY);

    controller.start();
    controller.settle().await;

    let notifications = controller.take_notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].title, "Could not perform search");
    assert_eq!(notifications[0].message, "Invalid API key");
    assert!(controller.state().results.is_empty());
    assert!(!controller.state().is_loading);
}

#[tokio::test]
async fn test_shutdown_abandons_request_silently() {
    let server = FakeTmdb::start().await.unwrap();
    let mut controller = controller_for(&server, VALID_KEY);
    controller.start();
    controller.settle().await;
    let before = controller.state().clone();

    controller.search("slow:server-error");
    controller.shutdown();
    tokio::time::sleep(SLOW_DELAY + Duration::from_millis(100)).await;
    controller.poll();

    assert_eq!(controller.state().results, before.results);
    assert!(controller.take_notifications().is_empty());
    assert!(!controller.has_pending_request());
}

/// Serves the default term from the fake API and everything else from a dead port
struct DeadAfterStartup {
    live: TmdbProvider,
    dead: TmdbProvider,
}

#[async_trait::async_trait]
impl SearchProvider for DeadAfterStartup {
    async fn search(&self, query: &str) -> Result<SearchPage, SearchError> {
        if query == "The" {
            self.live.search(query).await
        } else {
            self.dead.search(query).await
        }
    }
}

#[tokio::test]
async fn test_transport_failure_keeps_results_and_hides_key() {
    let server = FakeTmdb::start().await.unwrap();

    // Bind then drop to get a port nobody listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dead_addr = listener.local_addr().unwrap();
    drop(listener);

    let provider = DeadAfterStartup {
        live: TmdbProvider::new(VALID_KEY).with_api_base(server.base_url()),
        dead: TmdbProvider::new(VALID_KEY).with_api_base(format!("http://{dead_addr}")),
    };
    let mut controller = SearchController::new(Arc::new(provider), ControllerOptions::default());
    controller.start();
    controller.settle().await;
    let before = controller.state().results.clone();
    assert!(!before.is_empty());

    controller.search("dead");
    controller.settle().await;

    assert!(!controller.state().is_loading);
    assert_eq!(controller.state().results, before);

    let notifications = controller.take_notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].title, SEARCH_FAILED_TITLE);
    assert!(
        notifications[0].message.starts_with("Network error:"),
        "unexpected message: {}",
        notifications[0].message
    );
    assert!(!notifications[0].message.contains(VALID_KEY));
}
