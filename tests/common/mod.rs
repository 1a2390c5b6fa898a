//! Fake TMDB API server for integration tests.
//!
//! Spins up a minimal `axum` server on a random port bound to 127.0.0.1 that
//! serves `GET /3/search/movie` from a small fixed catalog.
//!
//! Special inputs:
//! - `api_key=bad-key` answers 401 with TMDB's error shape
//! - `query=slow:<rest>` waits before answering for `<rest>`
//! - `query=malformed` answers 200 with an unrecognized object
//! - `query=garbage` answers 200 with a non-JSON body
//! - `query=server-error` answers 500 with a plain-text body
//! - `query=api-error` answers 200 with the error shape

#![allow(dead_code)]

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

pub const VALID_KEY: &str = "test-key";
pub const BAD_KEY: &str = "bad-key";
pub const SLOW_DELAY: Duration = Duration::from_millis(300);

const CATALOG: &[(u64, &str, &str)] = &[
    (603, "The Matrix", "A hacker learns the world is a simulation."),
    (155, "The Dark Knight", "Batman faces the Joker."),
    (238, "The Godfather", "The aging patriarch of a crime dynasty hands over control."),
    (680, "Pulp Fiction", "Intertwining tales of crime in Los Angeles."),
    (550, "Fight Club", "An insomniac office worker forms an underground club."),
    (13, "Forrest Gump", "A slow-witted man witnesses key moments of history."),
];

#[derive(Default)]
struct ApiState {
    /// `query` parameter of every request, in arrival order
    queries: Vec<String>,
}

/// Handle to the running fake TMDB server
pub struct FakeTmdb {
    addr: SocketAddr,
    state: Arc<Mutex<ApiState>>,
}

impl FakeTmdb {
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(ApiState::default()));

        let app = Router::new()
            .route("/3/search/movie", get(search_movie))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Ok(Self { addr, state })
    }

    /// API root to hand to the provider (e.g. `http://127.0.0.1:PORT`)
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn queries(&self) -> Vec<String> {
        self.state.lock().await.queries.clone()
    }

    /// Titles the catalog returns for `query`
    pub fn titles_for(query: &str) -> Vec<&'static str> {
        matching(query).into_iter().map(|(_, title, _)| title).collect()
    }
}

fn matching(query: &str) -> Vec<(u64, &'static str, &'static str)> {
    let needle = query.to_lowercase();
    CATALOG
        .iter()
        .filter(|(_, title, _)| title.to_lowercase().contains(&needle))
        .copied()
        .collect()
}

async fn search_movie(
    State(state): State<Arc<Mutex<ApiState>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let query = params.get("query").cloned().unwrap_or_default();
    state.lock().await.queries.push(query.clone());

    if params.get("api_key").map(String::as_str) != Some(VALID_KEY) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "status_code": 7,
                "status_message": "Invalid API key",
                "success": false
            })),
        )
            .into_response();
    }

    let query = match query.strip_prefix("slow:") {
        Some(rest) => {
            tokio::time::sleep(SLOW_DELAY).await;
            rest.to_string()
        }
        None => query,
    };

    match query.as_str() {
        "malformed" => Json(json!({ "movies": [] })).into_response(),
        "garbage" => (StatusCode::OK, "this is not json").into_response(),
        "server-error" => (StatusCode::INTERNAL_SERVER_ERROR, "oops").into_response(),
        "api-error" => Json(json!({
            "status_code": 34,
            "status_message": "The resource you requested could not be found.",
            "success": false
        }))
        .into_response(),
        _ => {
            let results: Vec<_> = matching(&query)
                .into_iter()
                .map(|(id, title, overview)| {
                    json!({
                        "adult": false,
                        "genre_ids": [18],
                        "id": id,
                        "original_language": "en",
                        "original_title": title,
                        "overview": overview,
                        "popularity": 50.0,
                        "release_date": "1999-03-30",
                        "title": title,
                        "video": false,
                        "vote_average": 8.0,
                        "vote_count": 1000
                    })
                })
                .collect();
            Json(json!({
                "page": 1,
                "total_pages": 1,
                "total_results": results.len(),
                "results": results
            }))
            .into_response()
        }
    }
}
