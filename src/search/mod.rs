pub mod providers;

use serde::Deserialize;

/// Term sent in place of an empty query so the initial list is never blank.
pub const DEFAULT_QUERY: &str = "The";

/// Search provider abstraction - the controller only talks to this trait
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Fetch the first page of movies matching `query`
    async fn search(&self, query: &str) -> Result<SearchPage, SearchError>;
}

/// First page of a movie search response
#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub page: u32,
    pub results: Vec<MovieRecord>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u64,
}

/// Raw movie record as returned by the API.
///
/// Only `id`, `title` and `overview` feed the result list; the rest is kept
/// so a front end can show it without another request.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieRecord {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<u64>,
    #[serde(default)]
    pub adult: bool,
}

/// Search-related errors
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The request was superseded by a newer one. Never shown to the user.
    #[error("search cancelled")]
    Cancelled,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Well-formed response carrying an application error instead of data
    #[error("{message}")]
    Api {
        status_code: Option<u64>,
        message: String,
    },

    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The request task died before producing an answer
    #[error("Search task failed: {0}")]
    TaskFailed(String),

    #[error("TMDB API key is not configured")]
    MissingApiKey,
}

impl SearchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SearchError::Cancelled)
    }
}

/// Replace an empty query with `default`; anything else is sent as typed.
pub fn normalize_query<'a>(text: &'a str, default: &'a str) -> &'a str {
    if text.is_empty() {
        default
    } else {
        text
    }
}
