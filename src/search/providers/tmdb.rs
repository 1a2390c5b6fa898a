use crate::config::Config;
use crate::search::{SearchError, SearchPage, SearchProvider};
use reqwest::StatusCode;

pub const DEFAULT_API_BASE: &str = "https://api.themoviedb.org";

/// The Movie Database (TMDB) search provider
///
/// Uses the v3 `search/movie` endpoint with an `api_key` query parameter.
/// Documentation: https://developer.themoviedb.org/reference/search-movie
#[derive(Clone)]
pub struct TmdbProvider {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl TmdbProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Point the provider at a different API root (mirrors, test servers)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn from_config(config: &Config) -> Self {
        let provider = Self::new(config.api_key.trim());
        match config.api_base.as_deref() {
            Some(base) if !base.trim().is_empty() => provider.with_api_base(base.trim()),
            _ => provider,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/3/search/movie", self.api_base.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl SearchProvider for TmdbProvider {
    async fn search(&self, query: &str) -> Result<SearchPage, SearchError> {
        if self.api_key.is_empty() {
            return Err(SearchError::MissingApiKey);
        }

        tracing::debug!(query = %query, endpoint = %self.endpoint(), "performing tmdb search");

        let response = self
            .client
            .get(self.endpoint())
            .query(&[("api_key", self.api_key.as_str()), ("query", query)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let page = parse_response(status, &body)?;

        tracing::debug!(
            query = %query,
            result_count = page.results.len(),
            total_results = page.total_results,
            "tmdb search completed"
        );

        Ok(page)
    }
}

/// Classify a response body as a result page or one of the error shapes.
///
/// An object carrying `status_message` is an API error no matter what the
/// HTTP status says. A non-2xx status without one falls back to the
/// status reason.
pub fn parse_response(status: StatusCode, body: &str) -> Result<SearchPage, SearchError> {
    let json: serde_json::Value = match serde_json::from_str(body) {
        Ok(json) => json,
        Err(_) if !status.is_success() => return Err(status_error(status)),
        Err(e) => return Err(SearchError::Malformed(e.to_string())),
    };

    if let Some(message) = json.get("status_message").and_then(|v| v.as_str()) {
        tracing::warn!(
            status = %status,
            status_code = ?json.get("status_code"),
            message = %message,
            "tmdb api error"
        );
        return Err(SearchError::Api {
            status_code: json.get("status_code").and_then(|v| v.as_u64()),
            message: message.to_string(),
        });
    }

    if !status.is_success() {
        return Err(status_error(status));
    }

    serde_json::from_value(json).map_err(|e| SearchError::Malformed(e.to_string()))
}

fn status_error(status: StatusCode) -> SearchError {
    SearchError::Api {
        status_code: None,
        message: status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
    }
}
