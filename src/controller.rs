use crate::config::Config;
use crate::logging::redact_secrets;
use crate::search::{normalize_query, MovieRecord, SearchError, SearchProvider, DEFAULT_QUERY};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_SITE_BASE: &str = "https://www.themoviedb.org";

/// Title of the notification raised for a failed search
pub const SEARCH_FAILED_TITLE: &str = "Could not perform search";

/// A movie as shown in the result list. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResultItem {
    title: String,
    overview: String,
    url: String,
}

impl SearchResultItem {
    pub fn new(
        title: impl Into<String>,
        overview: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            overview: overview.into(),
            url: url.into(),
        }
    }

    /// Build the list view of a raw record, linking to `<site_base>/movie/<id>`
    pub fn from_record(record: &MovieRecord, site_base: &str) -> Self {
        Self::new(
            record.title.clone(),
            record.overview.clone(),
            format!("{}/movie/{}", site_base.trim_end_matches('/'), record.id),
        )
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn overview(&self) -> &str {
        &self.overview
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// What the front end renders: the last good results and whether a request is out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    pub results: Vec<SearchResultItem>,
    pub is_loading: bool,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            is_loading: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationStyle {
    Failure,
}

/// A non-blocking message for the user (rendered as a toast)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub style: NotificationStyle,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn failure(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            style: NotificationStyle::Failure,
            title: title.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Sent instead of an empty query
    pub default_query: String,
    /// Root for result links
    pub site_base: String,
    /// Wait inside the request task before hitting the network
    pub throttle: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            default_query: DEFAULT_QUERY.to_string(),
            site_base: DEFAULT_SITE_BASE.to_string(),
            throttle: Duration::ZERO,
        }
    }
}

impl ControllerOptions {
    pub fn from_config(config: &Config) -> Self {
        let defaults = Self::default();
        Self {
            default_query: config
                .default_query
                .clone()
                .filter(|q| !q.is_empty())
                .unwrap_or(defaults.default_query),
            site_base: config
                .site_base
                .clone()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.site_base),
            throttle: config
                .throttle_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.throttle),
        }
    }
}

/// What a `poll` applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// A response replaced the result list
    pub results_replaced: bool,
    /// A request failed; results were kept and a notification raised
    pub failed: bool,
}

impl PollSummary {
    pub fn changed(&self) -> bool {
        self.results_replaced || self.failed
    }
}

/// One dispatched search and the token that abandons it
struct RequestHandle {
    seq: u64,
    query: String,
    token: CancellationToken,
}

impl RequestHandle {
    fn cancel(&self) {
        self.token.cancel();
    }
}

/// Result of a request task, tagged with the sequence number it was issued under
struct Completion {
    seq: u64,
    outcome: Result<Vec<SearchResultItem>, SearchError>,
}

/// Owns the search lifecycle: superseding requests and folding results into state.
///
/// Every `search` cancels the request before it and bumps a sequence number.
/// Request tasks race the provider against their token and report back over a
/// channel; only the completion matching the current sequence number is ever
/// applied, so a late answer to an old query can't overwrite a newer one.
///
/// State is only touched by the owner (`poll` / `settle`), never by the tasks.
pub struct SearchController {
    provider: Arc<dyn SearchProvider>,
    options: ControllerOptions,
    state: SearchState,
    active: Option<RequestHandle>,
    next_seq: u64,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    notifications: Vec<Notification>,
}

impl SearchController {
    pub fn new(provider: Arc<dyn SearchProvider>, options: ControllerOptions) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        Self {
            provider,
            options,
            state: SearchState::default(),
            active: None,
            next_seq: 0,
            completion_tx,
            completion_rx,
            notifications: Vec::new(),
        }
    }

    /// Issue the initial empty-text search so the list is populated before any input
    pub fn start(&mut self) {
        self.search("");
    }

    /// Search for `text`, abandoning whatever request is in flight.
    ///
    /// Must be called from within a tokio runtime.
    pub fn search(&mut self, text: &str) {
        if let Some(previous) = self.active.take() {
            previous.cancel();
            tracing::debug!(seq = previous.seq, query = %previous.query, "superseded search cancelled");
        }

        self.next_seq += 1;
        let seq = self.next_seq;
        let query = normalize_query(text, &self.options.default_query).to_string();
        let token = CancellationToken::new();

        // Keep the old results on screen until the new ones land
        self.state.is_loading = true;

        tracing::debug!(seq, query = %query, "dispatching search");

        let provider = self.provider.clone();
        let completion_tx = self.completion_tx.clone();
        let task_token = token.clone();
        let task_query = query.clone();
        let site_base = self.options.site_base.clone();
        let throttle = self.options.throttle;

        let request = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = task_token.cancelled() => Err(SearchError::Cancelled),
                outcome = perform_search(provider.as_ref(), &task_query, &site_base, throttle) => outcome,
            }
        });

        // A panicking provider still has to report back, or the request never settles
        tokio::spawn(async move {
            let outcome = match request.await {
                Ok(outcome) => outcome,
                Err(e) if e.is_cancelled() => Err(SearchError::Cancelled),
                Err(e) => Err(SearchError::TaskFailed(e.to_string())),
            };
            // Receiver is gone once the controller is dropped
            let _ = completion_tx.send(Completion { seq, outcome });
        });

        self.active = Some(RequestHandle { seq, query, token });
    }

    /// Apply every completion that has already arrived
    pub fn poll(&mut self) -> PollSummary {
        let mut summary = PollSummary::default();
        while let Ok(completion) = self.completion_rx.try_recv() {
            let applied = self.apply(completion);
            summary.results_replaced |= applied.results_replaced;
            summary.failed |= applied.failed;
        }
        summary
    }

    /// Wait until the current request (if any) has completed and been applied
    pub async fn settle(&mut self) {
        while self.active.is_some() {
            match self.completion_rx.recv().await {
                Some(completion) => {
                    self.apply(completion);
                }
                None => break,
            }
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Whether a request is still waiting for its response
    pub fn has_pending_request(&self) -> bool {
        self.active.is_some()
    }

    /// Hand over notifications raised since the last call
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Cancel the in-flight request, if any. Its result will never be applied.
    pub fn shutdown(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel();
            tracing::debug!(seq = active.seq, "search cancelled on shutdown");
        }
    }

    fn apply(&mut self, completion: Completion) -> PollSummary {
        let Completion { seq, outcome } = completion;

        let is_current = self.active.as_ref().is_some_and(|active| active.seq == seq);
        if !is_current {
            tracing::trace!(seq, "discarding result of superseded search");
            return PollSummary::default();
        }

        match outcome {
            Err(err) if err.is_cancelled() => {
                // Only reachable if the token fired without a replacement; nothing to do
                PollSummary::default()
            }
            Ok(results) => {
                tracing::debug!(seq, result_count = results.len(), "search results applied");
                self.active = None;
                self.state = SearchState {
                    results,
                    is_loading: false,
                };
                PollSummary {
                    results_replaced: true,
                    failed: false,
                }
            }
            Err(err) => {
                let query = self.active.take().map(|a| a.query).unwrap_or_default();
                tracing::error!(seq, query = %query, error = %redact_secrets(&err.to_string()), "search error");

                self.state.is_loading = false;
                self.notifications.push(Notification::failure(
                    SEARCH_FAILED_TITLE,
                    redact_secrets(&err.to_string()),
                ));
                PollSummary {
                    results_replaced: false,
                    failed: true,
                }
            }
        }
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn perform_search(
    provider: &dyn SearchProvider,
    query: &str,
    site_base: &str,
    throttle: Duration,
) -> Result<Vec<SearchResultItem>, SearchError> {
    if !throttle.is_zero() {
        tokio::time::sleep(throttle).await;
    }

    let page = provider.search(query).await?;

    Ok(page
        .results
        .iter()
        .map(|record| SearchResultItem::from_record(record, site_base))
        .collect())
}
