//! Search dispatch: one current request, superseded requests cancelled.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::future::{AbortHandle, Abortable, Aborted};
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::error::SearchError;
use crate::models::SearchEnvelope;

/// A source of title search results.
pub trait TitleSearch: Send + Sync + 'static {
    fn search_titles(
        &self,
        query: &str,
        page: u32,
    ) -> impl Future<Output = Result<SearchEnvelope, SearchError>> + Send;
}

/// Handle for one in-flight request.
#[derive(Debug, Clone)]
pub struct RequestToken {
    id: u64,
    handle: AbortHandle,
}

impl RequestToken {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.handle.is_aborted()
    }
}

/// How a single search attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Results were stored.
    Settled,
    /// The query matched nothing; the empty envelope was stored.
    Empty,
    /// Superseded or cancelled. Nothing was stored.
    Cancelled,
    /// Transport or decode failure, logged and dropped.
    Failed,
}

/// Where the latest search is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    #[default]
    Idle,
    Loading,
    Settled,
    Empty,
    Cancelled,
    Failed,
}

impl From<SearchOutcome> for SearchPhase {
    fn from(outcome: SearchOutcome) -> Self {
        match outcome {
            SearchOutcome::Settled => SearchPhase::Settled,
            SearchOutcome::Empty => SearchPhase::Empty,
            SearchOutcome::Cancelled => SearchPhase::Cancelled,
            SearchOutcome::Failed => SearchPhase::Failed,
        }
    }
}

/// Observable dispatcher state.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    /// Page of the current (or last) request. Never 0.
    pub page: u32,
    pub loading: bool,
    /// `None` until the first request settles with data.
    pub results: Option<SearchEnvelope>,
    pub phase: SearchPhase,
}

impl Default for SearchState {
    fn default() -> Self {
        SearchState {
            page: 1,
            loading: false,
            results: None,
            phase: SearchPhase::Idle,
        }
    }
}

pub struct SearchDispatcher<B> {
    backend: B,
    next_id: AtomicU64,
    in_flight: Mutex<Option<RequestToken>>,
    state: watch::Sender<SearchState>,
}

impl<B: TitleSearch> SearchDispatcher<B> {
    pub fn new(backend: B) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        SearchDispatcher {
            backend,
            next_id: AtomicU64::new(1),
            in_flight: Mutex::new(None),
            state,
        }
    }

    /// Run one search, replacing whatever request is outstanding.
    ///
    /// The previous token is cancelled before the new request is issued.
    /// Errors never escape: they are logged and reported as an outcome.
    pub async fn search(&self, query: &str, page: u32) -> SearchOutcome {
        let page = page.max(1);
        let (handle, registration) = AbortHandle::new_pair();
        let token = RequestToken {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            handle,
        };

        if let Some(previous) = self.in_flight().replace(token.clone()) {
            debug!("Cancelling request #{} in favour of #{}", previous.id, token.id);
            previous.cancel();
        }

        self.state.send_modify(|state| {
            state.loading = true;
            state.page = page;
            state.phase = SearchPhase::Loading;
        });

        info!("Searching '{}' page {} (request #{})", query, page, token.id);
        let result = match Abortable::new(self.backend.search_titles(query, page), registration).await {
            Ok(result) => result,
            Err(Aborted) => Err(SearchError::Cancelled),
        };

        self.settle(&token, query, page, result)
    }

    /// Cancel the outstanding request, if any.
    pub fn cancel(&self) {
        if let Some(token) = self.in_flight().as_ref() {
            debug!("Cancelling request #{}", token.id);
            token.cancel();
        }
    }

    pub fn current_token(&self) -> Option<RequestToken> {
        self.in_flight().clone()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    fn in_flight(&self) -> MutexGuard<'_, Option<RequestToken>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn settle(
        &self,
        token: &RequestToken,
        query: &str,
        page: u32,
        result: Result<SearchEnvelope, SearchError>,
    ) -> SearchOutcome {
        let mut in_flight = self.in_flight();
        let current = in_flight.as_ref().is_some_and(|t| t.id == token.id);

        let (outcome, envelope) = match result {
            Ok(_) if !current => {
                debug!("Dropping stale results for '{}' page {}", query, page);
                (SearchOutcome::Cancelled, None)
            }
            Ok(envelope) if envelope.is_empty() => (SearchOutcome::Empty, Some(envelope)),
            Ok(envelope) => (SearchOutcome::Settled, Some(envelope)),
            Err(e) if e.is_cancelled() => {
                debug!("Search '{}' page {} cancelled", query, page);
                (SearchOutcome::Cancelled, None)
            }
            Err(e) => {
                error!("Search '{}' page {} failed: {}", query, page, e);
                (SearchOutcome::Failed, None)
            }
        };

        // A superseded request leaves the loading flag to its successor.
        if current {
            in_flight.take();
            self.state.send_modify(|state| {
                if let Some(envelope) = envelope {
                    state.results = Some(envelope);
                }
                state.loading = false;
                state.phase = outcome.into();
            });
        }

        outcome
    }
}
