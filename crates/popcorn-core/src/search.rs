//! Search-as-you-type lifecycle.
//!
//! Every query change supersedes the request issued for the previous one.
//! Queries shorter than the minimum length never reach the lookup client and
//! force an empty, error-free result.

use popcorn_models::MovieSummary;
use popcorn_sources::{LookupError, MovieLookup};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::request::FetchCell;

pub const DEFAULT_MIN_QUERY_LENGTH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// What the result pane renders for the current query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub movies: Vec<MovieSummary>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl SearchState {
    pub fn status(&self) -> SearchStatus {
        if self.is_loading {
            SearchStatus::Loading
        } else if self.error.is_some() {
            SearchStatus::Error
        } else if !self.movies.is_empty() {
            SearchStatus::Success
        } else {
            SearchStatus::Idle
        }
    }
}

pub struct SearchLifecycle {
    lookup: Arc<dyn MovieLookup>,
    cell: Arc<FetchCell<SearchState>>,
    min_query_length: usize,
}

impl SearchLifecycle {
    pub fn new(lookup: Arc<dyn MovieLookup>) -> Self {
        Self::with_min_query_length(lookup, DEFAULT_MIN_QUERY_LENGTH)
    }

    pub fn with_min_query_length(lookup: Arc<dyn MovieLookup>, min_query_length: usize) -> Self {
        Self {
            lookup,
            cell: Arc::new(FetchCell::new(SearchState::default())),
            min_query_length: min_query_length.max(1),
        }
    }

    pub fn state(&self) -> SearchState {
        self.cell.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.cell.subscribe()
    }

    /// Feed the latest input value
    ///
    /// Must be called from within a Tokio runtime: a qualifying query spawns
    /// its request as a task.
    pub fn set_query(&self, query: &str) {
        if self.cell.snapshot().query == query {
            return;
        }

        if query.chars().count() < self.min_query_length {
            debug!(query, "Query below minimum length, clearing results");
            self.cell.reset(|state| {
                *state = SearchState {
                    query: query.to_string(),
                    ..SearchState::default()
                };
            });
            return;
        }

        let ticket = self.cell.begin(|state| {
            state.query = query.to_string();
            state.is_loading = true;
            state.error = None;
        });
        debug!(query, generation = ticket.generation, "Search started");

        let lookup = Arc::clone(&self.lookup);
        let cell = Arc::clone(&self.cell);
        let query = query.to_string();
        tokio::spawn(async move {
            let result = lookup.search_by_title(&query, &ticket.cancel).await;
            apply_result(&cell, ticket.generation, &query, result);
        });
    }

    /// Resolve once the current request (if any) has settled
    pub async fn settled(&self) -> SearchState {
        let mut rx = self.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let settled = rx
            .wait_for(|state| !state.is_loading)
            .await
            .map(|state| state.clone());
        settled.unwrap_or_else(|_| self.state())
    }

    /// Abandon any outstanding request and settle the published state
    ///
    /// Results stay visible; the query is forgotten so entering it again
    /// issues a fresh request.
    pub fn shutdown(&self) {
        self.cell.reset(|state| {
            state.is_loading = false;
            state.query.clear();
        });
    }
}

impl Drop for SearchLifecycle {
    fn drop(&mut self) {
        self.cell.cancel();
    }
}

fn apply_result(
    cell: &FetchCell<SearchState>,
    generation: u64,
    query: &str,
    result: Result<Vec<MovieSummary>, LookupError>,
) {
    // A cancelled request belongs to a superseded query: never a state change
    if result.as_ref().is_err_and(LookupError::is_cancelled) {
        debug!(query, generation, "Search cancelled");
        return;
    }

    let applied = cell.complete(generation, |state| match result {
        Ok(movies) => {
            state.movies = movies;
            state.is_loading = false;
            state.error = None;
        }
        Err(e) => {
            warn!(query, error = %e, "Search failed");
            state.movies.clear();
            state.is_loading = false;
            state.error = Some(e.user_message().to_string());
        }
    });

    if !applied {
        debug!(query, generation, "Discarding result of superseded search");
    }
}
