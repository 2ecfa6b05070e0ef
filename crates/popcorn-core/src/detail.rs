use popcorn_models::MovieDetail;
use popcorn_sources::{LookupError, MovieLookup};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::request::FetchCell;

/// What the detail pane renders for the selected title
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailState {
    pub movie_id: Option<String>,
    pub movie: Option<MovieDetail>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Fetch-by-id for the currently selected title
///
/// Selecting another title cancels the outstanding fetch, so a slow response
/// for an earlier selection never replaces the newer one.
pub struct DetailLifecycle {
    lookup: Arc<dyn MovieLookup>,
    cell: Arc<FetchCell<DetailState>>,
}

impl DetailLifecycle {
    pub fn new(lookup: Arc<dyn MovieLookup>) -> Self {
        Self {
            lookup,
            cell: Arc::new(FetchCell::new(DetailState::default())),
        }
    }

    pub fn state(&self) -> DetailState {
        self.cell.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.cell.subscribe()
    }

    /// Start loading `id`; always refetches, even for the same id
    pub fn select(&self, id: &str) {
        let ticket = self.cell.begin(|state| {
            *state = DetailState {
                movie_id: Some(id.to_string()),
                movie: None,
                is_loading: true,
                error: None,
            };
        });
        debug!(id, generation = ticket.generation, "Detail fetch started");

        let lookup = Arc::clone(&self.lookup);
        let cell = Arc::clone(&self.cell);
        let id = id.to_string();
        tokio::spawn(async move {
            let result = lookup.fetch_by_id(&id, &ticket.cancel).await;
            apply_result(&cell, ticket.generation, &id, result);
        });
    }

    /// Drop the selection and abandon its fetch
    pub fn close(&self) {
        self.cell.reset(|state| *state = DetailState::default());
    }

    pub async fn settled(&self) -> DetailState {
        let mut rx = self.subscribe();
        let settled = rx
            .wait_for(|state| !state.is_loading)
            .await
            .map(|state| state.clone());
        settled.unwrap_or_else(|_| self.state())
    }
}

impl Drop for DetailLifecycle {
    fn drop(&mut self) {
        self.cell.cancel();
    }
}

fn apply_result(
    cell: &FetchCell<DetailState>,
    generation: u64,
    id: &str,
    result: Result<MovieDetail, LookupError>,
) {
    if result.as_ref().is_err_and(LookupError::is_cancelled) {
        debug!(id, generation, "Detail fetch cancelled");
        return;
    }

    let applied = cell.complete(generation, |state| {
        state.is_loading = false;
        match result {
            Ok(movie) => {
                state.movie = Some(movie);
                state.error = None;
            }
            Err(e) => {
                warn!(id, error = %e, "Detail fetch failed");
                state.movie = None;
                state.error = Some(e.user_message().to_string());
            }
        }
    });

    if !applied {
        debug!(id, generation, "Discarding detail for superseded selection");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{detail, let_tasks_run, ScriptedLookup};

    fn lifecycle() -> (Arc<ScriptedLookup>, DetailLifecycle) {
        let lookup = Arc::new(ScriptedLookup::new());
        let details = DetailLifecycle::new(lookup.clone());
        (lookup, details)
    }

    #[tokio::test]
    async fn test_select_loads_detail() {
        let (lookup, details) = lifecycle();
        lookup.reply_detail("tt1", Ok(detail("tt1", "Batman", "126 min", "7.5")));

        details.select("tt1");
        assert!(details.state().is_loading);

        let state = details.settled().await;
        assert_eq!(state.movie_id.as_deref(), Some("tt1"));
        let movie = state.movie.unwrap();
        assert_eq!(movie.title, "Batman");
        assert_eq!(movie.runtime_minutes, Some(126));
        assert_eq!(movie.imdb_rating, Some(7.5));
    }

    #[tokio::test]
    async fn test_reselection_cancels_earlier_fetch() {
        let (lookup, details) = lifecycle();
        let slow = lookup.gate_detail("tt1");
        lookup.reply_detail("tt2", Ok(detail("tt2", "Batman Returns", "126 min", "7.1")));

        details.select("tt1");
        details.select("tt2");
        let state = details.settled().await;
        assert_eq!(state.movie.as_ref().map(|m| m.id.as_str()), Some("tt2"));

        assert!(lookup.tokens()[0].is_cancelled());

        // A response for the earlier selection arriving late is discarded
        slow.send(Ok(detail("tt1", "Batman", "126 min", "7.5"))).unwrap();
        let_tasks_run().await;

        let state = details.state();
        assert_eq!(state.movie_id.as_deref(), Some("tt2"));
        assert_eq!(state.movie.map(|m| m.title), Some("Batman Returns".to_string()));
    }

    #[tokio::test]
    async fn test_not_found_sets_error() {
        let (lookup, details) = lifecycle();
        lookup.reply_detail(
            "tt0",
            Err(LookupError::NotFound {
                id: "tt0".to_string(),
                message: "Incorrect IMDb ID.".to_string(),
            }),
        );

        details.select("tt0");
        let state = details.settled().await;
        assert!(state.movie.is_none());
        assert_eq!(state.error.as_deref(), Some(popcorn_sources::error::NO_DATA_MESSAGE));
    }

    #[tokio::test]
    async fn test_close_cancels_without_error() {
        let (lookup, details) = lifecycle();
        lookup.hang_detail("tt1");

        details.select("tt1");
        details.close();
        let_tasks_run().await;

        assert!(lookup.tokens()[0].is_cancelled());
        assert_eq!(details.state(), DetailState::default());
    }

    #[tokio::test]
    async fn test_reopening_refetches() {
        let (lookup, details) = lifecycle();
        lookup.reply_detail("tt1", Ok(detail("tt1", "Batman", "126 min", "7.5")));
        details.select("tt1");
        details.settled().await;

        lookup.reply_detail("tt1", Ok(detail("tt1", "Batman", "126 min", "7.5")));
        details.select("tt1");
        details.settled().await;

        assert_eq!(lookup.detail_calls(), vec!["tt1".to_string(), "tt1".to_string()]);
    }
}
