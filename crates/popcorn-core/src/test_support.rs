use async_trait::async_trait;
use popcorn_models::{parse_imdb_rating, parse_runtime_minutes, MovieDetail, MovieSummary};
use popcorn_sources::{LookupError, MovieLookup};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

enum Script<T> {
    Ready(Result<T, LookupError>),
    /// Resolves when the test sends, ignoring cancellation like a slow network
    Gated(oneshot::Receiver<Result<T, LookupError>>),
    UntilCancelled,
}

/// Lookup double answering from per-query scripts
#[derive(Default)]
pub(crate) struct ScriptedLookup {
    searches: Mutex<HashMap<String, Script<Vec<MovieSummary>>>>,
    details: Mutex<HashMap<String, Script<MovieDetail>>>,
    search_calls: Mutex<Vec<String>>,
    detail_calls: Mutex<Vec<String>>,
    tokens: Mutex<Vec<CancellationToken>>,
}

impl ScriptedLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply_search(&self, query: &str, result: Result<Vec<MovieSummary>, LookupError>) {
        self.searches.lock().unwrap().insert(query.to_string(), Script::Ready(result));
    }

    pub fn gate_search(&self, query: &str) -> oneshot::Sender<Result<Vec<MovieSummary>, LookupError>> {
        let (tx, rx) = oneshot::channel();
        self.searches.lock().unwrap().insert(query.to_string(), Script::Gated(rx));
        tx
    }

    pub fn hang_search(&self, query: &str) {
        self.searches.lock().unwrap().insert(query.to_string(), Script::UntilCancelled);
    }

    pub fn reply_detail(&self, id: &str, result: Result<MovieDetail, LookupError>) {
        self.details.lock().unwrap().insert(id.to_string(), Script::Ready(result));
    }

    pub fn gate_detail(&self, id: &str) -> oneshot::Sender<Result<MovieDetail, LookupError>> {
        let (tx, rx) = oneshot::channel();
        self.details.lock().unwrap().insert(id.to_string(), Script::Gated(rx));
        tx
    }

    pub fn hang_detail(&self, id: &str) {
        self.details.lock().unwrap().insert(id.to_string(), Script::UntilCancelled);
    }

    pub fn search_calls(&self) -> Vec<String> {
        self.search_calls.lock().unwrap().clone()
    }

    pub fn detail_calls(&self) -> Vec<String> {
        self.detail_calls.lock().unwrap().clone()
    }

    pub fn tokens(&self) -> Vec<CancellationToken> {
        self.tokens.lock().unwrap().clone()
    }

    async fn play<T>(script: Option<Script<T>>, missing: LookupError, cancel: &CancellationToken) -> Result<T, LookupError> {
        match script {
            None => Err(missing),
            Some(Script::Ready(result)) => result,
            Some(Script::Gated(rx)) => rx.await.unwrap_or(Err(LookupError::Status { status: 599 })),
            Some(Script::UntilCancelled) => {
                cancel.cancelled().await;
                Err(LookupError::Cancelled)
            }
        }
    }
}

#[async_trait]
impl MovieLookup for ScriptedLookup {
    fn source_name(&self) -> &str {
        "scripted"
    }

    async fn search_by_title(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<MovieSummary>, LookupError> {
        self.search_calls.lock().unwrap().push(query.to_string());
        self.tokens.lock().unwrap().push(cancel.clone());
        let script = self.searches.lock().unwrap().remove(query);
        let missing = LookupError::EmptyResult { query: query.to_string() };
        Self::play(script, missing, cancel).await
    }

    async fn fetch_by_id(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<MovieDetail, LookupError> {
        self.detail_calls.lock().unwrap().push(id.to_string());
        self.tokens.lock().unwrap().push(cancel.clone());
        let script = self.details.lock().unwrap().remove(id);
        let missing = LookupError::NotFound {
            id: id.to_string(),
            message: "Incorrect IMDb ID.".to_string(),
        };
        Self::play(script, missing, cancel).await
    }
}

pub(crate) fn movie(id: &str, title: &str, year: &str) -> MovieSummary {
    MovieSummary {
        id: id.to_string(),
        title: title.to_string(),
        year: year.to_string(),
        poster_url: "url".to_string(),
    }
}

pub(crate) fn detail(id: &str, title: &str, runtime: &str, imdb_rating: &str) -> MovieDetail {
    MovieDetail {
        id: id.to_string(),
        title: title.to_string(),
        year: "1989".to_string(),
        poster_url: "url".to_string(),
        runtime: runtime.to_string(),
        runtime_minutes: parse_runtime_minutes(runtime),
        imdb_rating: parse_imdb_rating(imdb_rating),
        plot: "The Dark Knight of Gotham City begins his war on crime.".to_string(),
        release_date: "23 Jun 1989".to_string(),
        actors: "Michael Keaton, Jack Nicholson".to_string(),
        director: "Tim Burton".to_string(),
        genre: "Action, Adventure".to_string(),
    }
}

/// Let every spawned request task run until it blocks again
///
/// Tests run on the current-thread runtime, so yielding hands the thread to
/// each ready task in turn without depending on wall-clock time.
pub(crate) async fn let_tasks_run() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}
