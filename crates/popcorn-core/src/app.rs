//! One user's session: search, the open detail view, rating and the
//! watched list, wired together the way the screen uses them.

use chrono::Utc;
use popcorn_config::SearchConfig;
use popcorn_models::{EntryError, WatchedEntry, WatchedSummary};
use popcorn_sources::MovieLookup;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::detail::{DetailLifecycle, DetailState};
use crate::rating::{RatingChange, RatingError, StarRating, DEFAULT_STARS};
use crate::search::{SearchLifecycle, SearchState, DEFAULT_MIN_QUERY_LENGTH};
use crate::shortcuts::{Key, ShortcutAction, ShortcutGuard, ShortcutRegistry};
use crate::title::{TitleGuard, WindowTitle};
use crate::watched::WatchedStore;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("no movie is open")]
    NoMovieOpen,
    #[error("movie details have not loaded yet")]
    DetailNotLoaded,
    #[error("rate the movie before adding it to the list")]
    NotRated,
    #[error(transparent)]
    Rating(#[from] RatingError),
    #[error("cannot add movie: {0}")]
    Validation(#[from] EntryError),
}

/// Side effects the front end should perform in response to a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    FocusSearchInput,
    DetailClosed,
}

#[derive(Debug, Clone, Copy)]
pub struct AppOptions {
    pub min_query_length: usize,
    pub stars: u8,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            min_query_length: DEFAULT_MIN_QUERY_LENGTH,
            stars: DEFAULT_STARS,
        }
    }
}

impl From<&SearchConfig> for AppOptions {
    fn from(config: &SearchConfig) -> Self {
        Self {
            min_query_length: config.min_query_length,
            stars: config.stars,
        }
    }
}

pub struct PopcornApp {
    search: SearchLifecycle,
    detail: DetailLifecycle,
    watched: WatchedStore,
    rating: StarRating,
    shortcuts: ShortcutRegistry,
    _search_shortcut: ShortcutGuard,
    detail_shortcut: Option<ShortcutGuard>,
    title: WindowTitle,
    title_guard: Option<TitleGuard>,
}

impl PopcornApp {
    pub fn new(lookup: Arc<dyn MovieLookup>, watched: WatchedStore, options: AppOptions) -> Self {
        let shortcuts = ShortcutRegistry::new();
        let search_shortcut = shortcuts.register(Key::Enter, ShortcutAction::FocusSearch);

        Self {
            search: SearchLifecycle::with_min_query_length(Arc::clone(&lookup), options.min_query_length),
            detail: DetailLifecycle::new(lookup),
            watched,
            rating: StarRating::new(options.stars),
            shortcuts,
            _search_shortcut: search_shortcut,
            detail_shortcut: None,
            title: WindowTitle::new(),
            title_guard: None,
        }
    }

    pub fn set_query(&self, query: &str) {
        self.search.set_query(query);
    }

    pub fn search(&self) -> &SearchLifecycle {
        &self.search
    }

    pub fn search_state(&self) -> SearchState {
        self.search.state()
    }

    pub fn detail(&self) -> &DetailLifecycle {
        &self.detail
    }

    pub fn detail_state(&self) -> DetailState {
        self.detail.state()
    }

    pub fn open_movie_id(&self) -> Option<String> {
        self.detail.state().movie_id
    }

    /// Open `id`, or close the detail view if `id` is already open
    ///
    /// Returns whether a movie is open afterwards.
    pub fn select_movie(&mut self, id: &str) -> bool {
        if self.open_movie_id().as_deref() == Some(id) {
            self.close_movie();
            return false;
        }

        debug!(id, "Opening movie");
        self.release_title();
        self.rating.reset();
        self.detail.select(id);
        if self.detail_shortcut.is_none() {
            self.detail_shortcut = Some(self.shortcuts.register(Key::Escape, ShortcutAction::CloseDetail));
        }
        true
    }

    pub fn close_movie(&mut self) {
        self.detail.close();
        self.detail_shortcut = None;
        self.release_title();
        self.rating.reset();
    }

    pub fn rating(&self) -> &StarRating {
        &self.rating
    }

    pub fn hover_star(&mut self, star: u8) {
        self.rating.hover(star);
    }

    pub fn clear_hover(&mut self) {
        self.rating.clear_hover();
    }

    pub fn rate(&mut self, star: u8) -> Result<RatingChange, AppError> {
        if self.open_movie_id().is_none() {
            return Err(AppError::NoMovieOpen);
        }
        Ok(self.rating.select(star)?)
    }

    /// Confirm "add to list" for the open, rated movie and close it
    pub fn add_to_watched(&mut self) -> Result<WatchedEntry, AppError> {
        let state = self.detail.state();
        if state.movie_id.is_none() {
            return Err(AppError::NoMovieOpen);
        }
        let detail = state.movie.ok_or(AppError::DetailNotLoaded)?;
        if self.rating.rating() == 0 {
            return Err(AppError::NotRated);
        }

        let entry = WatchedEntry::from_detail(
            &detail,
            self.rating.rating(),
            self.rating.interaction_count(),
            Utc::now(),
        )?;
        self.watched.append(entry.clone());
        info!(id = %entry.id, count = self.watched.len(), "Movie added to watched list");

        self.close_movie();
        Ok(entry)
    }

    pub fn watched(&self) -> &[WatchedEntry] {
        self.watched.entries()
    }

    pub fn summary(&self) -> WatchedSummary {
        self.watched.summary()
    }

    /// React to a key press with whatever bindings are currently held
    pub fn handle_key(&mut self, key: Key, search_focused: bool) -> Vec<UiCommand> {
        let mut commands = Vec::new();
        for action in self.shortcuts.dispatch(key) {
            match action {
                ShortcutAction::FocusSearch => {
                    if search_focused {
                        continue;
                    }
                    self.set_query("");
                    commands.push(UiCommand::FocusSearchInput);
                }
                ShortcutAction::CloseDetail => {
                    self.close_movie();
                    commands.push(UiCommand::DetailClosed);
                }
            }
        }
        commands
    }

    /// Show the open movie's title once its details are in
    pub fn sync_title(&mut self) {
        let title = self
            .detail
            .state()
            .movie
            .map(|movie| movie.title)
            .filter(|title| !title.is_empty());

        match title {
            Some(title) => {
                if self.title_guard.as_ref().map(|guard| guard.shown()) != Some(title.as_str()) {
                    self.release_title();
                    self.title_guard = Some(self.title.scoped(&title));
                }
            }
            None => self.release_title(),
        }
    }

    pub fn window_title(&self) -> String {
        self.title.get()
    }

    fn release_title(&mut self) {
        // Drop the old guard before a new one is installed: dropping restores the default
        self.title_guard = None;
    }

    pub fn active_shortcuts(&self) -> usize {
        self.shortcuts.active_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{detail, movie, ScriptedLookup};
    use crate::title::DEFAULT_TITLE;
    use crate::watched::MemoryStorage;

    fn app_with(lookup: &Arc<ScriptedLookup>, storage: &MemoryStorage) -> PopcornApp {
        PopcornApp::new(
            lookup.clone(),
            WatchedStore::load(storage.clone()),
            AppOptions::default(),
        )
    }

    #[tokio::test]
    async fn test_search_then_rate_then_add() {
        let lookup = Arc::new(ScriptedLookup::new());
        let storage = MemoryStorage::new();
        let mut app = app_with(&lookup, &storage);

        lookup.reply_search("bat", Ok(vec![movie("tt1", "Batman", "1989")]));
        app.set_query("bat");
        let state = app.search().settled().await;
        assert_eq!(state.movies, vec![movie("tt1", "Batman", "1989")]);
        assert!(!state.is_loading);
        assert_eq!(state.error, None);

        lookup.reply_detail("tt1", Ok(detail("tt1", "Batman", "126 min", "7.5")));
        assert!(app.select_movie("tt1"));
        app.detail().settled().await;

        let change = app.rate(8).unwrap();
        assert_eq!(change, RatingChange { rating: 8, interaction_count: 1 });

        let entry = app.add_to_watched().unwrap();
        assert_eq!(entry.id, "tt1");
        assert_eq!(entry.imdb_rating, 7.5);
        assert_eq!(entry.runtime_minutes, 126);
        assert_eq!(entry.user_rating, 8);
        assert_eq!(entry.rating_interaction_count, 1);

        assert_eq!(app.watched(), &[entry.clone()]);
        assert_eq!(app.open_movie_id(), None);

        // Persisted immediately
        let reloaded = WatchedStore::load(storage);
        assert_eq!(reloaded.entries(), &[entry]);
    }

    #[tokio::test]
    async fn test_add_requires_rating() {
        let lookup = Arc::new(ScriptedLookup::new());
        let mut app = app_with(&lookup, &MemoryStorage::new());
        lookup.reply_detail("tt1", Ok(detail("tt1", "Batman", "126 min", "7.5")));

        app.select_movie("tt1");
        app.detail().settled().await;

        assert!(matches!(app.add_to_watched(), Err(AppError::NotRated)));
        assert!(app.watched().is_empty());
    }

    #[tokio::test]
    async fn test_add_rejects_unparsable_runtime() {
        let lookup = Arc::new(ScriptedLookup::new());
        let storage = MemoryStorage::new();
        let mut app = app_with(&lookup, &storage);
        lookup.reply_detail("tt1", Ok(detail("tt1", "Batman", "N/A", "7.5")));

        app.select_movie("tt1");
        app.detail().settled().await;
        app.rate(7).unwrap();

        assert!(matches!(app.add_to_watched(), Err(AppError::Validation(_))));
        assert!(app.watched().is_empty());
        assert_eq!(storage.contents(), None);
        // The detail view stays open so the user can back out
        assert_eq!(app.open_movie_id().as_deref(), Some("tt1"));
    }

    #[tokio::test]
    async fn test_add_before_detail_loads() {
        let lookup = Arc::new(ScriptedLookup::new());
        let mut app = app_with(&lookup, &MemoryStorage::new());
        lookup.hang_detail("tt1");

        app.select_movie("tt1");
        app.rate(5).unwrap();
        assert!(matches!(app.add_to_watched(), Err(AppError::DetailNotLoaded)));
    }

    #[tokio::test]
    async fn test_rate_without_open_movie() {
        let lookup = Arc::new(ScriptedLookup::new());
        let mut app = app_with(&lookup, &MemoryStorage::new());
        assert!(matches!(app.rate(5), Err(AppError::NoMovieOpen)));
        assert!(matches!(app.add_to_watched(), Err(AppError::NoMovieOpen)));
    }

    #[tokio::test]
    async fn test_hover_previews_without_rating() {
        let lookup = Arc::new(ScriptedLookup::new());
        let mut app = app_with(&lookup, &MemoryStorage::new());
        lookup.reply_detail("tt1", Ok(detail("tt1", "Batman", "126 min", "7.5")));
        app.select_movie("tt1");
        app.detail().settled().await;

        app.hover_star(6);
        assert_eq!(app.rating().displayed(), 6);
        assert_eq!(app.rating().rating(), 0);
        assert!(matches!(app.add_to_watched(), Err(AppError::NotRated)));

        app.rate(3).unwrap();
        assert_eq!(app.rating().displayed(), 6);
        app.clear_hover();
        assert_eq!(app.rating().displayed(), 3);
        assert!(app.rating().render().starts_with("★★★☆"));
        assert_eq!(app.rating().interaction_count(), 1);

        // Opening another movie drops both hover and selection
        app.hover_star(9);
        lookup.hang_detail("tt2");
        app.select_movie("tt2");
        assert_eq!(app.rating().displayed(), 0);
    }

    #[tokio::test]
    async fn test_selecting_open_movie_toggles_closed() {
        let lookup = Arc::new(ScriptedLookup::new());
        let mut app = app_with(&lookup, &MemoryStorage::new());
        lookup.reply_detail("tt1", Ok(detail("tt1", "Batman", "126 min", "7.5")));

        assert!(app.select_movie("tt1"));
        app.detail().settled().await;
        assert!(!app.select_movie("tt1"));
        assert_eq!(app.open_movie_id(), None);
    }

    #[tokio::test]
    async fn test_switching_movie_resets_rating() {
        let lookup = Arc::new(ScriptedLookup::new());
        let mut app = app_with(&lookup, &MemoryStorage::new());
        lookup.reply_detail("tt1", Ok(detail("tt1", "Batman", "126 min", "7.5")));
        lookup.reply_detail("tt2", Ok(detail("tt2", "Batman Returns", "126 min", "7.1")));

        app.select_movie("tt1");
        app.rate(9).unwrap();
        app.select_movie("tt2");
        assert_eq!(app.rating().rating(), 0);
        assert_eq!(app.rating().interaction_count(), 0);
    }

    #[tokio::test]
    async fn test_escape_closes_detail_and_releases_listener() {
        let lookup = Arc::new(ScriptedLookup::new());
        let mut app = app_with(&lookup, &MemoryStorage::new());
        lookup.reply_detail("tt1", Ok(detail("tt1", "Batman", "126 min", "7.5")));
        assert_eq!(app.active_shortcuts(), 1);

        app.select_movie("tt1");
        assert_eq!(app.active_shortcuts(), 2);

        assert_eq!(app.handle_key(Key::Escape, false), vec![UiCommand::DetailClosed]);
        assert_eq!(app.open_movie_id(), None);
        assert_eq!(app.active_shortcuts(), 1);

        // Nothing bound to Escape any more
        assert!(app.handle_key(Key::Escape, false).is_empty());
    }

    #[tokio::test]
    async fn test_enter_focuses_and_clears_search() {
        let lookup = Arc::new(ScriptedLookup::new());
        let mut app = app_with(&lookup, &MemoryStorage::new());
        lookup.reply_search("bat", Ok(vec![movie("tt1", "Batman", "1989")]));
        app.set_query("bat");
        app.search().settled().await;

        // Typing Enter inside the input is ignored
        assert!(app.handle_key(Key::Enter, true).is_empty());
        assert_eq!(app.search_state().query, "bat");

        assert_eq!(app.handle_key(Key::Enter, false), vec![UiCommand::FocusSearchInput]);
        let state = app.search_state();
        assert_eq!(state.query, "");
        assert!(state.movies.is_empty());
    }

    #[tokio::test]
    async fn test_title_follows_open_movie() {
        let lookup = Arc::new(ScriptedLookup::new());
        let mut app = app_with(&lookup, &MemoryStorage::new());
        lookup.reply_detail("tt1", Ok(detail("tt1", "Batman", "126 min", "7.5")));
        lookup.reply_detail("tt2", Ok(detail("tt2", "Batman Returns", "126 min", "7.1")));

        app.select_movie("tt1");
        app.sync_title();
        assert_eq!(app.window_title(), DEFAULT_TITLE);

        app.detail().settled().await;
        app.sync_title();
        assert_eq!(app.window_title(), "Batman");

        app.select_movie("tt2");
        app.detail().settled().await;
        app.sync_title();
        assert_eq!(app.window_title(), "Batman Returns");

        app.close_movie();
        assert_eq!(app.window_title(), DEFAULT_TITLE);
    }
}
