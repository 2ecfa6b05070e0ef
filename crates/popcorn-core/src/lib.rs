pub mod app;
pub mod detail;
pub mod rating;
mod request;
pub mod search;
pub mod shortcuts;
pub mod title;
pub mod watched;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppOptions, PopcornApp, UiCommand};
pub use detail::{DetailLifecycle, DetailState};
pub use rating::{RatingChange, RatingError, StarRating, DEFAULT_STARS};
pub use search::{SearchLifecycle, SearchState, SearchStatus, DEFAULT_MIN_QUERY_LENGTH};
pub use shortcuts::{Key, ShortcutAction, ShortcutGuard, ShortcutRegistry};
pub use title::{TitleGuard, WindowTitle, DEFAULT_TITLE};
pub use watched::{compute_averages, JsonFileStorage, MemoryStorage, WatchedStorage, WatchedStore};
