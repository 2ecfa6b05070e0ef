pub mod movie;
pub mod watched;

pub use movie::{parse_imdb_rating, parse_runtime_minutes, MovieDetail, MovieSummary};
pub use watched::{EntryError, WatchedEntry, WatchedSummary, MAX_USER_RATING, MIN_USER_RATING};
