use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::movie::MovieDetail;

/// Lowest and highest user rating a watched entry may carry
pub const MIN_USER_RATING: u8 = 1;
pub const MAX_USER_RATING: u8 = 10;

/// A rated movie on the user's watched list
///
/// Created once from an open [`MovieDetail`] when the user confirms
/// "add to list"; the list is append-only so entries are never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchedEntry {
    pub id: String,
    pub title: String,
    pub year: String,
    pub poster_url: String,
    pub imdb_rating: f64,
    pub runtime_minutes: u32,
    pub user_rating: u8, // 1-10
    pub rating_interaction_count: u32,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Error, PartialEq)]
pub enum EntryError {
    #[error("user rating {0} is outside 1-10")]
    RatingOutOfRange(u8),
    #[error("'{title}' has no usable runtime (got '{runtime}')")]
    MissingRuntime { title: String, runtime: String },
    #[error("'{title}' has no usable IMDb rating")]
    MissingImdbRating { title: String },
}

impl WatchedEntry {
    /// Build an entry from a loaded detail record and the user's rating
    ///
    /// Fails instead of persisting an entry whose numeric fields could not be
    /// parsed from the provider's text.
    pub fn from_detail(
        detail: &MovieDetail,
        user_rating: u8,
        rating_interaction_count: u32,
        added_at: DateTime<Utc>,
    ) -> Result<Self, EntryError> {
        if !(MIN_USER_RATING..=MAX_USER_RATING).contains(&user_rating) {
            return Err(EntryError::RatingOutOfRange(user_rating));
        }
        let runtime_minutes = detail.runtime_minutes.ok_or_else(|| EntryError::MissingRuntime {
            title: detail.title.clone(),
            runtime: detail.runtime.clone(),
        })?;
        let imdb_rating = detail.imdb_rating.ok_or_else(|| EntryError::MissingImdbRating {
            title: detail.title.clone(),
        })?;

        Ok(Self {
            id: detail.id.clone(),
            title: detail.title.clone(),
            year: detail.year.clone(),
            poster_url: detail.poster_url.clone(),
            imdb_rating,
            runtime_minutes,
            user_rating,
            rating_interaction_count,
            added_at,
        })
    }
}

/// Running statistics shown above the watched list
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct WatchedSummary {
    pub count: usize,
    pub avg_imdb_rating: f64,
    pub avg_user_rating: f64,
    pub avg_runtime: f64,
}

impl WatchedSummary {
    /// Arithmetic mean of each numeric field; an empty list yields all zeros
    pub fn compute(entries: &[WatchedEntry]) -> Self {
        if entries.is_empty() {
            return Self::default();
        }

        let count = entries.len();
        let n = count as f64;
        let (imdb, user, runtime) = entries.iter().fold((0.0, 0.0, 0.0), |acc, entry| {
            (
                acc.0 + entry.imdb_rating,
                acc.1 + f64::from(entry.user_rating),
                acc.2 + f64::from(entry.runtime_minutes),
            )
        });

        Self {
            count,
            avg_imdb_rating: imdb / n,
            avg_user_rating: user / n,
            avg_runtime: runtime / n,
        }
    }
}
