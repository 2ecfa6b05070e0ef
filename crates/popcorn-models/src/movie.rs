use serde::{Deserialize, Serialize};

/// A single hit from a title search
///
/// Produced only by the search endpoint and never modified afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieSummary {
    pub id: String, // IMDb id, e.g. "tt0096895"
    pub title: String,
    pub year: String, // Kept as text: series use ranges like "2005–2010"
    pub poster_url: String,
}

/// Full record for one title, fetched lazily when the title is opened
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetail {
    pub id: String,
    pub title: String,
    pub year: String,
    pub poster_url: String,
    /// Runtime as the provider formats it (e.g. "126 min")
    pub runtime: String,
    /// Leading integer of `runtime`, absent when the provider sends "N/A"
    pub runtime_minutes: Option<u32>,
    /// Parsed `imdbRating`, absent when the provider sends "N/A"
    pub imdb_rating: Option<f64>,
    pub plot: String,
    pub release_date: String,
    pub actors: String,
    pub director: String,
    pub genre: String,
}

/// Parse the leading whole number of a runtime string such as "126 min"
pub fn parse_runtime_minutes(runtime: &str) -> Option<u32> {
    runtime.split_whitespace().next()?.parse().ok()
}

/// Parse a textual IMDb rating such as "7.5"
pub fn parse_imdb_rating(rating: &str) -> Option<f64> {
    rating
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
