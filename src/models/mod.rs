use serde::{Deserialize, Serialize};

/// One recommendable entry in the catalog.
///
/// `movie_id` is the external identifier used to query TMDB; the raw
/// payload may carry it as an integer or a string, both normalized to
/// `String` on load. `title` is the sole lookup key for selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieItem {
    pub movie_id: String,
    pub title: String,
    pub tags: String,
}

/// Transient (row index, similarity score) pair produced during ranking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedCandidate {
    pub row: usize,
    pub score: f64,
}

/// One accepted recommendation: a catalog title plus its poster URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub poster_url: String,
}
