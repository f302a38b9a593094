//! Movie models and DTOs.
//!
//! Movies are a shared catalog cache, deduplicated by the external catalog
//! (TMDB) id. Rows are inserted lazily on first add and never mutated.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Movie {
    pub id: String,
    pub tmdb_id: i64,
    pub title: String,
    pub poster_url: Option<String>,
    pub release_year: Option<i64>,
    pub overview: Option<String>,
    pub created_at: String,
}

/// A movie as it appears inside a list, carrying that entry's review.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MovieWithReview {
    pub id: String,
    pub tmdb_id: i64,
    pub title: String,
    pub poster_url: Option<String>,
    pub release_year: Option<i64>,
    pub overview: Option<String>,
    pub review: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMovieRequest {
    #[serde(rename = "tmdbID")]
    pub tmdb_id: i64,
    pub title: String,
    #[serde(rename = "posterURL")]
    pub poster_url: Option<String>,
    pub release_year: Option<i64>,
    pub overview: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetReviewRequest {
    pub review: String,
}
