//! List models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::movie::MovieWithReview;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct List {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub created_at: String,
}

/// List with its joined movies for the lists view.
#[derive(Debug, Clone, Serialize)]
pub struct ListWithMovies {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub created_at: String,
    pub movies: Vec<MovieWithReview>,
}

impl ListWithMovies {
    pub fn new(list: List) -> Self {
        Self {
            id: list.id,
            user_id: list.user_id,
            name: list.name,
            created_at: list.created_at,
            movies: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListRequest {
    pub list_name: String,
}
