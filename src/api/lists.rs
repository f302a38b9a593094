//! List endpoints: create, fetch (with movies) and delete.
//!
//! Every operation verifies the caller's token and checks list ownership.
//! A list belonging to another user is reported as not found rather than
//! forbidden, so callers cannot probe for foreign list ids.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use sqlx::FromRow;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{CreateListRequest, List, ListWithMovies, MovieWithReview};
use crate::AppState;

use super::auth::AuthUser;
use super::error::ApiError;
use super::validation::validate_list_name;

#[derive(Debug, Serialize)]
pub struct CreateListResponse {
    pub success: bool,
    #[serde(rename = "listID")]
    pub list_id: String,
}

#[derive(Debug, Serialize)]
pub struct ListsResponse {
    pub success: bool,
    pub lists: Vec<ListWithMovies>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "rowsAffected")]
    pub rows_affected: u64,
}

/// One row of the batched lists+movies join.
#[derive(Debug, FromRow)]
struct ListMovieRow {
    list_id: String,
    id: String,
    tmdb_id: i64,
    title: String,
    poster_url: Option<String>,
    release_year: Option<i64>,
    overview: Option<String>,
    review: Option<String>,
}

/// Fetch a list only if it belongs to `user_id`.
pub(super) async fn find_owned_list(
    state: &AppState,
    list_id: &str,
    user_id: &str,
) -> Result<List, ApiError> {
    sqlx::query_as::<_, List>("SELECT * FROM lists WHERE id = ? AND user_id = ?")
        .bind(list_id)
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("List not found"))
}

/// Create a new list for the authenticated user
pub async fn create_list(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<CreateListRequest>,
) -> Result<(StatusCode, Json<CreateListResponse>), ApiError> {
    if let Err(e) = validate_list_name(&req.list_name) {
        return Err(ApiError::validation_field("listName", e));
    }

    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query("INSERT INTO lists (id, user_id, name, created_at) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(&user.user_id)
        .bind(&req.list_name)
        .bind(&now)
        .execute(&state.db)
        .await?;

    tracing::info!(list_id = %id, user_id = %user.user_id, "List created");

    Ok((
        StatusCode::CREATED,
        Json(CreateListResponse {
            success: true,
            list_id: id,
        }),
    ))
}

/// Fetch all of the caller's lists, each with its movies.
///
/// Two queries total: one for the lists, one batched join for every movie
/// across all of them.
pub async fn get_lists(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<ListsResponse>, ApiError> {
    let lists = sqlx::query_as::<_, List>(
        "SELECT * FROM lists WHERE user_id = ? ORDER BY created_at DESC",
    )
    .bind(&user.user_id)
    .fetch_all(&state.db)
    .await?;

    let rows = sqlx::query_as::<_, ListMovieRow>(
        r#"
        SELECT lm.list_id, m.id, m.tmdb_id, m.title, m.poster_url,
               m.release_year, m.overview, lm.review
        FROM list_movies lm
        JOIN movies m ON m.id = lm.movie_id
        JOIN lists l ON l.id = lm.list_id
        WHERE l.user_id = ?
        ORDER BY lm.created_at
        "#,
    )
    .bind(&user.user_id)
    .fetch_all(&state.db)
    .await?;

    let mut results: Vec<ListWithMovies> = lists.into_iter().map(ListWithMovies::new).collect();
    for row in rows {
        if let Some(list) = results.iter_mut().find(|l| l.id == row.list_id) {
            list.movies.push(MovieWithReview {
                id: row.id,
                tmdb_id: row.tmdb_id,
                title: row.title,
                poster_url: row.poster_url,
                release_year: row.release_year,
                overview: row.overview,
                review: row.review,
            });
        }
    }

    Ok(Json(ListsResponse {
        success: true,
        lists: results,
    }))
}

/// Delete a list and all of its entries in one transaction
pub async fn delete_list(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(list_id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    find_owned_list(&state, &list_id, &user.user_id).await?;

    let mut tx = state.db.begin().await?;

    sqlx::query("DELETE FROM list_movies WHERE list_id = ?")
        .bind(&list_id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM lists WHERE id = ?")
        .bind(&list_id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        // Deleted concurrently between the ownership check and now
        return Err(ApiError::not_found("List not found"));
    }

    tx.commit().await?;

    tracing::info!(list_id = %list_id, user_id = %user.user_id, "List deleted");

    Ok(Json(DeleteResponse {
        success: true,
        message: "List deleted successfully".to_string(),
        rows_affected: result.rows_affected(),
    }))
}
