//! List-entry endpoints: add a movie to a list, remove it, set its review.
//!
//! The movies table is a shared cache keyed by the external catalog id.
//! Adding a movie runs lookup-or-insert and the entry insert in a single
//! transaction; concurrent adds of the same catalog id converge on one row
//! (the first insert wins, losers reuse it).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{AddMovieRequest, SetReviewRequest};
use crate::AppState;

use super::auth::AuthUser;
use super::error::{ApiError, ValidationErrorBuilder};
use super::lists::find_owned_list;
use super::validation::{validate_review, validate_title, validate_tmdb_id};

#[derive(Debug, Serialize)]
pub struct AddMovieResponse {
    pub success: bool,
    #[serde(rename = "movieID")]
    pub movie_id: String,
}

#[derive(Debug, Serialize)]
pub struct RowsAffectedResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "rowsAffected")]
    pub rows_affected: u64,
}

fn validate_add_request(req: &AddMovieRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Err(e) = validate_tmdb_id(req.tmdb_id) {
        errors.add("tmdbID", e);
    }
    if let Err(e) = validate_title(&req.title) {
        errors.add("title", e);
    }

    errors.finish()
}

/// Add a movie to a list, inserting the catalog row if it is not cached yet
pub async fn add_movie_to_list(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(list_id): Path<String>,
    Json(req): Json<AddMovieRequest>,
) -> Result<(StatusCode, Json<AddMovieResponse>), ApiError> {
    validate_add_request(&req)?;
    find_owned_list(&state, &list_id, &user.user_id).await?;

    let mut tx = state.db.begin().await?;

    // Lookup-or-insert by catalog id. DO NOTHING leaves a concurrent
    // winner's row in place; the re-select below picks it up either way.
    sqlx::query(
        r#"
        INSERT INTO movies (id, tmdb_id, title, poster_url, release_year, overview, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(tmdb_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(req.tmdb_id)
    .bind(&req.title)
    .bind(&req.poster_url)
    .bind(req.release_year)
    .bind(&req.overview)
    .bind(Utc::now().to_rfc3339())
    .execute(&mut *tx)
    .await?;

    let (movie_id,): (String,) = sqlx::query_as("SELECT id FROM movies WHERE tmdb_id = ?")
        .bind(req.tmdb_id)
        .fetch_one(&mut *tx)
        .await?;

    sqlx::query(
        "INSERT INTO list_movies (list_id, movie_id, created_at) VALUES (?, ?, ?)",
    )
    .bind(&list_id)
    .bind(&movie_id)
    .bind(Utc::now().to_rfc3339())
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            ApiError::conflict("Movie is already in this list")
        } else {
            tracing::error!("Failed to add movie to list: {}", e);
            ApiError::database("Failed to add movie to list")
        }
    })?;

    tx.commit().await?;

    tracing::info!(list_id = %list_id, movie_id = %movie_id, tmdb_id = req.tmdb_id, "Movie added to list");

    Ok((
        StatusCode::CREATED,
        Json(AddMovieResponse {
            success: true,
            movie_id,
        }),
    ))
}

/// Remove a movie from a list. The shared catalog row stays.
pub async fn remove_movie_from_list(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path((list_id, movie_id)): Path<(String, String)>,
) -> Result<Json<RowsAffectedResponse>, ApiError> {
    find_owned_list(&state, &list_id, &user.user_id).await?;

    let result = sqlx::query("DELETE FROM list_movies WHERE list_id = ? AND movie_id = ?")
        .bind(&list_id)
        .bind(&movie_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Movie not found in list"));
    }

    tracing::info!(list_id = %list_id, movie_id = %movie_id, "Movie removed from list");

    Ok(Json(RowsAffectedResponse {
        success: true,
        message: "Movie removed from list successfully".to_string(),
        rows_affected: result.rows_affected(),
    }))
}

/// Set or overwrite the review on a list entry
pub async fn set_review(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path((list_id, movie_id)): Path<(String, String)>,
    Json(req): Json<SetReviewRequest>,
) -> Result<Json<RowsAffectedResponse>, ApiError> {
    if let Err(e) = validate_review(&req.review) {
        return Err(ApiError::validation_field("review", e));
    }
    find_owned_list(&state, &list_id, &user.user_id).await?;

    let result = sqlx::query("UPDATE list_movies SET review = ? WHERE list_id = ? AND movie_id = ?")
        .bind(&req.review)
        .bind(&list_id)
        .bind(&movie_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Movie not found in list"));
    }

    Ok(Json(RowsAffectedResponse {
        success: true,
        message: "Review saved successfully".to_string(),
        rows_affected: result.rows_affected(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::lists::get_lists;
    use crate::api::testutil::{add_movie_req, auth_user, create_test_list, register_user, test_state};
    use crate::api::validation::MAX_REVIEW_LEN;

    #[tokio::test]
    async fn test_same_movie_in_two_lists_reuses_row() {
        let state = test_state().await;
        let alice = register_user(&state, "alice", "alice@example.com", "pw123456").await;
        let list_a = create_test_list(&state, &alice, "Favorites").await;
        let list_b = create_test_list(&state, &alice, "Watch again").await;

        let first = add_movie_to_list(
            State(state.clone()),
            auth_user(&alice, "alice@example.com"),
            Path(list_a),
            Json(add_movie_req(550, "Fight Club")),
        )
        .await
        .unwrap();

        let second = add_movie_to_list(
            State(state.clone()),
            auth_user(&alice, "alice@example.com"),
            Path(list_b),
            Json(add_movie_req(550, "Fight Club")),
        )
        .await
        .unwrap();

        assert_eq!(first.1 .0.movie_id, second.1 .0.movie_id);

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM movies WHERE tmdb_id = ?")
            .bind(550_i64)
            .fetch_one(&state.db)
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn test_concurrent_adds_converge_on_one_row() {
        let state = test_state().await;
        let alice = register_user(&state, "alice", "alice@example.com", "pw123456").await;
        let list_a = create_test_list(&state, &alice, "Favorites").await;
        let list_b = create_test_list(&state, &alice, "Watch again").await;

        let (a, b) = tokio::join!(
            add_movie_to_list(
                State(state.clone()),
                auth_user(&alice, "alice@example.com"),
                Path(list_a),
                Json(add_movie_req(550, "Fight Club")),
            ),
            add_movie_to_list(
                State(state.clone()),
                auth_user(&alice, "alice@example.com"),
                Path(list_b),
                Json(add_movie_req(550, "Fight Club")),
            ),
        );

        // Neither caller sees an error
        let a = a.unwrap();
        let b = b.unwrap();
        assert_eq!(a.1 .0.movie_id, b.1 .0.movie_id);

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM movies WHERE tmdb_id = ?")
            .bind(550_i64)
            .fetch_one(&state.db)
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn test_duplicate_entry_rejected() {
        let state = test_state().await;
        let alice = register_user(&state, "alice", "alice@example.com", "pw123456").await;
        let list_id = create_test_list(&state, &alice, "Favorites").await;

        add_movie_to_list(
            State(state.clone()),
            auth_user(&alice, "alice@example.com"),
            Path(list_id.clone()),
            Json(add_movie_req(550, "Fight Club")),
        )
        .await
        .unwrap();

        let err = add_movie_to_list(
            State(state.clone()),
            auth_user(&alice, "alice@example.com"),
            Path(list_id.clone()),
            Json(add_movie_req(550, "Fight Club")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let entries: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM list_movies WHERE list_id = ?")
            .bind(&list_id)
            .fetch_one(&state.db)
            .await
            .unwrap();
        assert_eq!(entries.0, 1);
    }

    #[tokio::test]
    async fn test_add_movie_checks_list_ownership() {
        let state = test_state().await;
        let alice = register_user(&state, "alice", "alice@example.com", "pw123456").await;
        let bob = register_user(&state, "bob", "bob@example.com", "pw123456").await;
        let list_id = create_test_list(&state, &alice, "Favorites").await;

        let err = add_movie_to_list(
            State(state.clone()),
            auth_user(&bob, "bob@example.com"),
            Path(list_id),
            Json(add_movie_req(550, "Fight Club")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_remove_movie_from_list() {
        let state = test_state().await;
        let alice = register_user(&state, "alice", "alice@example.com", "pw123456").await;
        let list_id = create_test_list(&state, &alice, "Favorites").await;

        let (_, added) = add_movie_to_list(
            State(state.clone()),
            auth_user(&alice, "alice@example.com"),
            Path(list_id.clone()),
            Json(add_movie_req(550, "Fight Club")),
        )
        .await
        .unwrap();

        let resp = remove_movie_from_list(
            State(state.clone()),
            auth_user(&alice, "alice@example.com"),
            Path((list_id.clone(), added.0.movie_id.clone())),
        )
        .await
        .unwrap();
        assert_eq!(resp.0.rows_affected, 1);

        // Second removal reports not found
        let err = remove_movie_from_list(
            State(state.clone()),
            auth_user(&alice, "alice@example.com"),
            Path((list_id, added.0.movie_id)),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_set_review_overwrites_and_is_idempotent() {
        let state = test_state().await;
        let alice = register_user(&state, "alice", "alice@example.com", "pw123456").await;
        let list_id = create_test_list(&state, &alice, "Favorites").await;

        let (_, added) = add_movie_to_list(
            State(state.clone()),
            auth_user(&alice, "alice@example.com"),
            Path(list_id.clone()),
            Json(add_movie_req(550, "Fight Club")),
        )
        .await
        .unwrap();
        let movie_id = added.0.movie_id;

        for _ in 0..2 {
            let resp = set_review(
                State(state.clone()),
                auth_user(&alice, "alice@example.com"),
                Path((list_id.clone(), movie_id.clone())),
                Json(SetReviewRequest {
                    review: "Great film".to_string(),
                }),
            )
            .await
            .unwrap();
            assert_eq!(resp.0.rows_affected, 1);
        }

        let lists = get_lists(State(state.clone()), auth_user(&alice, "alice@example.com"))
            .await
            .unwrap();
        assert_eq!(
            lists.0.lists[0].movies[0].review.as_deref(),
            Some("Great film")
        );
    }

    #[tokio::test]
    async fn test_set_review_missing_pair() {
        let state = test_state().await;
        let alice = register_user(&state, "alice", "alice@example.com", "pw123456").await;
        let list_id = create_test_list(&state, &alice, "Favorites").await;

        let err = set_review(
            State(state.clone()),
            auth_user(&alice, "alice@example.com"),
            Path((list_id, "no-such-movie".to_string())),
            Json(SetReviewRequest {
                review: "Great film".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_oversized_review_rejected() {
        let state = test_state().await;
        let alice = register_user(&state, "alice", "alice@example.com", "pw123456").await;
        let list_id = create_test_list(&state, &alice, "Favorites").await;

        let (_, added) = add_movie_to_list(
            State(state.clone()),
            auth_user(&alice, "alice@example.com"),
            Path(list_id.clone()),
            Json(add_movie_req(550, "Fight Club")),
        )
        .await
        .unwrap();

        let err = set_review(
            State(state.clone()),
            auth_user(&alice, "alice@example.com"),
            Path((list_id.clone(), added.0.movie_id.clone())),
            Json(SetReviewRequest {
                review: "x".repeat(MAX_REVIEW_LEN + 1),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        // Review stays untouched, no truncation
        let (review,): (Option<String>,) = sqlx::query_as(
            "SELECT review FROM list_movies WHERE list_id = ? AND movie_id = ?",
        )
        .bind(&list_id)
        .bind(&added.0.movie_id)
        .fetch_one(&state.db)
        .await
        .unwrap();
        assert_eq!(review, None);
    }

    #[tokio::test]
    async fn test_add_movie_invalid_input() {
        let state = test_state().await;
        let alice = register_user(&state, "alice", "alice@example.com", "pw123456").await;
        let list_id = create_test_list(&state, &alice, "Favorites").await;

        let err = add_movie_to_list(
            State(state.clone()),
            auth_user(&alice, "alice@example.com"),
            Path(list_id),
            Json(add_movie_req(0, "")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
