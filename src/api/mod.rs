pub mod auth;
mod error;
mod lists;
mod movies;
mod profile;
mod validation;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::AppState;

/// Generic success envelope for endpoints that return only a message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    // Public routes
    let public_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    // Everything below requires a verified bearer token; list/movie handlers
    // additionally check list ownership.
    let protected_routes = Router::new()
        .route("/profile", put(profile::update_profile))
        .route("/lists", post(lists::create_list))
        .route("/lists", get(lists::get_lists))
        .route("/lists/:list_id", delete(lists::delete_list))
        .route("/lists/:list_id/movies", post(movies::add_movie_to_list))
        .route(
            "/lists/:list_id/movies/:movie_id",
            delete(movies::remove_movie_from_list),
        )
        .route(
            "/lists/:list_id/movies/:movie_id/review",
            post(movies::set_review),
        );

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", public_routes.merge(protected_routes))
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
pub(crate) mod testutil {
    use std::sync::Arc;

    use axum::extract::State;
    use axum::Json;

    use crate::config::Config;
    use crate::db::{AddMovieRequest, CreateListRequest, RegisterRequest};
    use crate::AppState;

    use super::auth::{self, AuthUser};
    use super::lists;

    pub async fn test_state() -> Arc<AppState> {
        let mut config = Config::default();
        config.auth.jwt_secret = "test-secret".to_string();
        let db = crate::db::init_test().await;
        Arc::new(AppState { config, db })
    }

    pub fn auth_user(user_id: &str, email: &str) -> AuthUser {
        AuthUser {
            user_id: user_id.to_string(),
            email: email.to_string(),
        }
    }

    /// Register through the real handler, return the new user's id.
    pub async fn register_user(
        state: &Arc<AppState>,
        username: &str,
        email: &str,
        password: &str,
    ) -> String {
        auth::register(
            State(state.clone()),
            Json(RegisterRequest {
                username: username.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            }),
        )
        .await
        .expect("register");

        let (id,): (String,) = sqlx::query_as("SELECT id FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&state.db)
            .await
            .expect("user id");
        id
    }

    pub async fn create_test_list(state: &Arc<AppState>, user_id: &str, name: &str) -> String {
        let (_, resp) = lists::create_list(
            State(state.clone()),
            auth_user(user_id, "test@example.com"),
            Json(CreateListRequest {
                list_name: name.to_string(),
            }),
        )
        .await
        .expect("create list");
        resp.0.list_id
    }

    pub fn add_movie_req(tmdb_id: i64, title: &str) -> AddMovieRequest {
        AddMovieRequest {
            tmdb_id,
            title: title.to_string(),
            poster_url: Some("/poster.jpg".to_string()),
            release_year: Some(1999),
            overview: Some("An overview".to_string()),
        }
    }
}
