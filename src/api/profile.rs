//! Profile update endpoint.

use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;

use crate::db::UpdateProfileRequest;
use crate::AppState;

use super::auth::AuthUser;
use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_email, validate_username};
use super::MessageResponse;

fn validate_update_request(req: &UpdateProfileRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Err(e) = validate_username(&req.username) {
        errors.add("username", e);
    }
    if let Err(e) = validate_email(&req.email) {
        errors.add("email", e);
    }
    if let Some(ref bio) = req.bio {
        if bio.len() > 1000 {
            errors.add("bio", "Bio is too long (max 1000 characters)");
        }
    }

    errors.finish()
}

/// Full replace of the mutable profile fields. Password is untouched; email
/// stays subject to the uniqueness constraint.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validate_update_request(&req)?;

    let now = Utc::now().to_rfc3339();

    let result = sqlx::query(
        r#"
        UPDATE users SET
            full_name = ?,
            username = ?,
            email = ?,
            bio = ?,
            favorite_genres = ?,
            profile_photo = ?,
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&req.full_name)
    .bind(&req.username)
    .bind(&req.email)
    .bind(&req.bio)
    .bind(&req.favorite_genres)
    .bind(&req.profile_photo)
    .bind(&now)
    .bind(&user.user_id)
    .execute(&state.db)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            ApiError::conflict("A user with this email already exists")
        } else {
            tracing::error!("Failed to update profile: {}", e);
            ApiError::database("Failed to update profile")
        }
    })?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!("Profile updated for user {}", user.user_id);

    Ok(Json(MessageResponse {
        success: true,
        message: "Profile updated successfully".to_string(),
    }))
}
