//! Input validation for API requests.
//!
//! For collecting multiple validation errors and returning them as an
//! ApiError, use the `ValidationErrorBuilder` from the `error` module.

use lazy_static::lazy_static;
use regex::Regex;

/// Server-side cap on review length. Oversized reviews are rejected, never
/// silently truncated.
pub const MAX_REVIEW_LEN: usize = 4000;

lazy_static! {
    /// Regex for validating email addresses
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9][-a-zA-Z0-9]*(\.[a-zA-Z0-9][-a-zA-Z0-9]*)+$"
    ).unwrap();

    /// Regex for validating usernames (alphanumeric with underscores/dots/dashes)
    static ref USERNAME_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9][a-zA-Z0-9._-]*$"
    ).unwrap();
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email is too long (max 254 characters)".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate a username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if username.len() < 2 {
        return Err("Username is too short (min 2 characters)".to_string());
    }

    if username.len() > 50 {
        return Err("Username is too long (max 50 characters)".to_string());
    }

    if !USERNAME_REGEX.is_match(username) {
        return Err(
            "Username must be alphanumeric with dots, dashes or underscores".to_string(),
        );
    }

    Ok(())
}

/// Validate a registration password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }

    if password.len() > 128 {
        return Err("Password is too long (max 128 characters)".to_string());
    }

    Ok(())
}

/// Validate a list name
pub fn validate_list_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("List name is required".to_string());
    }

    if name.len() > 100 {
        return Err("List name is too long (max 100 characters)".to_string());
    }

    Ok(())
}

/// Validate a review body
pub fn validate_review(review: &str) -> Result<(), String> {
    if review.chars().count() > MAX_REVIEW_LEN {
        return Err(format!(
            "Review is too long (max {} characters)",
            MAX_REVIEW_LEN
        ));
    }

    Ok(())
}

/// Validate a movie title
pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Title is required".to_string());
    }

    if title.len() > 500 {
        return Err("Title is too long (max 500 characters)".to_string());
    }

    Ok(())
}

/// Validate an external catalog (TMDB) id
pub fn validate_tmdb_id(id: i64) -> Result<(), String> {
    if id <= 0 {
        return Err("Catalog id must be a positive integer".to_string());
    }

    Ok(())
}
