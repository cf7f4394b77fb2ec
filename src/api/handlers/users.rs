//! Handlers for the user record endpoints.
//!
//! Each handler checks existence, delegates to
//! [`crate::application::services::UserService`], and turns the outcome into a
//! response. Nothing here knows which backend is in use.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use validator::Validate;

use crate::api::dto::user::{CreateUserRequest, MessageResponse};
use crate::domain::entities::{Attributes, User};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a user record.
///
/// # Endpoint
///
/// `POST /users`
///
/// # Request Body
///
/// ```json
/// { "username": "john", "email": "j@example.com" }
/// ```
///
/// # Errors
///
/// - 400 if the body is not a JSON object with a string `username`
/// - 400 if the user already exists
pub async fn create_user_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Json<User>, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let CreateUserRequest {
        username,
        attributes,
    } = payload;

    if state.user_service.get(&username).await?.is_some() {
        return Err(AppError::user_already_exists(&username));
    }

    let user = state.user_service.create(&username, attributes).await?;
    tracing::info!(username = %username, "User created");

    Ok(Json(user))
}

/// Merge-patches an existing user record.
///
/// # Endpoint
///
/// `PUT /users/{username}`
///
/// # Request Body
///
/// A JSON object of attributes to overwrite. Attributes not mentioned are kept;
/// a `username` key is ignored.
///
/// # Errors
///
/// - 400 if the body is not a JSON object
/// - 404 if the user does not exist
pub async fn update_user_handler(
    Path(username): Path<String>,
    State(state): State<AppState>,
    payload: Result<Json<Attributes>, JsonRejection>,
) -> Result<Json<User>, AppError> {
    let Json(attributes) = payload?;

    if state.user_service.get(&username).await?.is_none() {
        return Err(AppError::user_not_found(&username));
    }

    // The record can vanish between the check and the patch.
    let user = state
        .user_service
        .update(&username, attributes)
        .await?
        .ok_or_else(|| AppError::user_not_found(&username))?;
    tracing::info!(username = %username, "User updated");

    Ok(Json(user))
}

/// Returns a user record.
///
/// # Endpoint
///
/// `GET /users/{username}`
///
/// # Errors
///
/// Returns 404 if the user does not exist.
pub async fn get_user_handler(
    Path(username): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<User>, AppError> {
    state
        .user_service
        .get(&username)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::user_not_found(&username))
}

/// Deletes a user record.
///
/// # Endpoint
///
/// `DELETE /users/{username}`
///
/// # Response
///
/// ```json
/// { "message": "User john was deleted" }
/// ```
///
/// # Errors
///
/// Returns 404 if the user does not exist.
pub async fn delete_user_handler(
    Path(username): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    if state.user_service.get(&username).await?.is_none() {
        return Err(AppError::user_not_found(&username));
    }

    state.user_service.delete(&username).await?;
    tracing::info!(username = %username, "User deleted");

    Ok(Json(MessageResponse {
        message: format!("User {username} was deleted"),
    }))
}
