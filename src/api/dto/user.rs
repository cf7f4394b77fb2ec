//! DTOs for the user endpoints.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::entities::Attributes;

/// Upper bound on a username, in UTF-8 bytes.
///
/// Half of DynamoDB's 2048-byte partition key limit, so every backend accepts
/// any name that passes validation.
pub const MAX_USERNAME_BYTES: usize = 1024;

/// Rejects empty usernames and usernames longer than [`MAX_USERNAME_BYTES`].
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() || username.len() > MAX_USERNAME_BYTES {
        return Err(ValidationError::new("username_length").with_message(
            format!("username must be 1 to {MAX_USERNAME_BYTES} bytes").into(),
        ));
    }
    Ok(())
}

/// Request body for `POST /users`.
///
/// `username` is mandatory; every other key becomes an attribute of the record.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    #[serde(flatten)]
    pub attributes: Attributes,
}

/// Confirmation body, e.g. `{"message": "User john was deleted"}`.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
