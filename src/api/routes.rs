//! User API route configuration.

use crate::api::handlers::{
    create_user_handler, delete_user_handler, get_user_handler, update_user_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// User record routes.
///
/// # Endpoints
///
/// - `POST   /users`            - Create a user (`username` in the body)
/// - `GET    /users/{username}` - Fetch a user
/// - `PUT    /users/{username}` - Merge-patch a user's attributes
/// - `DELETE /users/{username}` - Delete a user
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user_handler))
        .route(
            "/users/{username}",
            get(get_user_handler)
                .put(update_user_handler)
                .delete(delete_user_handler),
        )
}
