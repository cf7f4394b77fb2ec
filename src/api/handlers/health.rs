//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckState, HealthChecks, HealthResponse, StorageCheck};
use crate::state::AppState;

/// Returns service health status with a storage backend check.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: Backend reachable
/// - **503 Service Unavailable**: Backend probe failed or timed out
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "storage": { "status": "ok", "backend": "dynamodb", "message": "dynamodb reachable" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let storage = check_storage(&state).await;
    let healthy = storage.is_ok();

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        checks: HealthChecks { storage },
    };

    if healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_storage(state: &AppState) -> StorageCheck {
    let backend = state.user_service.backend_name();

    let (status, message) = match state.user_service.health_check().await {
        Ok(()) => (CheckState::Ok, format!("{backend} reachable")),
        Err(e) => {
            tracing::warn!(backend, error = %e, "Storage health check failed");
            (CheckState::Error, format!("{backend} error: {e}"))
        }
    };

    StorageCheck {
        status,
        backend,
        message,
    }
}
