//! Response body for `GET /health`.

use serde::Serialize;

/// `{"status": "healthy", "version": "0.1.0", "checks": {"storage": {..}}}`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub storage: StorageCheck,
}

/// Outcome of probing the configured storage backend.
#[derive(Debug, Serialize)]
pub struct StorageCheck {
    pub status: CheckState,
    pub backend: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    Ok,
    Error,
}

impl StorageCheck {
    pub fn is_ok(&self) -> bool {
        self.status == CheckState::Ok
    }
}
