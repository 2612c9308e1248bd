/// Health check endpoint
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "backend": "connected"
/// }
/// ```
///
/// Always 200; an unreachable backend reports `degraded`.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: String,

    /// Application version
    pub version: String,

    /// `connected` or `unreachable`
    pub backend: String,
}

pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let backend_status = match state.baas.health().await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "Backend health check failed");
            "unreachable"
        }
    };

    Ok(Json(HealthResponse {
        status: if backend_status == "connected" {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: backend_status.to_string(),
    }))
}
