//! Health check endpoint for container orchestration.
//!
//! Runs a trivial query through the passcode store, so the probe fails when
//! the database is unreachable. Used by Kubernetes, Docker and load balancers
//! as both a liveness and readiness check.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::instrument;

use crate::config::PasscodeSource;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Health check handler.
///
/// Returns 200 with `{"status":"healthy","database":"connected"}` when the
/// database answers, or 503 with `"unhealthy"` and the error detail when it
/// cannot be reached after retries.
#[instrument(name = "health::health", skip(state))]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    if state.store.source() == PasscodeSource::Static {
        return (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                database: "not_configured",
                error: None,
            }),
        );
    }

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                database: "connected",
                error: None,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy",
                    database: "disconnected",
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}
