//! Liveness endpoints.
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use saas_common::HealthResponse;

use crate::AppState;

pub async fn hello() -> &'static str {
    "Hello World!"
}

/// 200 when storage answers, 503 otherwise
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let version = env!("CARGO_PKG_VERSION").to_string();
    match state.storage.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                database: state.storage.backend_name().to_string(),
                version,
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded".to_string(),
                    database: "unreachable".to_string(),
                    version,
                }),
            )
        },
    }
}
