//! Health check handler

use axum::Json;
use chrono::Utc;

use crate::dto::HealthResponse;

/// `GET /health` liveness probe
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}
