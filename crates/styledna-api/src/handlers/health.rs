//! Health endpoints.

use axum::extract::State;
use axum::Json;
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

/// Readiness probe: verifies the database is reachable.
pub async fn ready(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    styledna_db::health_check(&state.pool)
        .await
        .map_err(|e| ApiError::internal(format!("database not ready: {}", e)))?;
    Ok(Json(json!({"status": "ready"})))
}
